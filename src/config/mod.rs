//! Configuration module for client construction
//!
//! This module provides:
//! - Environment tables and protocol constants (`constants`)
//! - Configuration types (`ClientConfig`, `Environment`, `VerifyingContract`)
//! - Logging configuration (`init_logging`)

pub mod constants;
pub mod logging;
mod types;

// Re-export types
pub use types::{ClientConfig, Environment, VerifyingContract};

// Re-export logging functions
pub use logging::init_logging;
