//! Exchange-wide constants and environment tables
//!
//! Centralizes the hardcoded endpoint, chain and contract values for both
//! environments.

use std::time::Duration;

// =============================================================================
// EIP-712 Domain
// =============================================================================

/// Fixed `name` of the EIP-712 domain
pub const DOMAIN_NAME: &str = "100x";

/// Fixed `version` of the EIP-712 domain
pub const DOMAIN_VERSION: &str = "0.0.0";

// =============================================================================
// Mainnet (Blast)
// =============================================================================

pub const MAINNET_REST_URL: &str = "https://api.100x.finance";
pub const MAINNET_WS_URL: &str = "wss://api.100x.finance/ws";
pub const MAINNET_CHAIN_ID: u64 = 81457;
pub const MAINNET_VERIFIER_ADDRESS: &str = "0x65CbB566D1A6E60107c0c7888761de1AdFa1ccC0";
pub const MAINNET_CIAO_ADDRESS: &str = "0x1baEbEE6B00b3f559B0Ff0719B47E0aF22A6bfC4";

// =============================================================================
// Testnet (Blast Sepolia)
// =============================================================================

pub const TESTNET_REST_URL: &str = "https://api.staging.100x.finance";
pub const TESTNET_WS_URL: &str = "wss://api.staging.100x.finance/ws";
pub const TESTNET_CHAIN_ID: u64 = 168587773;
pub const TESTNET_VERIFIER_ADDRESS: &str = "0x02Ca4fcB63E2D3C89fa20D86ccDcfc540c683545";
pub const TESTNET_CIAO_ADDRESS: &str = "0x0c3b9472b3923CfE199bAE24B5f5bD75FAD2bae9";

// =============================================================================
// Session Login
// =============================================================================

/// Message signed under `LoginMessage` for `session.login`
pub const LOGIN_MESSAGE: &str = "I want to log into 100x.finance";

/// JSON-RPC method name for session login
pub const LOGIN_METHOD: &str = "session.login";

/// Login timestamps are forward-dated by this much; the server rejects
/// timestamps older than 10 seconds
pub const LOGIN_FORWARD_DATE_MS: u64 = 10_000;

// =============================================================================
// HTTP Client
// =============================================================================

/// HTTP connection timeout (milliseconds)
pub const HTTP_CONNECT_TIMEOUT_MS: u64 = 5_000;

/// Max idle connections per host in connection pool
pub const HTTP_POOL_MAX_IDLE: usize = 5;

/// Overall HTTP request timeout when the config leaves it unset
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// =============================================================================
// WebSocket
// =============================================================================

/// Capacity of the outbound frame queue feeding the writer task
pub const WS_OUTBOUND_CAPACITY: usize = 256;
