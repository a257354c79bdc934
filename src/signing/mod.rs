//! Authenticated request signing
//!
//! This module is organized into submodules:
//! - `keys` - Private key parsing, address derivation, `AccountSigner`
//! - `schema` - Static EIP-712 struct registry
//! - `message` - Field -> value maps handed to the digest builder
//! - `eip712` - Domain separator, struct hashing and the final digest
//! - `signer` - secp256k1 signing with low-s and `v` in {27, 28}

pub mod eip712;
pub mod keys;
pub mod message;
pub mod schema;
pub mod signer;

// Re-export public items
pub use eip712::{typed_data_digest, typed_data_digest_by_name, Eip712Domain};
pub use keys::{derive_address, key_hint, AccountSigner};
pub use message::{MessageValue, SignableMessage};
pub use schema::{PrimaryType, SolidityType};
pub use signer::recover_signer;
