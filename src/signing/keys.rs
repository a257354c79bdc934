//! Key derivation
//!
//! Maps a hex private key to its account address:
//! secp256k1 public point (uncompressed, without the 0x04 tag) -> Keccak-256
//! -> last 20 bytes, presented in EIP-55 checksum form.

use ethers::core::k256::ecdsa::SigningKey;
use ethers::core::k256::elliptic_curve::sec1::ToEncodedPoint;
use ethers::signers::LocalWallet;
use ethers::types::{Address, H256};
use ethers::utils::{keccak256, to_checksum};

use super::eip712::{typed_data_digest, Eip712Domain};
use super::message::SignableMessage;
use super::schema::PrimaryType;
use super::signer::{sign_digest, signature_hex};
use crate::error::{ClientError, ClientResult};

/// Parse a 32-byte secp256k1 scalar from hex (optional `0x` prefix)
///
/// Error messages never echo the key material.
pub fn parse_private_key(key_hex: &str) -> ClientResult<SigningKey> {
    let trimmed = key_hex.trim();
    let stripped = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if stripped.len() != 64 {
        return Err(ClientError::MalformedKey(format!(
            "expected 64 hex characters, got {}",
            stripped.len()
        )));
    }

    let bytes = hex::decode(stripped)
        .map_err(|_| ClientError::MalformedKey("key is not valid hex".into()))?;

    // Rejects zero and scalars >= the group order
    SigningKey::from_slice(&bytes)
        .map_err(|_| ClientError::MalformedKey("key is not a valid secp256k1 scalar".into()))
}

/// Derive the 20-byte account address of a signing key
pub fn address_from_key(signing_key: &SigningKey) -> Address {
    let public_key = signing_key.verifying_key().to_encoded_point(false);
    let public_key = public_key.as_bytes();
    debug_assert_eq!(public_key[0], 0x04);
    let hash = keccak256(&public_key[1..]);
    Address::from_slice(&hash[12..])
}

/// Derive the EIP-55 checksummed address for a hex private key
pub fn derive_address(key_hex: &str) -> ClientResult<String> {
    let signing_key = parse_private_key(key_hex)?;
    Ok(to_checksum(&address_from_key(&signing_key), None))
}

/// Log-safe hint: the last 4 characters of the trimmed key
pub fn key_hint(key_hex: &str) -> String {
    let mut tail: Vec<char> = key_hex.trim().chars().rev().take(4).collect();
    tail.reverse();
    format!("***...{}", tail.into_iter().collect::<String>())
}

/// Signing capability bound to one account
///
/// Holds the key for the lifetime of the client. The derived address is
/// cached at construction. `Debug` only shows the address.
#[derive(Clone)]
pub struct AccountSigner {
    wallet: LocalWallet,
    address: Address,
}

impl AccountSigner {
    pub fn from_hex(key_hex: &str) -> ClientResult<Self> {
        let signing_key = parse_private_key(key_hex)?;
        let address = address_from_key(&signing_key);
        Ok(Self {
            wallet: LocalWallet::from(signing_key),
            address,
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// EIP-55 form, as sent in `account` fields
    pub fn checksum_address(&self) -> String {
        to_checksum(&self.address, None)
    }

    /// Sign a raw 32-byte digest, returning `0x` + 130 hex chars
    pub fn sign_digest_hex(&self, digest: [u8; 32]) -> ClientResult<String> {
        let signature = sign_digest(&self.wallet, H256::from(digest))?;
        Ok(signature_hex(&signature))
    }

    /// Build the EIP-712 digest for `message` and sign it
    pub fn sign_typed(
        &self,
        domain: &Eip712Domain,
        primary_type: PrimaryType,
        message: &SignableMessage,
    ) -> ClientResult<String> {
        let digest = typed_data_digest(domain, primary_type, message)?;
        tracing::trace!(
            primary_type = %primary_type,
            digest = %hex::encode(digest),
            "EIP-712 digest built"
        );
        self.sign_digest_hex(digest)
    }
}

impl std::fmt::Debug for AccountSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountSigner")
            .field("address", &self.checksum_address())
            .finish_non_exhaustive()
    }
}
