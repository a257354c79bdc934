//! Digest signing
//!
//! secp256k1 with RFC 6979 deterministic nonces. Emitted signatures are
//! `r(32) || s(32) || v(1)` with low-s and `v` in {27, 28}.

use ethers::signers::LocalWallet;
use ethers::types::{Address, Signature, H256, U256};

use crate::error::{ClientError, ClientResult};

/// secp256k1 group order n
const CURVE_ORDER: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe,
    0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36, 0x41, 0x41,
];

/// n / 2, the largest accepted `s`
const HALF_CURVE_ORDER: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d, 0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b, 0x20, 0xa0,
];

pub fn half_curve_order() -> U256 {
    U256::from_big_endian(&HALF_CURVE_ORDER)
}

/// Sign a prehashed digest
pub fn sign_digest(wallet: &LocalWallet, digest: H256) -> ClientResult<Signature> {
    let signature = wallet
        .sign_hash(digest)
        .map_err(|e| ClientError::InvalidSignature(format!("EIP-712 signing failed: {}", e)))?;
    normalize(signature)
}

/// Force low-s and `v` in {27, 28}
fn normalize(mut signature: Signature) -> ClientResult<Signature> {
    let mut rec_id = match signature.v {
        0 | 1 => signature.v,
        27 | 28 => signature.v - 27,
        other => {
            return Err(ClientError::InvalidSignature(format!(
                "v value: {} (expected 0, 1, 27, or 28)",
                other
            )))
        }
    };

    if signature.s > half_curve_order() {
        signature.s = U256::from_big_endian(&CURVE_ORDER) - signature.s;
        rec_id ^= 1;
    }

    signature.v = rec_id + 27;
    Ok(signature)
}

/// `0x` + 130 hex chars
pub fn signature_hex(signature: &Signature) -> String {
    format!("0x{}", hex::encode(signature.to_vec()))
}

/// Recover the signing address of `digest` from a hex signature
pub fn recover_signer(signature_hex: &str, digest: [u8; 32]) -> ClientResult<Address> {
    let signature: Signature = signature_hex
        .parse()
        .map_err(|e| ClientError::InvalidSignature(format!("unparseable signature: {}", e)))?;
    signature
        .recover(H256::from(digest))
        .map_err(|e| ClientError::InvalidSignature(format!("recovery failed: {}", e)))
}
