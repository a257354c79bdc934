//! EIP-712 schema registry
//!
//! Static catalogue of struct definitions for every signable action plus
//! the domain. Field order is significant: encoding is positional.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::OnceLock;

use ethers::utils::keccak256;

use crate::error::{ClientError, ClientResult};

/// Solidity types that appear in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolidityType {
    Address,
    Bool,
    String,
    /// `uintN` with N bits
    Uint(u16),
}

impl std::fmt::Display for SolidityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolidityType::Address => write!(f, "address"),
            SolidityType::Bool => write!(f, "bool"),
            SolidityType::String => write!(f, "string"),
            SolidityType::Uint(bits) => write!(f, "uint{}", bits),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub solidity_type: SolidityType,
}

const fn field(name: &'static str, solidity_type: SolidityType) -> Field {
    Field {
        name,
        solidity_type,
    }
}

use SolidityType::{Address, Bool, String as Str, Uint};

pub const DOMAIN_TYPE_NAME: &str = "EIP712Domain";

pub const DOMAIN_FIELDS: &[Field] = &[
    field("name", Str),
    field("version", Str),
    field("chainId", Uint(256)),
    field("verifyingContract", Address),
];

const LOGIN_MESSAGE_FIELDS: &[Field] = &[
    field("account", Address),
    field("message", Str),
    field("timestamp", Uint(64)),
];

const ORDER_FIELDS: &[Field] = &[
    field("account", Address),
    field("subAccountId", Uint(8)),
    field("productId", Uint(32)),
    field("isBuy", Bool),
    field("orderType", Uint(8)),
    field("timeInForce", Uint(8)),
    field("expiration", Uint(64)),
    field("price", Uint(128)),
    field("quantity", Uint(128)),
    field("nonce", Uint(64)),
];

const CANCEL_ORDER_FIELDS: &[Field] = &[
    field("account", Address),
    field("subAccountId", Uint(8)),
    field("productId", Uint(32)),
    field("orderId", Str),
];

const CANCEL_ORDERS_FIELDS: &[Field] = &[
    field("account", Address),
    field("subAccountId", Uint(8)),
    field("productId", Uint(32)),
];

const APPROVE_SIGNER_FIELDS: &[Field] = &[
    field("account", Address),
    field("subAccountId", Uint(8)),
    field("approvedSigner", Address),
    field("isApproved", Bool),
    field("nonce", Uint(64)),
];

const WITHDRAW_FIELDS: &[Field] = &[
    field("account", Address),
    field("subAccountId", Uint(8)),
    field("asset", Address),
    field("quantity", Uint(128)),
    field("nonce", Uint(64)),
];

const SIGNED_AUTHENTICATION_FIELDS: &[Field] = &[
    field("account", Address),
    field("subAccountId", Uint(8)),
];

/// Struct whose instance is being signed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimaryType {
    LoginMessage,
    Order,
    CancelOrder,
    CancelOrders,
    ApproveSigner,
    Withdraw,
    SignedAuthentication,
}

impl PrimaryType {
    pub const ALL: [PrimaryType; 7] = [
        PrimaryType::LoginMessage,
        PrimaryType::Order,
        PrimaryType::CancelOrder,
        PrimaryType::CancelOrders,
        PrimaryType::ApproveSigner,
        PrimaryType::Withdraw,
        PrimaryType::SignedAuthentication,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PrimaryType::LoginMessage => "LoginMessage",
            PrimaryType::Order => "Order",
            PrimaryType::CancelOrder => "CancelOrder",
            PrimaryType::CancelOrders => "CancelOrders",
            PrimaryType::ApproveSigner => "ApproveSigner",
            PrimaryType::Withdraw => "Withdraw",
            PrimaryType::SignedAuthentication => "SignedAuthentication",
        }
    }

    pub fn fields(&self) -> &'static [Field] {
        match self {
            PrimaryType::LoginMessage => LOGIN_MESSAGE_FIELDS,
            PrimaryType::Order => ORDER_FIELDS,
            PrimaryType::CancelOrder => CANCEL_ORDER_FIELDS,
            PrimaryType::CancelOrders => CANCEL_ORDERS_FIELDS,
            PrimaryType::ApproveSigner => APPROVE_SIGNER_FIELDS,
            PrimaryType::Withdraw => WITHDRAW_FIELDS,
            PrimaryType::SignedAuthentication => SIGNED_AUTHENTICATION_FIELDS,
        }
    }

    pub fn type_hash(&self) -> [u8; 32] {
        type_hashes()
            .get(self.name())
            .copied()
            .unwrap_or_else(|| keccak256(encode_type(self.name(), self.fields())))
    }
}

impl std::fmt::Display for PrimaryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PrimaryType {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PrimaryType::ALL
            .into_iter()
            .find(|primary_type| primary_type.name() == s)
            .ok_or_else(|| ClientError::UnknownPrimaryType(s.to_string()))
    }
}

/// Look up any struct in the registry, including `EIP712Domain`
pub fn lookup(type_name: &str) -> ClientResult<&'static [Field]> {
    if type_name == DOMAIN_TYPE_NAME {
        return Ok(DOMAIN_FIELDS);
    }
    type_name.parse::<PrimaryType>().map(|t| t.fields())
}

/// Canonical type string, e.g. `CancelOrders(address account,uint8 subAccountId,uint32 productId)`
///
/// No registered struct references another, so there is no appendix.
pub fn encode_type(type_name: &str, fields: &[Field]) -> String {
    let members = fields
        .iter()
        .map(|f| format!("{} {}", f.solidity_type, f.name))
        .collect::<Vec<_>>()
        .join(",");
    format!("{}({})", type_name, members)
}

/// Type hashes for every registered struct, computed once per process
fn type_hashes() -> &'static HashMap<&'static str, [u8; 32]> {
    static TYPE_HASHES: OnceLock<HashMap<&'static str, [u8; 32]>> = OnceLock::new();
    TYPE_HASHES.get_or_init(|| {
        let mut hashes = HashMap::new();
        hashes.insert(
            DOMAIN_TYPE_NAME,
            keccak256(encode_type(DOMAIN_TYPE_NAME, DOMAIN_FIELDS)),
        );
        for primary_type in PrimaryType::ALL {
            hashes.insert(
                primary_type.name(),
                keccak256(encode_type(primary_type.name(), primary_type.fields())),
            );
        }
        hashes
    })
}

/// Keccak-256 of the canonical type string of a registered struct
pub fn type_hash(type_name: &str) -> ClientResult<[u8; 32]> {
    match type_hashes().get(type_name) {
        Some(hash) => Ok(*hash),
        None => lookup(type_name).map(|fields| keccak256(encode_type(type_name, fields))),
    }
}
