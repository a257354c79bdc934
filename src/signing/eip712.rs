//! EIP-712 digest builder
//!
//! `digest = keccak256(0x19 || 0x01 || domainSeparator || structHash)`
//! with each struct hashed as `keccak256(typeHash || encodeField(...)...)`.

use ethers::abi::{encode, Token};
use ethers::types::{Address, U256};
use ethers::utils::keccak256;

use super::message::{MessageValue, SignableMessage};
use super::schema::{type_hash, Field, PrimaryType, SolidityType, DOMAIN_FIELDS, DOMAIN_TYPE_NAME};
use crate::config::constants::{DOMAIN_NAME, DOMAIN_VERSION};
use crate::config::{Environment, VerifyingContract};
use crate::error::{ClientError, ClientResult};

/// Domain parameters, immutable after client construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eip712Domain {
    pub name: String,
    pub version: String,
    pub chain_id: u64,
    pub verifying_contract: Address,
}

impl Eip712Domain {
    pub fn new(chain_id: u64, verifying_contract: Address) -> Self {
        Self {
            name: DOMAIN_NAME.to_string(),
            version: DOMAIN_VERSION.to_string(),
            chain_id,
            verifying_contract,
        }
    }

    pub fn for_environment(
        environment: Environment,
        verifying_contract: VerifyingContract,
    ) -> ClientResult<Self> {
        Ok(Self::new(
            environment.chain_id(),
            verifying_contract.resolve(environment)?,
        ))
    }

    fn as_message(&self) -> SignableMessage {
        SignableMessage::new()
            .with("name", self.name.as_str())
            .with("version", self.version.as_str())
            .with("chainId", self.chain_id.to_string())
            .with("verifyingContract", format!("{:?}", self.verifying_contract))
    }

    pub fn separator(&self) -> ClientResult<[u8; 32]> {
        hash_struct(DOMAIN_TYPE_NAME, DOMAIN_FIELDS, &self.as_message())
    }
}

/// Parse a base-10 unsigned integer and check it fits `bits`
fn parse_uint(field: &Field, bits: u16, value: &MessageValue) -> ClientResult<U256> {
    let out_of_range = || ClientError::OutOfRange {
        field: field.name.to_string(),
        solidity_type: field.solidity_type.to_string(),
        value: value.to_string(),
    };

    let parsed = match value {
        MessageValue::Uint(n) => U256::from(*n),
        MessageValue::Str(s) => {
            if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
                return Err(out_of_range());
            }
            U256::from_dec_str(s).map_err(|_| out_of_range())?
        }
        MessageValue::Bool(_) => {
            return Err(ClientError::schema_mismatch(
                "",
                format!("field `{}` expects {}, got a boolean", field.name, field.solidity_type),
            ))
        }
    };

    if parsed.bits() > bits as usize {
        return Err(out_of_range());
    }
    Ok(parsed)
}

/// Encode one field as a 32-byte ABI word
pub fn encode_field(type_name: &str, field: &Field, value: &MessageValue) -> ClientResult<Token> {
    let type_mismatch = |expected: &str| {
        ClientError::schema_mismatch(
            type_name,
            format!("field `{}` expects {}, got `{}`", field.name, expected, value),
        )
    };

    match field.solidity_type {
        SolidityType::Address => {
            let MessageValue::Str(raw) = value else {
                return Err(type_mismatch("an address string"));
            };
            let hex_part = raw.strip_prefix("0x").unwrap_or(raw);
            if hex_part.len() != 40 {
                return Err(ClientError::MalformedAddress {
                    field: field.name.to_string(),
                    value: raw.clone(),
                });
            }
            let address: Address = hex_part.parse().map_err(|_| ClientError::MalformedAddress {
                field: field.name.to_string(),
                value: raw.clone(),
            })?;
            Ok(Token::Address(address))
        }
        SolidityType::Bool => match value {
            MessageValue::Bool(b) => Ok(Token::Bool(*b)),
            _ => Err(type_mismatch("a boolean")),
        },
        SolidityType::String => match value {
            MessageValue::Str(s) => Ok(Token::FixedBytes(keccak256(s.as_bytes()).to_vec())),
            _ => Err(type_mismatch("a string")),
        },
        SolidityType::Uint(bits) => parse_uint(field, bits, value)
            .map(Token::Uint)
            .map_err(|e| match e {
                ClientError::SchemaMismatch { reason, .. } => {
                    ClientError::schema_mismatch(type_name, reason)
                }
                other => other,
            }),
    }
}

/// `keccak256(typeHash(T) || encodeField(f1) || ... || encodeField(fn))`
pub fn hash_struct(
    type_name: &str,
    fields: &'static [Field],
    message: &SignableMessage,
) -> ClientResult<[u8; 32]> {
    let values = message.ordered_values(type_name, fields)?;

    let mut tokens = Vec::with_capacity(values.len() + 1);
    tokens.push(Token::FixedBytes(type_hash(type_name)?.to_vec()));
    for (field, value) in values {
        tokens.push(encode_field(type_name, field, value)?);
    }
    Ok(keccak256(encode(&tokens)))
}

/// The 32-byte hash that gets signed
pub fn typed_data_digest(
    domain: &Eip712Domain,
    primary_type: PrimaryType,
    message: &SignableMessage,
) -> ClientResult<[u8; 32]> {
    let domain_separator = domain.separator()?;
    let struct_hash = hash_struct(primary_type.name(), primary_type.fields(), message)?;

    let mut data = Vec::with_capacity(66);
    data.push(0x19);
    data.push(0x01);
    data.extend_from_slice(&domain_separator);
    data.extend_from_slice(&struct_hash);
    Ok(keccak256(&data))
}

/// Same as `typed_data_digest` with the primary type given by name
pub fn typed_data_digest_by_name(
    domain: &Eip712Domain,
    primary_type: &str,
    message: &SignableMessage,
) -> ClientResult<[u8; 32]> {
    typed_data_digest(domain, primary_type.parse()?, message)
}
