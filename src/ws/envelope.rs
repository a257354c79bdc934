//! JSON-RPC 2.0 envelopes
//!
//! Outbound: `{ "jsonrpc": "2.0", "id", "method", "params" }`.
//! Inbound: `{ jsonrpc, id, success, result?, error? }`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::actions::{sign_action, AccountContext, Login};
use crate::config::constants::LOGIN_METHOD;
use crate::error::ClientResult;
use crate::signing::{AccountSigner, Eip712Domain};

pub const JSONRPC_VERSION: &str = "2.0";

fn default_version() -> String {
    JSONRPC_VERSION.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub id: String,
    pub method: String,
    pub params: Value,
}

impl RpcRequest {
    pub fn new(id: impl Into<String>, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: default_version(),
            id: id.into(),
            method: method.into(),
            params,
        }
    }

    /// Serialize to the text frame payload
    pub fn to_frame(&self) -> ClientResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Inbound envelope. Decoding never fails on field types: a missing or
/// mistyped `success` reads as `false`, a numeric `id` is kept as text,
/// and a `null` result or error is absent. `raw` holds the frame as sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub id: Option<String>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
    #[serde(skip)]
    pub raw: Value,
}

impl From<Value> for RpcResponse {
    fn from(raw: Value) -> Self {
        let present = |key: &str| raw.get(key).filter(|v| !v.is_null()).cloned();
        let id = match raw.get("id") {
            Some(Value::String(id)) => Some(id.clone()),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => None,
        };
        Self {
            jsonrpc: raw
                .get("jsonrpc")
                .and_then(Value::as_str)
                .map_or_else(default_version, str::to_string),
            id,
            success: raw.get("success").and_then(Value::as_bool).unwrap_or(false),
            result: present("result"),
            error: present("error"),
            raw,
        }
    }
}

impl RpcResponse {
    /// Parse an inbound text frame; `None` for anything that is not an object
    pub fn parse(text: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(text).ok()?;
        value.is_object().then(|| Self::from(value))
    }
}

/// `session.login` envelope, timestamp forward-dated from `now_ms`
pub fn login_request(
    signer: &AccountSigner,
    domain: &Eip712Domain,
    id: impl Into<String>,
    now_ms: u64,
) -> ClientResult<RpcRequest> {
    // LoginMessage carries no sub-account
    let ctx = AccountContext::new(signer.address(), 0);
    let params = sign_action(signer, domain, &ctx, &Login::at(now_ms))?;
    Ok(RpcRequest::new(id, LOGIN_METHOD, params))
}
