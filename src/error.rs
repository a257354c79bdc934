//! Client-wide error types using thiserror
//!
//! Every fallible operation in the crate returns a `ClientError`.
//! Signing and encoding failures never touch the network; transport
//! failures are surfaced as-is without retry.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Private key is not 64 hex chars or is not a valid secp256k1 scalar
    #[error("Malformed private key: {0}")]
    MalformedKey(String),

    /// Value supplied for an `address` field is not a 20-byte hex string
    #[error("Malformed address for field `{field}`: {value}")]
    MalformedAddress { field: String, value: String },

    #[error("Unknown primary type: {0}")]
    UnknownPrimaryType(String),

    /// Message keys disagree with the schema of the primary type
    #[error("Schema mismatch for {primary_type}: {reason}")]
    SchemaMismatch {
        primary_type: String,
        reason: String,
    },

    /// Numeric value does not fit its declared `uintN` width
    #[error("Value for `{field}` does not fit {solidity_type}: {value}")]
    OutOfRange {
        field: String,
        solidity_type: String,
        value: String,
    },

    /// Signing produced an unusable signature, or a signature failed to
    /// parse or recover
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// Caller-supplied request parameter cannot be placed on the wire
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Encoding failure: {0}")]
    EncodingFailure(#[from] serde_json::Error),

    #[error("Transport failure: {0}")]
    TransportFailure(String),

    #[error("Transport timeout: {0}")]
    TransportTimeout(String),

    /// WebSocket protocol error (boxed to reduce enum size)
    #[error("WebSocket error: {0}")]
    WebSocket(Box<tokio_tungstenite::tungstenite::Error>),

    /// A WebSocket request with this `id` is still awaiting its response
    #[error("Request id already in flight: {0}")]
    DuplicateRequestId(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    pub(crate) fn schema_mismatch(primary_type: &str, reason: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            primary_type: primary_type.to_string(),
            reason: reason.into(),
        }
    }

    /// True for failures raised before anything reached the network
    pub fn is_local(&self) -> bool {
        !matches!(
            self,
            Self::TransportFailure(_) | Self::TransportTimeout(_) | Self::WebSocket(_)
        )
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::TransportTimeout(err.to_string())
        } else {
            Self::TransportFailure(err.to_string())
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for ClientError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::WebSocket(Box::new(err))
    }
}

/// Result type alias using ClientError
pub type ClientResult<T> = std::result::Result<T, ClientError>;
