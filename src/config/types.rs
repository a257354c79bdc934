//! Configuration types for client construction
//!
//! `ClientConfig` is plain data handed to the REST and WebSocket façades.
//! `ClientConfig::from_env` is a convenience for binaries; the façades
//! themselves never read the environment.

use std::str::FromStr;
use std::time::Duration;

use ethers::types::Address;
use serde::{Deserialize, Serialize};

use super::constants::{
    DEFAULT_REQUEST_TIMEOUT, MAINNET_CHAIN_ID, MAINNET_CIAO_ADDRESS, MAINNET_REST_URL,
    MAINNET_VERIFIER_ADDRESS, MAINNET_WS_URL, TESTNET_CHAIN_ID, TESTNET_CIAO_ADDRESS,
    TESTNET_REST_URL, TESTNET_VERIFIER_ADDRESS, TESTNET_WS_URL,
};
use crate::error::{ClientError, ClientResult};

// ============================================================================
// Environment
// ============================================================================

/// Exchange deployment the client talks to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Mainnet,
    #[default]
    Testnet,
}

impl Environment {
    pub fn rest_url(&self) -> &'static str {
        match self {
            Environment::Mainnet => MAINNET_REST_URL,
            Environment::Testnet => TESTNET_REST_URL,
        }
    }

    pub fn ws_url(&self) -> &'static str {
        match self {
            Environment::Mainnet => MAINNET_WS_URL,
            Environment::Testnet => TESTNET_WS_URL,
        }
    }

    pub fn chain_id(&self) -> u64 {
        match self {
            Environment::Mainnet => MAINNET_CHAIN_ID,
            Environment::Testnet => TESTNET_CHAIN_ID,
        }
    }

    pub fn verifier_address(&self) -> &'static str {
        match self {
            Environment::Mainnet => MAINNET_VERIFIER_ADDRESS,
            Environment::Testnet => TESTNET_VERIFIER_ADDRESS,
        }
    }

    pub fn ciao_address(&self) -> &'static str {
        match self {
            Environment::Mainnet => MAINNET_CIAO_ADDRESS,
            Environment::Testnet => TESTNET_CIAO_ADDRESS,
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Mainnet => write!(f, "mainnet"),
            Environment::Testnet => write!(f, "testnet"),
        }
    }
}

impl FromStr for Environment {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Environment::Mainnet),
            "testnet" => Ok(Environment::Testnet),
            other => Err(ClientError::Config(format!(
                "unknown environment '{}', expected mainnet or testnet",
                other
            ))),
        }
    }
}

// ============================================================================
// Verifying Contract Selection
// ============================================================================

/// Which contract is used as the EIP-712 `verifyingContract`
///
/// The exchange publishes two addresses per environment (the order verifier
/// and the CIAO contract). `Verifier` is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerifyingContract {
    #[default]
    Verifier,
    Ciao,
    Custom(Address),
}

impl VerifyingContract {
    pub fn resolve(&self, environment: Environment) -> ClientResult<Address> {
        let raw = match self {
            VerifyingContract::Verifier => environment.verifier_address(),
            VerifyingContract::Ciao => environment.ciao_address(),
            VerifyingContract::Custom(address) => return Ok(*address),
        };
        raw.parse().map_err(|_| ClientError::MalformedAddress {
            field: "verifyingContract".into(),
            value: raw.to_string(),
        })
    }
}

impl FromStr for VerifyingContract {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "verifier" => Ok(VerifyingContract::Verifier),
            "ciao" => Ok(VerifyingContract::Ciao),
            other => other
                .parse::<Address>()
                .map(VerifyingContract::Custom)
                .map_err(|_| {
                    ClientError::Config(format!(
                        "verifying contract must be 'verifier', 'ciao' or an address, got '{}'",
                        other
                    ))
                }),
        }
    }
}

// ============================================================================
// Client Configuration
// ============================================================================

/// Inputs for building a REST or WebSocket client
#[derive(Clone, Default)]
pub struct ClientConfig {
    pub environment: Environment,
    /// Hex private key, with or without `0x`
    pub private_key: String,
    /// Sub-account slot (0-255)
    pub sub_account_id: u8,
    /// Overall HTTP request timeout; `None` uses the crate default
    pub timeout: Option<Duration>,
    pub verifying_contract: VerifyingContract,
    /// Overrides the environment's REST base URL
    pub rest_url: Option<String>,
    /// Overrides the environment's WebSocket URL
    pub ws_url: Option<String>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("environment", &self.environment)
            .field("private_key", &"<redacted>")
            .field("sub_account_id", &self.sub_account_id)
            .field("timeout", &self.timeout)
            .field("verifying_contract", &self.verifying_contract)
            .field("rest_url", &self.rest_url)
            .field("ws_url", &self.ws_url)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(
        environment: Environment,
        private_key: impl Into<String>,
        sub_account_id: u8,
    ) -> Self {
        Self {
            environment,
            private_key: private_key.into(),
            sub_account_id,
            ..Default::default()
        }
    }

    /// Create configuration from environment variables (after loading `.env`)
    ///
    /// - `HUNDREDX_PRIVATE_KEY` (required)
    /// - `HUNDREDX_ENVIRONMENT`: `mainnet` | `testnet` (default `testnet`)
    /// - `HUNDREDX_SUB_ACCOUNT_ID`: 0-255 (default 0)
    /// - `HUNDREDX_TIMEOUT_MS`: overall HTTP timeout
    /// - `HUNDREDX_VERIFYING_CONTRACT`: `verifier` | `ciao` | address
    pub fn from_env() -> ClientResult<Self> {
        let _ = dotenvy::dotenv();

        let private_key = std::env::var("HUNDREDX_PRIVATE_KEY")
            .map_err(|_| ClientError::Config("HUNDREDX_PRIVATE_KEY not set".into()))?;
        if private_key.is_empty() {
            return Err(ClientError::Config("HUNDREDX_PRIVATE_KEY is empty".into()));
        }

        let environment = match std::env::var("HUNDREDX_ENVIRONMENT") {
            Ok(value) => value.parse()?,
            Err(_) => Environment::default(),
        };

        let sub_account_id = match std::env::var("HUNDREDX_SUB_ACCOUNT_ID") {
            Ok(value) => value.trim().parse::<u8>().map_err(|e| {
                ClientError::Config(format!("HUNDREDX_SUB_ACCOUNT_ID '{}': {}", value, e))
            })?,
            Err(_) => 0,
        };

        let timeout = match std::env::var("HUNDREDX_TIMEOUT_MS") {
            Ok(value) => Some(Duration::from_millis(value.trim().parse().map_err(|e| {
                ClientError::Config(format!("HUNDREDX_TIMEOUT_MS '{}': {}", value, e))
            })?)),
            Err(_) => None,
        };

        let verifying_contract = match std::env::var("HUNDREDX_VERIFYING_CONTRACT") {
            Ok(value) => value.parse()?,
            Err(_) => VerifyingContract::default(),
        };

        Ok(Self {
            environment,
            private_key,
            sub_account_id,
            timeout,
            verifying_contract,
            rest_url: None,
            ws_url: None,
        })
    }

    pub fn rest_url(&self) -> &str {
        self.rest_url
            .as_deref()
            .unwrap_or_else(|| self.environment.rest_url())
    }

    pub fn ws_url(&self) -> &str {
        self.ws_url
            .as_deref()
            .unwrap_or_else(|| self.environment.ws_url())
    }

    pub fn request_timeout(&self) -> Duration {
        self.timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const TEST_KEY: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

    fn clear_env() {
        for var in [
            "HUNDREDX_PRIVATE_KEY",
            "HUNDREDX_ENVIRONMENT",
            "HUNDREDX_SUB_ACCOUNT_ID",
            "HUNDREDX_TIMEOUT_MS",
            "HUNDREDX_VERIFYING_CONTRACT",
        ] {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_environment_tables() {
        assert_eq!(Environment::Testnet.chain_id(), 168587773);
        assert_eq!(Environment::Mainnet.chain_id(), 81457);
        assert!(Environment::Testnet.rest_url().contains("staging"));
        assert!(!Environment::Mainnet.rest_url().contains("staging"));
        assert!(Environment::Mainnet.ws_url().starts_with("wss://"));
    }

    #[test]
    fn test_environment_from_str() {
        assert_eq!("mainnet".parse::<Environment>().unwrap(), Environment::Mainnet);
        assert_eq!(" TESTNET ".parse::<Environment>().unwrap(), Environment::Testnet);
        assert!("devnet".parse::<Environment>().is_err());
    }

    #[test]
    fn test_verifying_contract_resolution() {
        let verifier = VerifyingContract::Verifier
            .resolve(Environment::Testnet)
            .unwrap();
        let ciao = VerifyingContract::Ciao.resolve(Environment::Testnet).unwrap();
        assert_ne!(verifier, ciao);
        assert_eq!(verifier, TESTNET_VERIFIER_ADDRESS.parse::<Address>().unwrap());

        let custom = Address::repeat_byte(0x11);
        assert_eq!(
            VerifyingContract::Custom(custom)
                .resolve(Environment::Mainnet)
                .unwrap(),
            custom
        );
    }

    #[test]
    fn test_verifying_contract_from_str() {
        assert_eq!("ciao".parse::<VerifyingContract>().unwrap(), VerifyingContract::Ciao);
        assert_eq!(
            "Verifier".parse::<VerifyingContract>().unwrap(),
            VerifyingContract::Verifier
        );
        assert!(matches!(
            "0x1111111111111111111111111111111111111111".parse::<VerifyingContract>(),
            Ok(VerifyingContract::Custom(_))
        ));
        assert!("nonsense".parse::<VerifyingContract>().is_err());
    }

    #[test]
    fn test_url_overrides() {
        let mut config = ClientConfig::new(Environment::Testnet, TEST_KEY, 1);
        assert_eq!(config.rest_url(), TESTNET_REST_URL);
        config.rest_url = Some("http://127.0.0.1:9999".into());
        assert_eq!(config.rest_url(), "http://127.0.0.1:9999");
        assert_eq!(config.request_timeout(), DEFAULT_REQUEST_TIMEOUT);
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let config = ClientConfig::new(Environment::Testnet, TEST_KEY, 0);
        let debug_str = format!("{:?}", config);
        assert!(!debug_str.contains(TEST_KEY), "Key leaked: {}", debug_str);
        assert!(debug_str.contains("<redacted>"));
    }

    #[test]
    #[serial]
    fn test_from_env_missing_key() {
        clear_env();
        let result = ClientConfig::from_env();
        assert!(matches!(result, Err(ClientError::Config(_))));
    }

    #[test]
    #[serial]
    fn test_from_env_reads_all_fields() {
        clear_env();
        std::env::set_var("HUNDREDX_PRIVATE_KEY", TEST_KEY);
        std::env::set_var("HUNDREDX_ENVIRONMENT", "mainnet");
        std::env::set_var("HUNDREDX_SUB_ACCOUNT_ID", "7");
        std::env::set_var("HUNDREDX_TIMEOUT_MS", "2500");
        std::env::set_var("HUNDREDX_VERIFYING_CONTRACT", "ciao");

        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.environment, Environment::Mainnet);
        assert_eq!(config.sub_account_id, 7);
        assert_eq!(config.timeout, Some(Duration::from_millis(2500)));
        assert_eq!(config.verifying_contract, VerifyingContract::Ciao);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_sub_account_out_of_range() {
        clear_env();
        std::env::set_var("HUNDREDX_PRIVATE_KEY", TEST_KEY);
        std::env::set_var("HUNDREDX_SUB_ACCOUNT_ID", "256");
        let result = ClientConfig::from_env();
        assert!(matches!(result, Err(ClientError::Config(_))));
        clear_env();
    }
}
