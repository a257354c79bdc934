//! Print the account address derived from `HUNDREDX_PRIVATE_KEY`
//!
//! Usage: cargo run --bin get_address
//!
//! # Logging
//! - Uses LOG_FORMAT env var: `json` (default) or `pretty`

use hundredx_client::config::{self, ClientConfig};
use hundredx_client::derive_address;
use hundredx_client::signing::key_hint;
use tracing::info;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    config::init_logging();

    let config = ClientConfig::from_env()?;
    let address = derive_address(&config.private_key)?;

    info!(key_hint = %key_hint(&config.private_key), "Private key loaded from .env");
    info!(
        environment = %config.environment,
        sub_account_id = config.sub_account_id,
        address = %address,
        "Derived account address"
    );
    println!("{}", address);

    Ok(())
}
