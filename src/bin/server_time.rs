//! Smoke test against the configured environment
//!
//! Usage: cargo run --bin server_time
//!
//! Calls GET /time over REST, then opens the WebSocket and performs
//! `session.login`. Credentials come from `.env` (see `ClientConfig::from_env`).
//!
//! # Logging
//! - Uses LOG_FORMAT env var: `json` (default) or `pretty`

use std::time::Duration;

use hundredx_client::config::{self, ClientConfig};
use hundredx_client::{RestClient, WsClient};
use tracing::{info, warn};

const LOGIN_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    config::init_logging();

    let config = ClientConfig::from_env()?;
    info!(environment = %config.environment, "=== 100x connectivity check ===");

    let rest = RestClient::new(&config)?;
    let response = rest.server_time().await?;
    info!(
        status = response.status,
        body = %response.body,
        "GET /time"
    );

    let (ws, _events) = WsClient::connect(&config).await?;
    match tokio::time::timeout(LOGIN_TIMEOUT, ws.login("LOGIN")).await {
        Ok(Ok(login)) => info!(
            success = login.success,
            result = ?login.result,
            error = ?login.error,
            "session.login"
        ),
        Ok(Err(e)) => warn!(error = %e, "session.login failed"),
        Err(_) => warn!(timeout_s = LOGIN_TIMEOUT.as_secs(), "session.login timed out"),
    }
    ws.close().await?;

    Ok(())
}
