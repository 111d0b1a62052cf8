//! Dispatch context construction and the stdio transport.

use std::sync::Arc;
use std::time::Duration;

use rmcp::ServiceExt;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::server::{BusinessMapServer, ServerSettings};
use crate::client::{BusinessMapClient, ClientConfig, ClientError, ClientResult};
use crate::config::Config;
use crate::session::{ServiceFactory, SessionError};

pub const HEALTH_CHECK_ATTEMPTS: u32 = 3;
pub const HEALTH_CHECK_DELAY: Duration = Duration::from_secs(2);

/// Factory handing every new session its own server and upstream client.
pub fn service_factory(config: &Config) -> ServiceFactory<BusinessMapServer> {
    let client_config = ClientConfig {
        api_url: config.api_url.clone(),
        api_token: config.api_token.clone(),
        read_only: config.read_only,
    };
    let settings = ServerSettings::from_config(config);

    Arc::new(move || -> Result<BusinessMapServer, SessionError> {
        let client = BusinessMapClient::new(&client_config)
            .map_err(|e| SessionError::Factory(e.to_string()))?;
        Ok(BusinessMapServer::new(client, settings.clone()))
    })
}

/// Check the upstream until it answers or the attempts run out.
pub async fn connect_with_retry(
    client: &BusinessMapClient,
    attempts: u32,
    delay: Duration,
) -> ClientResult<()> {
    for attempt in 1..=attempts {
        if client.health_check().await {
            info!("Connected to BusinessMap API at {}", client.base_url());
            return Ok(());
        }
        if attempt < attempts {
            warn!(
                attempt,
                attempts,
                "BusinessMap API health check failed, retrying in {:?}",
                delay
            );
            tokio::time::sleep(delay).await;
        }
    }
    Err(ClientError::Network {
        message: format!(
            "Failed to connect to BusinessMap API at {} after {attempts} attempts",
            client.base_url()
        ),
    })
}

/// Serve a single session over stdin/stdout until the peer leaves or
/// `shutdown` fires.
pub async fn serve_stdio(
    server: BusinessMapServer,
    shutdown: CancellationToken,
) -> Result<(), std::io::Error> {
    info!("Serving MCP over stdio");
    let running = server
        .serve(rmcp::transport::stdio())
        .await
        .map_err(std::io::Error::other)?;

    let cancel = running.cancellation_token();
    tokio::select! {
        result = running.waiting() => {
            result.map_err(std::io::Error::other)?;
        }
        _ = shutdown.cancelled() => {
            cancel.cancel();
        }
    }
    info!("stdio session ended");
    Ok(())
}
