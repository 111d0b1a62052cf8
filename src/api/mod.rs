//! Streamable HTTP transport: the `/mcp` endpoint, its gatekeeper and the
//! session lifecycle around it.

mod error;
mod gatekeeper;
pub mod handlers;
mod routes;
mod state;

#[cfg(test)]
mod mod_test;

pub use error::{ApiError, ErrorResponse};
pub use gatekeeper::{AllowList, enforce};
pub use handlers::mcp::SESSION_HEADER;
pub use routes::create_router;
pub use state::{AppState, DEFAULT_REQUEST_TIMEOUT};

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::mcp::service_factory;
use crate::session::{IdleReaper, SessionStore};

const DEFAULT_LOG_FILTER: &str = "businessmap_mcp=info,tower_http=info";

/// Initialize tracing subscriber with env filter.
///
/// Logs go to stderr: in stdio mode stdout carries the protocol.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Bind the configured address and serve until `shutdown` is cancelled.
pub async fn run(config: &Config, shutdown: CancellationToken) -> Result<(), std::io::Error> {
    let addr = SocketAddr::new(config.host, config.port);
    let listener = TcpListener::bind(addr).await?;
    serve(listener, config, shutdown).await
}

/// Serve the HTTP transport on `listener` until `shutdown` is cancelled.
///
/// On shutdown open event streams end, in-flight requests finish, then the
/// reaper stops and every remaining session is torn down.
pub async fn serve(
    listener: TcpListener,
    config: &Config,
    shutdown: CancellationToken,
) -> Result<(), std::io::Error> {
    let sessions = SessionStore::new();
    let state = AppState::new(
        service_factory(config),
        sessions.clone(),
        config.server_version.clone(),
    )
    .with_shutdown(shutdown.clone());
    let reaper = IdleReaper::new(sessions.clone(), config.session).spawn(shutdown.clone());

    let app = create_router(state, AllowList::from_config(config))
        .layer(TraceLayer::new_for_http());

    info!("MCP server listening on http://{}/mcp", listener.local_addr()?);

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .await;

    shutdown.cancel();
    if let Err(e) = reaper.await {
        warn!("Idle reaper stopped abnormally: {}", e);
    }
    let remaining = sessions.len();
    sessions.close_all().await;
    info!(remaining, "HTTP server stopped");

    result
}
