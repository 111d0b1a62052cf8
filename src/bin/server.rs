//! BusinessMap MCP server binary.
//!
//! Loads configuration, verifies the upstream API is reachable and serves MCP
//! over the configured transport until interrupted.

use businessmap_mcp::api;
use businessmap_mcp::client::{
    BusinessMapClient, ClientConfig, ClientError, install_crypto_provider,
};
use businessmap_mcp::config::{Config, ConfigError, TransportKind};
use businessmap_mcp::mcp::{
    BusinessMapServer, HEALTH_CHECK_ATTEMPTS, HEALTH_CHECK_DELAY, connect_with_retry,
    serve_stdio,
};
use clap::Parser;
use miette::Diagnostic;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Error, Diagnostic, Debug)]
enum BinaryError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Client(#[from] ClientError),

    #[error("Transport error: {0}")]
    #[diagnostic(code(businessmap_mcp::binary::io))]
    Io(#[from] std::io::Error),
}

#[derive(Parser)]
#[command(name = "businessmap-mcp")]
#[command(author, version, about = "MCP server for the BusinessMap API", long_about = None)]
struct Cli {
    /// Transport to serve: stdio or http (overrides TRANSPORT)
    #[arg(short, long)]
    transport: Option<TransportKind>,

    /// Port for the HTTP transport (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Register only tools that do not modify BusinessMap
    #[arg(long)]
    read_only: bool,
}

impl Cli {
    fn apply(&self, mut config: Config) -> Config {
        if let Some(transport) = self.transport {
            config = config.with_transport(transport);
        }
        if let Some(port) = self.port {
            config = config.with_port(port);
        }
        if self.read_only {
            config = config.with_read_only(true);
        }
        config
    }
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    api::init_tracing();
    install_crypto_provider();

    run(cli).await.map_err(|e| {
        error!("Failed to start server: {}", e);
        e.into()
    })
}

async fn run(cli: Cli) -> Result<(), BinaryError> {
    let config = cli.apply(Config::from_env()?);
    config.validate()?;
    info!(
        transport = ?config.transport,
        read_only = config.read_only,
        "Starting {} v{}",
        config.server_name,
        config.server_version
    );

    let upstream = BusinessMapClient::new(&ClientConfig {
        api_url: config.api_url.clone(),
        api_token: config.api_token.clone(),
        read_only: config.read_only,
    })?;
    connect_with_retry(&upstream, HEALTH_CHECK_ATTEMPTS, HEALTH_CHECK_DELAY).await?;

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            match wait_for_shutdown_signal().await {
                Ok(()) => {
                    info!("Shutdown signal received");
                    shutdown.cancel();
                }
                Err(e) => error!("Failed to install signal handlers: {}", e),
            }
        }
    });

    match config.transport {
        TransportKind::Stdio => {
            serve_stdio(BusinessMapServer::from_config(&config)?, shutdown).await?
        }
        TransportKind::Http => api::run(&config, shutdown).await?,
    }
    Ok(())
}

async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = term.recv() => {}
        }
        Ok(())
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await
    }
}
