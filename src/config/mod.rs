//! Server configuration.
//!
//! Everything is sourced from the environment once at startup (an optional
//! `.env` file in the working directory is loaded first) and validated before
//! the server accepts any connection. CLI flags can override individual values.

use std::collections::HashMap;
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

use miette::Diagnostic;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;


/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 3000;
/// Default idle timeout before a session is evicted (30 minutes).
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 30 * 60;
/// Default interval between idle sweeps.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

#[derive(Error, Diagnostic, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Required environment variable {name} is not set")]
    #[diagnostic(
        code(businessmap_mcp::config::missing),
        help("Set it in the environment or in a .env file in the working directory.")
    )]
    Missing { name: String },

    #[error("Environment variable {name} must be a valid number (received: \"{value}\")")]
    #[diagnostic(code(businessmap_mcp::config::invalid_number))]
    InvalidNumber { name: String, value: String },

    #[error("Environment variable {name} must be a valid IP address (received: \"{value}\")")]
    #[diagnostic(code(businessmap_mcp::config::invalid_address))]
    InvalidAddress { name: String, value: String },

    #[error("BUSINESSMAP_API_URL must be a valid URL")]
    #[diagnostic(code(businessmap_mcp::config::invalid_url))]
    InvalidUrl,

    #[error("BUSINESSMAP_API_TOKEN cannot be empty")]
    #[diagnostic(code(businessmap_mcp::config::empty_token))]
    EmptyToken,

    #[error("TRANSPORT must be either \"stdio\" or \"http\" (received: \"{0}\")")]
    #[diagnostic(code(businessmap_mcp::config::invalid_transport))]
    InvalidTransport(String),

    #[error(
        "Session idle timeout ({timeout_secs}s) must be greater than the sweep interval ({interval_secs}s)"
    )]
    #[diagnostic(code(businessmap_mcp::config::session_timing))]
    SessionTiming {
        timeout_secs: u64,
        interval_secs: u64,
    },
}

/// How the server talks to its MCP clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportKind {
    /// Newline-delimited JSON-RPC over stdin/stdout.
    #[default]
    Stdio,
    /// Session-oriented streamable HTTP on `/mcp`.
    Http,
}

impl FromStr for TransportKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stdio" => Ok(Self::Stdio),
            "http" => Ok(Self::Http),
            "sse" => {
                warn!("TRANSPORT=sse is deprecated. Falling back to TRANSPORT=http");
                Ok(Self::Http)
            }
            other => Err(ConfigError::InvalidTransport(other.to_string())),
        }
    }
}

/// Session lifecycle timing for the HTTP transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub idle_timeout: Duration,
    pub sweep_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }
}

/// Complete server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the BusinessMap API, e.g. `https://acme.kanbanize.com/api/v2`
    pub api_url: String,
    /// API key sent in the `apikey` header
    pub api_token: String,
    pub default_workspace_id: Option<i64>,
    /// Suppresses every mutating tool when set
    pub read_only: bool,
    pub server_name: String,
    pub server_version: String,
    pub host: IpAddr,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub allowed_hosts: Vec<String>,
    pub transport: TransportKind,
    pub session: SessionConfig,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// A `.env` file in the current working directory is read first when present;
    /// variables already set in the environment take precedence over it.
    pub fn from_env() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => info!("Loaded environment variables from {}", path.display()),
            Err(_) => info!("No .env file found, using process environment"),
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvReader { lookup };

        let port = env.number("PORT")?.unwrap_or(DEFAULT_PORT);
        let idle_timeout = env
            .number("SESSION_IDLE_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_IDLE_TIMEOUT_SECS);
        let sweep_interval = env
            .number("SESSION_SWEEP_INTERVAL_SECS")?
            .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS);

        let host = match env.non_empty("HOST") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidAddress {
                name: "HOST".to_string(),
                value,
            })?,
            None => IpAddr::from([127, 0, 0, 1]),
        };

        let transport = match env.non_empty("TRANSPORT") {
            Some(value) => value.parse()?,
            None => TransportKind::Stdio,
        };

        Ok(Self {
            api_url: env.required("BUSINESSMAP_API_URL")?,
            api_token: env.required("BUSINESSMAP_API_TOKEN")?,
            default_workspace_id: env.number("BUSINESSMAP_DEFAULT_WORKSPACE_ID")?,
            read_only: env.flag("BUSINESSMAP_READ_ONLY_MODE"),
            server_name: env
                .non_empty("MCP_SERVER_NAME")
                .unwrap_or_else(|| "businessmap-mcp".to_string()),
            server_version: env
                .non_empty("MCP_SERVER_VERSION")
                .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
            host,
            port,
            allowed_origins: env
                .list("ALLOWED_ORIGINS")
                .unwrap_or_else(|| vec!["http://localhost".to_string()]),
            allowed_hosts: env
                .list("ALLOWED_HOSTS")
                .unwrap_or_else(|| default_allowed_hosts(port)),
            transport,
            session: SessionConfig {
                idle_timeout: Duration::from_secs(idle_timeout),
                sweep_interval: Duration::from_secs(sweep_interval),
            },
        })
    }

    /// Semantic validation run once before startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.parsed_api_url()?;

        if self.api_token.trim().is_empty() {
            return Err(ConfigError::EmptyToken);
        }

        let SessionConfig {
            idle_timeout,
            sweep_interval,
        } = self.session;
        if sweep_interval.is_zero() || idle_timeout <= sweep_interval {
            return Err(ConfigError::SessionTiming {
                timeout_secs: idle_timeout.as_secs(),
                interval_secs: sweep_interval.as_secs(),
            });
        }

        Ok(())
    }

    /// The API base URL as a parsed [`Url`].
    pub fn parsed_api_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.api_url).map_err(|_| ConfigError::InvalidUrl)
    }

    /// Override the transport, e.g. from a CLI flag.
    pub fn with_transport(mut self, transport: TransportKind) -> Self {
        self.transport = transport;
        self
    }

    /// Override the listening port.
    ///
    /// Allowed hosts still at their loopback defaults follow the new port;
    /// an explicit `ALLOWED_HOSTS` list is kept as given.
    pub fn with_port(mut self, port: u16) -> Self {
        if self.allowed_hosts == default_allowed_hosts(self.port) {
            self.allowed_hosts = default_allowed_hosts(port);
        }
        self.port = port;
        self
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }
}

/// Loopback host names, with and without the listening port.
pub fn default_allowed_hosts(port: u16) -> Vec<String> {
    vec![
        "localhost".to_string(),
        "127.0.0.1".to_string(),
        "[::1]".to_string(),
        format!("localhost:{port}"),
        format!("127.0.0.1:{port}"),
        format!("[::1]:{port}"),
    ]
}

/// Typed accessors over a variable lookup function.
struct EnvReader<F> {
    lookup: F,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn non_empty(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|value| !value.is_empty())
    }

    fn required(&self, name: &str) -> Result<String, ConfigError> {
        self.non_empty(name).ok_or_else(|| ConfigError::Missing {
            name: name.to_string(),
        })
    }

    fn flag(&self, name: &str) -> bool {
        self.non_empty(name)
            .map(|value| value.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    fn number<T: FromStr>(&self, name: &str) -> Result<Option<T>, ConfigError> {
        match self.non_empty(name) {
            None => Ok(None),
            Some(value) => value
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| ConfigError::InvalidNumber {
                    name: name.to_string(),
                    value,
                }),
        }
    }

    fn list(&self, name: &str) -> Option<Vec<String>> {
        self.non_empty(name).map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(String::from)
                .collect()
        })
    }
}

/// Convenience for tests and embedding: a lookup backed by a map.
pub fn lookup_from_map(vars: HashMap<String, String>) -> impl Fn(&str) -> Option<String> {
    move |name| vars.get(name).cloned()
}
