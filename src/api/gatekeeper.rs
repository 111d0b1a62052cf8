//! Host and Origin allow-listing for the `/mcp` endpoint.
//!
//! Guards against DNS rebinding: a browser page on a foreign origin, or a
//! request that reached us under a foreign host name, is turned away before
//! it can touch any session.

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::{HOST, ORIGIN},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use super::error::ApiError;
use crate::config::Config;

#[derive(Debug, Clone)]
pub struct AllowList {
    hosts: Arc<HashSet<String>>,
    origins: Arc<HashSet<String>>,
}

impl AllowList {
    pub fn new<H, O>(hosts: H, origins: O) -> Self
    where
        H: IntoIterator<Item = String>,
        O: IntoIterator<Item = String>,
    {
        Self {
            hosts: Arc::new(
                hosts
                    .into_iter()
                    .map(|host| host.to_ascii_lowercase())
                    .collect(),
            ),
            origins: Arc::new(origins.into_iter().collect()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.allowed_hosts.iter().cloned(),
            config.allowed_origins.iter().cloned(),
        )
    }

    /// Host must be present and listed; Origin, when sent, must be listed.
    /// Host names compare case-insensitively, origins exactly.
    pub fn check(&self, host: Option<&str>, origin: Option<&str>) -> Result<(), ApiError> {
        let host = host.unwrap_or_default();
        if !self.hosts.contains(&host.to_ascii_lowercase()) {
            return Err(ApiError::Forbidden(format!("Invalid Host header: {host}")));
        }
        if let Some(origin) = origin
            && !self.origins.contains(origin)
        {
            return Err(ApiError::Forbidden(format!(
                "Invalid Origin header: {origin}"
            )));
        }
        Ok(())
    }
}

/// Middleware rejecting requests that fail [`AllowList::check`] with 403.
pub async fn enforce(
    State(allow): State<AllowList>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let headers = request.headers();
    let host = headers
        .get(HOST)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .or_else(|| request.uri().authority().map(|a| a.as_str().to_string()));
    let origin = headers
        .get(ORIGIN)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());

    if let Err(e) = allow.check(host.as_deref(), origin.as_deref()) {
        warn!(host = ?host, origin = ?origin, "Rejected request: {}", e);
        return Err(e);
    }
    Ok(next.run(request).await)
}
