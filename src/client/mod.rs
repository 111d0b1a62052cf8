//! BusinessMap REST API client.
//!
//! Every endpoint answers with a `{"data": ...}` envelope; the helpers here
//! unwrap it and normalize failures into [`ClientError`]. The endpoint methods
//! are grouped by entity in the submodules and all live on [`BusinessMapClient`].

mod boards;
mod cards;
pub mod error;
mod users;
mod utility;
mod workspaces;


pub use boards::BoardFilters;
pub use cards::CardFilters;
pub use error::{ClientError, ClientResult};

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Install the process-wide rustls crypto provider.
///
/// reqwest is built without a bundled provider, so this must run before the
/// first client is constructed. Repeated calls are harmless.
pub fn install_crypto_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}

/// Connection settings shared (immutably) by every client instance.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub api_token: String,
    pub read_only: bool,
}

/// HTTP client for one dispatch context.
///
/// Each MCP session builds its own instance so no connection pool or other
/// mutable client state is shared between sessions.
#[derive(Debug)]
pub struct BusinessMapClient {
    base_url: String,
    http: Client,
    read_only: bool,
}

impl BusinessMapClient {
    /// Create a new client from the given settings.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        install_crypto_provider();

        let mut headers = HeaderMap::new();
        let api_key =
            HeaderValue::from_str(config.api_token.trim()).map_err(|e| ClientError::Build {
                message: format!("invalid API token: {e}"),
            })?;
        headers.insert("apikey", api_key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Build {
                message: e.to_string(),
            })?;

        Ok(Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            http,
            read_only: config.read_only,
        })
    }

    /// Get the base URL being used
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "BusinessMap request");
        self.http.request(method, url)
    }

    /// Refuse a mutating call when the server runs in read-only mode.
    fn ensure_writable(&self, action: &str) -> ClientResult<()> {
        if self.read_only {
            return Err(ClientError::ReadOnly {
                action: action.to_string(),
            });
        }
        Ok(())
    }

    /// Send a request and return the `data` member of the response envelope.
    async fn send(&self, builder: RequestBuilder) -> ClientResult<Value> {
        let response = builder.send().await?;
        let body = Self::handle_response(response).await?;
        Ok(match body {
            Value::Object(mut map) => map.remove("data").unwrap_or(Value::Null),
            other => other,
        })
    }

    /// Handle API response with standardized error handling
    ///
    /// Returns the parsed JSON body on success (`Null` for empty bodies), or a
    /// normalized [`ClientError::Api`] on non-success status codes.
    async fn handle_response(response: Response) -> ClientResult<Value> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ClientError::from_response(status, &text));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    pub(crate) async fn get(&self, path: &str) -> ClientResult<Value> {
        self.send(self.request(Method::GET, path)).await
    }

    pub(crate) async fn get_with_query(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> ClientResult<Value> {
        self.send(self.request(Method::GET, path).query(query)).await
    }

    pub(crate) async fn post<B: Serialize + ?Sized>(
        &self,
        action: &str,
        path: &str,
        body: &B,
    ) -> ClientResult<Value> {
        self.ensure_writable(action)?;
        self.send(self.request(Method::POST, path).json(body)).await
    }

    pub(crate) async fn patch<B: Serialize + ?Sized>(
        &self,
        action: &str,
        path: &str,
        body: &B,
    ) -> ClientResult<Value> {
        self.ensure_writable(action)?;
        self.send(self.request(Method::PATCH, path).json(body)).await
    }

    pub(crate) async fn put<B: Serialize + ?Sized>(
        &self,
        action: &str,
        path: &str,
        body: Option<&B>,
    ) -> ClientResult<Value> {
        self.ensure_writable(action)?;
        let builder = self.request(Method::PUT, path);
        let builder = match body {
            Some(body) => builder.json(body),
            None => builder,
        };
        self.send(builder).await
    }

    pub(crate) async fn delete(&self, action: &str, path: &str) -> ClientResult<()> {
        self.ensure_writable(action)?;
        self.send(self.request(Method::DELETE, path)).await?;
        Ok(())
    }
}

/// Query-string builder that renders list filters the way BusinessMap expects
/// them: a single comma-separated value per key.
#[derive(Debug, Default)]
pub(crate) struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn value<T: ToString>(mut self, key: &str, value: Option<T>) -> Self {
        if let Some(value) = value {
            self.pairs.push((key.to_string(), value.to_string()));
        }
        self
    }

    pub(crate) fn list<T: ToString>(mut self, key: &str, values: Option<&[T]>) -> Self {
        if let Some(values) = values.filter(|values| !values.is_empty()) {
            let joined = values
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",");
            self.pairs.push((key.to_string(), joined));
        }
        self
    }

    pub(crate) fn into_pairs(self) -> Vec<(String, String)> {
        self.pairs
    }
}
