use miette::Diagnostic;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ClientError {
    #[error("BusinessMap API Error: {message}")]
    #[diagnostic(code(businessmap_mcp::client::api_error))]
    Api { status: u16, message: String },

    #[error("Network Error: {message}")]
    #[diagnostic(
        code(businessmap_mcp::client::network),
        help("Check BUSINESSMAP_API_URL and that the BusinessMap instance is reachable.")
    )]
    Network { message: String },

    #[error("Invalid response from BusinessMap API: {message}")]
    #[diagnostic(code(businessmap_mcp::client::invalid_response))]
    InvalidResponse { message: String },

    #[error("Cannot {action}: server is running in read-only mode")]
    #[diagnostic(code(businessmap_mcp::client::read_only))]
    ReadOnly { action: String },

    #[error("Failed to build HTTP client: {message}")]
    #[diagnostic(code(businessmap_mcp::client::build))]
    Build { message: String },
}

impl ClientError {
    /// Normalize a non-success response into a single message.
    ///
    /// BusinessMap reports failures as `{"error": {"message": "..."}}`; anything
    /// else falls back to a generic status description.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|value| {
                value
                    .get("error")
                    .and_then(|error| error.get("message"))
                    .and_then(Value::as_str)
                    .map(String::from)
            })
            .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));

        ClientError::Api {
            status: status.as_u16(),
            message,
        }
    }

    /// HTTP status reported by the API, if the failure came from one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::InvalidResponse {
                message: e.to_string(),
            }
        } else {
            ClientError::Network {
                message: e.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::InvalidResponse {
            message: e.to_string(),
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
