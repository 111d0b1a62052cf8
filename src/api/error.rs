//! HTTP-facing errors of the `/mcp` endpoint.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::session::SessionError;

#[derive(Error, Diagnostic, Debug)]
pub enum ApiError {
    #[error("Missing mcp-session-id header")]
    #[diagnostic(code(businessmap_mcp::api::missing_session_id))]
    MissingSessionId,

    #[error("Session not found: {0}")]
    #[diagnostic(code(businessmap_mcp::api::session_not_found))]
    SessionNotFound(String),

    #[error("{0}")]
    #[diagnostic(code(businessmap_mcp::api::forbidden))]
    Forbidden(String),

    #[error("{0}")]
    #[diagnostic(code(businessmap_mcp::api::bad_request))]
    BadRequest(String),

    #[error("{0}")]
    #[diagnostic(code(businessmap_mcp::api::internal))]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingSessionId | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::SessionNotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::Protocol(_) | SessionError::DuplicateRequest(_) => {
                Self::BadRequest(e.to_string())
            }
            e => Self::Internal(e.to_string()),
        }
    }
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
