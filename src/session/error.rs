use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum SessionError {
    #[error("Session handshake failed: {0}")]
    #[diagnostic(code(businessmap_mcp::session::handshake))]
    Handshake(String),

    #[error("Session transport is closed")]
    #[diagnostic(code(businessmap_mcp::session::transport_closed))]
    TransportClosed,

    #[error("Timed out waiting for a response from the session")]
    #[diagnostic(code(businessmap_mcp::session::timeout))]
    Timeout,

    #[error("Session already exists: {0}")]
    #[diagnostic(code(businessmap_mcp::session::already_exists))]
    AlreadyExists(String),

    #[error("Session teardown failed: {0}")]
    #[diagnostic(code(businessmap_mcp::session::teardown))]
    Teardown(String),

    #[error("Invalid JSON-RPC message: {0}")]
    #[diagnostic(code(businessmap_mcp::session::protocol))]
    Protocol(String),

    #[error("Request id {0} is already in flight")]
    #[diagnostic(code(businessmap_mcp::session::duplicate_request))]
    DuplicateRequest(String),

    #[error("Failed to create dispatch context: {0}")]
    #[diagnostic(code(businessmap_mcp::session::factory))]
    Factory(String),
}

pub type SessionResult<T> = Result<T, SessionError>;
