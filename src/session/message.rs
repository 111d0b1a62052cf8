//! Client-to-server JSON-RPC messages, checked against the MCP schema before
//! they reach a session.

use rmcp::model::{ClientJsonRpcMessage, JsonRpcMessage, RequestId};
use serde::Deserialize;
use serde_json::Value;

use super::error::{SessionError, SessionResult};

/// A message that parsed as an MCP client message.
///
/// The JSON exactly as received is what gets written into the session, so
/// the service sees the client's bytes rather than a re-encoding.
#[derive(Debug)]
pub struct ClientMessage {
    raw: Value,
    parsed: ClientJsonRpcMessage,
}

impl ClientMessage {
    pub fn parse(raw: Value) -> SessionResult<Self> {
        let parsed = ClientJsonRpcMessage::deserialize(&raw)
            .map_err(|e| SessionError::Protocol(e.to_string()))?;
        Ok(Self { raw, parsed })
    }

    /// Id the client waits on; `None` for notifications and for the
    /// client's own responses.
    pub fn request_id(&self) -> Option<&RequestId> {
        match &self.parsed {
            JsonRpcMessage::Request(request) => Some(&request.id),
            _ => None,
        }
    }

    pub fn is_request(&self) -> bool {
        self.request_id().is_some()
    }

    pub fn is_initialize(&self) -> bool {
        matches!(
            &self.parsed,
            JsonRpcMessage::Request(request) if request.request.method() == "initialize"
        )
    }

    pub fn as_json(&self) -> &Value {
        &self.raw
    }
}
