//! MCP tool implementations
//!
//! Tools are grouped by BusinessMap entity. Each module contributes a read
//! router and, where the entity can be modified, a write router; the server
//! only mounts the write routers outside read-only mode.
//!
//! Upstream failures never fail the JSON-RPC call. They come back as a tool
//! result with `is_error` set and the text `Error <context>: <message>`.

mod boards;
mod cards;
mod users;
mod utility;
mod workspaces;

#[cfg(test)]
mod boards_test;
#[cfg(test)]
mod users_test;

pub use boards::*;
pub use cards::*;
pub use users::*;
pub use utility::*;
pub use workspaces::*;

use std::fmt::Display;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::warn;

use crate::client::ClientResult;

/// Success result: optional message line followed by pretty-printed JSON.
pub(crate) fn success<T: Serialize + ?Sized>(data: &T, message: Option<&str>) -> CallToolResult {
    match serde_json::to_string_pretty(data) {
        Ok(body) => {
            let text = match message {
                Some(message) => format!("{message}\n{body}"),
                None => body,
            };
            CallToolResult::success(vec![Content::text(text)])
        }
        Err(e) => failure(e, "serializing response"),
    }
}

pub(crate) fn failure(error: impl Display, context: &str) -> CallToolResult {
    let text = format!("Error {context}: {error}");
    warn!("{}", text);
    CallToolResult::error(vec![Content::text(text)])
}

/// Map an upstream result onto a tool result.
pub(crate) fn reply<T: Serialize>(
    result: ClientResult<T>,
    context: &str,
    message: Option<&str>,
) -> Result<CallToolResult, McpError> {
    Ok(match result {
        Ok(data) => success(&data, message),
        Err(e) => failure(e, context),
    })
}

/// `{ <key>: items, "count": n }` for list endpoints.
pub(crate) fn counted(key: &str, items: Value) -> Value {
    let count = items.as_array().map(Vec::len).unwrap_or(0);
    let mut body = Map::new();
    body.insert(key.to_string(), items);
    body.insert("count".to_string(), json!(count));
    Value::Object(body)
}
