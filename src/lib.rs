//! BusinessMap MCP server.
//!
//! Exposes the BusinessMap REST API to MCP clients as tools, resources and
//! prompts, over stdio or a session-oriented streamable HTTP transport.

pub mod api;
pub mod client;
pub mod config;
pub mod mcp;
pub mod session;

#[cfg(test)]
mod test_support;
