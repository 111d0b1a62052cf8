//! Model Context Protocol (MCP) server implementation
//!
//! - **server**: [`BusinessMapServer`], the per-session dispatch context
//! - **tools**: tool handlers grouped by BusinessMap entity
//! - **resources**: `businessmap://` resources
//! - **prompts**: analysis prompt templates
//! - **service**: session factory, upstream health check and stdio transport

mod prompts;
mod resources;
pub mod server;
mod service;
pub mod tools;

#[cfg(test)]
mod service_test;

pub use resources::{ResourceKind, parse_resource_uri};
pub use server::{BusinessMapServer, ServerSettings};
pub use service::{
    HEALTH_CHECK_ATTEMPTS, HEALTH_CHECK_DELAY, connect_with_retry, serve_stdio, service_factory,
};
