pub mod mcp;
mod system;

pub use system::{HealthResponse, health};
