//! MCP tool process bridge
//!
//! Dispatches tool calls to an external MCP server (by default the Datadog
//! server, `node mcp-server-datadog/build/index.js`) over stdio, one process
//! per call.
//!
//! - [`protocol`]: `tools/call` request and response shapes
//! - [`process`]: spawn, exchange, timeout and cleanup
//! - [`unwrap`]: response envelope → payload or typed failure
//! - [`executor`]: [`McpToolExecutor`], the `ToolExecutorPort` adapter

pub mod error;
pub mod executor;
pub mod process;
pub mod protocol;
pub mod unwrap;

pub use error::McpError;
pub use executor::McpToolExecutor;
pub use process::{RawOutput, ToolProcess};
pub use unwrap::unwrap_response;
