//! JSON-RPC protocol types for the MCP tool process.
//!
//! One request per process: `tools/call` with the tool name and arguments.
//!
//! ```text
//! → {"jsonrpc":"2.0","id":"req-…","method":"tools/call","params":{"name":…,"arguments":{…}}}
//! ← {"jsonrpc":"2.0","id":"req-…","result":{"content":[{"type":"text","text":…}]}}
//! ← {"jsonrpc":"2.0","id":"req-…","error":{"code":…,"message":…}}
//! ```

use serde::{Deserialize, Serialize};
use sre_domain::ToolCall;
use std::sync::atomic::{AtomicU64, Ordering};

/// Method name for executing a tool by name
pub const TOOLS_CALL: &str = "tools/call";

/// Process-wide request counter, appended to the timestamp so ids never
/// collide within a session even when issued in the same millisecond.
static REQUEST_SEQ: AtomicU64 = AtomicU64::new(1);

/// Generates a unique request ID of the form `req-<unix millis>-<seq>`.
pub fn next_request_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let seq = REQUEST_SEQ.fetch_add(1, Ordering::SeqCst);
    format!("req-{}-{}", millis, seq)
}

/// `tools/call` parameters
#[derive(Debug, Clone, Serialize)]
pub struct ToolCallParams {
    pub name: String,
    pub arguments: serde_json::Value,
}

/// JSON-RPC request
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub id: String,
    pub method: &'static str,
    pub params: ToolCallParams,
}

impl JsonRpcRequest {
    /// Creates a `tools/call` request with a fresh ID.
    pub fn tools_call(call: &ToolCall) -> Self {
        Self {
            jsonrpc: "2.0",
            id: next_request_id(),
            method: TOOLS_CALL,
            params: ToolCallParams {
                name: call.tool_name.clone(),
                arguments: call.arguments_json(),
            },
        }
    }

    /// Serialize as one newline-terminated line.
    pub fn to_line(&self) -> serde_json::Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

/// JSON-RPC error object
#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// Whether a stdout line is a JSON-RPC response: an object carrying `id`
/// and either `result` or `error`. Notifications and log lines are not.
pub fn is_response_line(line: &str) -> bool {
    let trimmed = line.trim();
    if !trimmed.starts_with('{') {
        return false;
    }
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::Object(map)) => {
            map.contains_key("id") && (map.contains_key("result") || map.contains_key("error"))
        }
        _ => false,
    }
}
