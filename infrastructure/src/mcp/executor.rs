//! MCP tool executor: the concrete implementation of [`ToolExecutorPort`].
//!
//! [`McpToolExecutor`] turns a validated [`ToolCall`] into one `tools/call`
//! exchange with a freshly spawned tool process and unwraps the answer.
//!
//! ```text
//! ToolCall ─▶ JsonRpcRequest ─▶ ToolProcess::exchange ─▶ unwrap_response ─▶ ToolResult
//!                                  │                        │
//!                                  └─ McpError (dispatch)   └─ ToolFailure (tool_reported / unwrap)
//! ```

use super::process::ToolProcess;
use super::protocol::JsonRpcRequest;
use super::unwrap::unwrap_response;
use async_trait::async_trait;
use sre_application::ports::tool_executor::ToolExecutorPort;
use sre_domain::util::preview;
use sre_domain::{ToolCall, ToolResult, ToolResultMetadata, ToolSpec};
use tracing::{debug, info, warn};

/// Longest stderr excerpt kept in result metadata.
const STDERR_PREVIEW_BYTES: usize = 2000;

/// Executor that runs each tool call in its own MCP server process.
#[derive(Debug, Clone)]
pub struct McpToolExecutor {
    tool_spec: ToolSpec,
    process: ToolProcess,
}

impl McpToolExecutor {
    pub fn new(tool_spec: ToolSpec, process: ToolProcess) -> Self {
        Self { tool_spec, process }
    }

    pub fn process(&self) -> &ToolProcess {
        &self.process
    }
}

#[async_trait]
impl ToolExecutorPort for McpToolExecutor {
    fn tool_spec(&self) -> &ToolSpec {
        &self.tool_spec
    }

    async fn execute(&self, call: &ToolCall) -> ToolResult {
        let request = JsonRpcRequest::tools_call(call);
        let mut metadata = ToolResultMetadata {
            request_id: Some(request.id.clone()),
            attempts: 1,
            ..Default::default()
        };

        let line = match request.to_line() {
            Ok(line) => line,
            Err(e) => {
                let failure = super::error::McpError::from(e).into_failure();
                warn!("Could not encode request for {}: {}", call.tool_name, failure);
                return ToolResult::failure(&call.tool_name, failure).with_metadata(metadata);
            }
        };

        info!("Dispatching {} ({})", call.tool_name, request.id);
        debug!("Request: {}", line.trim_end());

        let raw = match self.process.exchange(&line).await {
            Ok(raw) => raw,
            Err(e) => {
                let failure = e.into_failure();
                warn!("Tool {} failed to dispatch: {}", call.tool_name, failure);
                return ToolResult::failure(&call.tool_name, failure).with_metadata(metadata);
            }
        };

        metadata.duration_ms = Some(raw.duration.as_millis() as u64);
        if !raw.stderr.trim().is_empty() {
            metadata.stderr = Some(preview(raw.stderr.trim(), STDERR_PREVIEW_BYTES).into_owned());
        }
        debug!(
            "Tool {} answered in {:?}: {}",
            call.tool_name,
            raw.duration,
            preview(&raw.stdout, 200)
        );

        let result = match unwrap_response(&raw.stdout, &request.id) {
            Ok(payload) => ToolResult::success(&call.tool_name, payload),
            Err(failure) => {
                warn!("Tool {} returned an unusable response: {}", call.tool_name, failure);
                ToolResult::failure(&call.tool_name, failure)
            }
        };
        result.with_metadata(metadata)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use serde_json::json;
    use sre_domain::{FailureStage, ToolDefinition, ToolFailureKind, ToolPayload};
    use std::io::Write;
    use std::time::Duration;

    /// Reads the request line and captures its id in `$id`.
    const ECHO_ID: &str = r#"read -r line
id=$(printf '%s' "$line" | sed 's/.*"id":"\([^"]*\)".*/\1/')"#;

    fn executor(dir: &tempfile::TempDir, body: &str) -> McpToolExecutor {
        let path = dir.path().join("server.sh");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{}", body).unwrap();
        let process = ToolProcess::new(
            "sh",
            vec![path.to_string_lossy().into_owned()],
            Duration::from_secs(5),
        );
        let spec = ToolSpec::new().register(ToolDefinition::new("get_monitors", "Fetch monitors"));
        McpToolExecutor::new(spec, process)
    }

    #[tokio::test]
    async fn test_text_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let exec = executor(
            &dir,
            &format!(
                r#"{}
cat <<EOF
{{"jsonrpc":"2.0","id":"$id","result":{{"content":[{{"type":"text","text":"X"}}]}}}}
EOF"#,
                ECHO_ID
            ),
        );

        let result = exec.execute(&ToolCall::new("get_monitors")).await;
        assert_eq!(result.outcome, Ok(ToolPayload::Text("X".to_string())));
        assert_eq!(result.tool_name, "get_monitors");
        assert!(result.metadata.request_id.as_deref().unwrap().starts_with("req-"));
        assert!(result.metadata.duration_ms.is_some());
        assert_eq!(result.metadata.attempts, 1);
    }

    #[tokio::test]
    async fn test_structured_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let exec = executor(
            &dir,
            &format!(
                r#"{}
echo "warming up" >&2
cat <<EOF
{{"jsonrpc":"2.0","id":"$id","result":{{"content":[{{"type":"text","text":"[{{\"name\":\"CPU high\"}}]"}}]}}}}
EOF"#,
                ECHO_ID
            ),
        );

        let call = ToolCall::new("get_monitors").with_arg("groupStates", json!(["alert"]));
        let result = exec.execute(&call).await;
        assert_eq!(
            result.outcome,
            Ok(ToolPayload::Structured(json!([{"name": "CPU high"}])))
        );
        assert_eq!(result.metadata.stderr.as_deref(), Some("warming up"));
    }

    #[tokio::test]
    async fn test_id_mismatch_is_unwrap_failure() {
        let dir = tempfile::tempdir().unwrap();
        let exec = executor(
            &dir,
            r#"read -r line
printf '{"jsonrpc":"2.0","id":"req-0","result":{"content":[{"type":"text","text":"X"}]}}\n'"#,
        );

        let result = exec.execute(&ToolCall::new("get_monitors")).await;
        let failure = result.failure_ref().unwrap();
        assert_eq!(failure.stage(), FailureStage::Unwrap);
        assert!(matches!(
            &failure.kind,
            ToolFailureKind::IdMismatch { found: Some(found), .. } if found == "req-0"
        ));
    }

    #[tokio::test]
    async fn test_reported_error() {
        let dir = tempfile::tempdir().unwrap();
        let exec = executor(
            &dir,
            &format!(
                r#"{}
cat <<EOF
{{"jsonrpc":"2.0","id":"$id","error":{{"code":-32000,"message":"DD_API_KEY is not set"}}}}
EOF"#,
                ECHO_ID
            ),
        );

        let result = exec.execute(&ToolCall::new("get_monitors")).await;
        let failure = result.failure_ref().unwrap();
        assert!(failure.is_tool_reported());
        assert_eq!(failure.message, "DD_API_KEY is not set");
    }

    #[tokio::test]
    async fn test_crash_is_dispatch_failure() {
        let dir = tempfile::tempdir().unwrap();
        let exec = executor(
            &dir,
            r#"read -r line
echo "Error: Cannot find module 'build/index.js'" >&2
exit 1"#,
        );

        let result = exec.execute(&ToolCall::new("get_monitors")).await;
        let failure = result.failure_ref().unwrap();
        assert!(failure.is_dispatch());
        assert_eq!(failure.kind, ToolFailureKind::ProcessExited { code: Some(1) });
        assert!(failure.message.contains("Cannot find module"));
        assert!(result.metadata.request_id.is_some());
    }

    #[tokio::test]
    async fn test_closed_stdin_is_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let exec = executor(&dir, "exec 0<&-\nsleep 1");

        let call = ToolCall::new("get_monitors").with_arg("name", json!("x".repeat(1 << 20)));
        let result = exec.execute(&call).await;
        let failure = result.failure_ref().unwrap();
        assert!(failure.is_dispatch());
        assert_eq!(failure.kind, ToolFailureKind::WriteFailed);
    }
}
