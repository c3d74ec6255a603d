//! Tool domain value objects - payloads and typed failures
//!
//! A tool dispatch ends in exactly one [`ToolResult`]. On success it holds
//! a [`ToolPayload`]; on failure a [`ToolFailure`] whose kind records the
//! stage where things went wrong:
//!
//! | Stage | Kinds | Orchestrator reaction |
//! |-------|-------|-----------------------|
//! | `Dispatch` | spawn, write, timeout, exit, empty output | retried, then explained to the user |
//! | `ToolReported` | structured error from the tool process | forwarded to the summary pass |
//! | `Unwrap` | parse, id mismatch, missing result, no text | explained to the user |

use serde::{Deserialize, Serialize};

/// Final payload of a successful tool call.
///
/// Tools do not uniformly return JSON, so plain text is an accepted
/// terminal form rather than an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ToolPayload {
    Structured(serde_json::Value),
    Text(String),
}

impl ToolPayload {
    pub fn is_structured(&self) -> bool {
        matches!(self, ToolPayload::Structured(_))
    }

    pub fn as_structured(&self) -> Option<&serde_json::Value> {
        match self {
            ToolPayload::Structured(v) => Some(v),
            ToolPayload::Text(_) => None,
        }
    }

    /// JSON rendering handed to the model for summarization.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ToolPayload::Structured(v) => v.clone(),
            ToolPayload::Text(s) => serde_json::Value::String(s.clone()),
        }
    }

    /// Size of the payload as rendered, used for logging.
    pub fn rendered_len(&self) -> usize {
        match self {
            ToolPayload::Structured(v) => v.to_string().len(),
            ToolPayload::Text(s) => s.len(),
        }
    }
}

/// Pipeline stage at which a tool call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Dispatch,
    ToolReported,
    Unwrap,
}

impl FailureStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureStage::Dispatch => "dispatch",
            FailureStage::ToolReported => "tool_reported",
            FailureStage::Unwrap => "unwrap",
        }
    }
}

/// Concrete failure classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolFailureKind {
    // Dispatch stage
    SpawnFailed,
    WriteFailed,
    Timeout,
    ProcessExited { code: Option<i32> },
    EmptyOutput,
    // Reported by the tool process itself
    Reported { code: Option<i64> },
    // Unwrap stage
    Parse,
    IdMismatch { expected: String, found: Option<String> },
    MissingResult,
    NoTextContent,
}

impl ToolFailureKind {
    pub fn stage(&self) -> FailureStage {
        match self {
            ToolFailureKind::SpawnFailed
            | ToolFailureKind::WriteFailed
            | ToolFailureKind::Timeout
            | ToolFailureKind::ProcessExited { .. }
            | ToolFailureKind::EmptyOutput => FailureStage::Dispatch,
            ToolFailureKind::Reported { .. } => FailureStage::ToolReported,
            ToolFailureKind::Parse
            | ToolFailureKind::IdMismatch { .. }
            | ToolFailureKind::MissingResult
            | ToolFailureKind::NoTextContent => FailureStage::Unwrap,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ToolFailureKind::SpawnFailed => "spawn failed",
            ToolFailureKind::WriteFailed => "write failed",
            ToolFailureKind::Timeout => "timed out",
            ToolFailureKind::ProcessExited { .. } => "process exited",
            ToolFailureKind::EmptyOutput => "empty output",
            ToolFailureKind::Reported { .. } => "tool error",
            ToolFailureKind::Parse => "unparseable response",
            ToolFailureKind::IdMismatch { .. } => "correlation id mismatch",
            ToolFailureKind::MissingResult => "missing result",
            ToolFailureKind::NoTextContent => "no text content",
        }
    }
}

/// A typed tool failure with a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolFailure {
    pub kind: ToolFailureKind,
    pub message: String,
}

impl ToolFailure {
    pub fn new(kind: ToolFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn spawn_failed(message: impl Into<String>) -> Self {
        Self::new(ToolFailureKind::SpawnFailed, message)
    }

    pub fn write_failed(message: impl Into<String>) -> Self {
        Self::new(ToolFailureKind::WriteFailed, message)
    }

    pub fn timeout(after_ms: u64) -> Self {
        Self::new(
            ToolFailureKind::Timeout,
            format!("no response from tool process within {} ms", after_ms),
        )
    }

    pub fn reported(code: Option<i64>, message: impl Into<String>) -> Self {
        Self::new(ToolFailureKind::Reported { code }, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ToolFailureKind::Parse, message)
    }

    pub fn id_mismatch(expected: impl Into<String>, found: Option<String>) -> Self {
        let expected = expected.into();
        let message = match &found {
            Some(found) => format!("expected response id '{}', got '{}'", expected, found),
            None => format!("expected response id '{}', got none", expected),
        };
        Self::new(ToolFailureKind::IdMismatch { expected, found }, message)
    }

    pub fn stage(&self) -> FailureStage {
        self.kind.stage()
    }

    pub fn is_dispatch(&self) -> bool {
        self.stage() == FailureStage::Dispatch
    }

    pub fn is_tool_reported(&self) -> bool {
        self.stage() == FailureStage::ToolReported
    }
}

impl std::fmt::Display for ToolFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.stage().as_str(), self.kind.label(), self.message)?;
        if let ToolFailureKind::Reported { code: Some(code) } = &self.kind {
            write!(f, " (code {})", code)?;
        }
        Ok(())
    }
}

impl std::error::Error for ToolFailure {}

/// Execution data attached to every result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResultMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    /// Dispatch attempts spent on this result (1 unless retried).
    #[serde(default)]
    pub attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
}

/// Outcome of one tool dispatch, owned by the orchestrator for one turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool_name: String,
    pub outcome: Result<ToolPayload, ToolFailure>,
    #[serde(default)]
    pub metadata: ToolResultMetadata,
}

impl ToolResult {
    pub fn success(tool_name: impl Into<String>, payload: ToolPayload) -> Self {
        Self {
            tool_name: tool_name.into(),
            outcome: Ok(payload),
            metadata: ToolResultMetadata::default(),
        }
    }

    pub fn failure(tool_name: impl Into<String>, failure: ToolFailure) -> Self {
        Self {
            tool_name: tool_name.into(),
            outcome: Err(failure),
            metadata: ToolResultMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: ToolResultMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn payload(&self) -> Option<&ToolPayload> {
        self.outcome.as_ref().ok()
    }

    pub fn failure_ref(&self) -> Option<&ToolFailure> {
        self.outcome.as_ref().err()
    }

    /// Short status used in history notes and logs.
    pub fn status(&self) -> ToolStatus {
        match &self.outcome {
            Ok(_) => ToolStatus::Succeeded,
            Err(f) => ToolStatus::Failed(f.stage()),
        }
    }
}

/// What survives of a [`ToolResult`] once the turn is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "stage", rename_all = "snake_case")]
pub enum ToolStatus {
    Succeeded,
    Failed(FailureStage),
}

impl std::fmt::Display for ToolStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolStatus::Succeeded => write!(f, "succeeded"),
            ToolStatus::Failed(stage) => write!(f, "failed at {}", stage.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_stages() {
        assert_eq!(ToolFailure::timeout(15_000).stage(), FailureStage::Dispatch);
        assert!(ToolFailure::spawn_failed("no such file").is_dispatch());
        assert!(ToolFailure::reported(Some(-32000), "bad key").is_tool_reported());
        assert_eq!(
            ToolFailure::id_mismatch("req-1", Some("req-2".to_string())).stage(),
            FailureStage::Unwrap
        );
    }

    #[test]
    fn test_failure_display() {
        let failure = ToolFailure::reported(Some(401), "Forbidden");
        assert_eq!(
            failure.to_string(),
            "[tool_reported] tool error: Forbidden (code 401)"
        );

        let mismatch = ToolFailure::id_mismatch("req-1", None);
        assert!(mismatch.to_string().contains("got none"));
    }

    #[test]
    fn test_result_status() {
        let ok = ToolResult::success("get_monitors", ToolPayload::Text("none".to_string()));
        assert!(ok.is_success());
        assert_eq!(ok.status(), ToolStatus::Succeeded);

        let failed = ToolResult::failure("get_monitors", ToolFailure::parse("garbage"));
        assert_eq!(failed.status(), ToolStatus::Failed(FailureStage::Unwrap));
        assert_eq!(failed.status().to_string(), "failed at unwrap");
    }

    #[test]
    fn test_payload_json() {
        let text = ToolPayload::Text("plain".to_string());
        assert_eq!(text.to_json(), serde_json::json!("plain"));
        assert!(!text.is_structured());

        let structured = ToolPayload::Structured(serde_json::json!([{"id": 1}]));
        assert_eq!(structured.as_structured().unwrap()[0]["id"], 1);
    }
}
