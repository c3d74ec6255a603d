//! Response unwrapping: raw tool output → [`ToolPayload`].
//!
//! An ordered chain of fallible transforms, each either refining the value
//! or stopping with a typed [`ToolFailure`]:
//!
//! 1. [`envelopes`] - stdout lines (or the whole output) parsed as JSON-RPC objects
//! 2. [`correlate`] - the envelope whose `id` matches the request
//! 3. [`content`] - `error` / `result.isError` → tool-reported failure,
//!    else the text of the content blocks, or the bare `result`
//! 4. [`decode_text`] - JSON, else labelled embedded JSON, else plain text

use super::protocol::RpcError;
use serde_json::{Map, Value};
use sre_domain::{ToolFailure, ToolFailureKind, ToolPayload};

/// Result of the content step.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// Concatenated text blocks, still to be decoded
    Text(String),
    /// `result` without a content list, used as-is
    Structured(Value),
}

/// Unwrap the captured stdout of one exchange.
pub fn unwrap_response(stdout: &str, request_id: &str) -> Result<ToolPayload, ToolFailure> {
    let envelopes = envelopes(stdout)?;
    let envelope = correlate(&envelopes, request_id)?;
    match content(envelope)? {
        Content::Text(text) => Ok(decode_text(&text)),
        Content::Structured(value) => Ok(ToolPayload::Structured(value)),
    }
}

/// Every non-empty line that is a JSON object with an `id`; failing that,
/// the whole output as one JSON object.
pub fn envelopes(stdout: &str) -> Result<Vec<Map<String, Value>>, ToolFailure> {
    let from_lines: Vec<Map<String, Value>> = stdout
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with('{'))
        .filter_map(|line| match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(map)) if map.contains_key("id") => Some(map),
            _ => None,
        })
        .collect();
    if !from_lines.is_empty() {
        return Ok(from_lines);
    }

    match serde_json::from_str::<Value>(stdout.trim()) {
        Ok(Value::Object(map)) => Ok(vec![map]),
        Ok(other) => Err(ToolFailure::parse(format!(
            "tool output is JSON but not a JSON-RPC object: {}",
            sre_domain::util::preview(&other.to_string(), 120)
        ))),
        Err(e) => Err(ToolFailure::parse(format!(
            "no JSON-RPC response in tool output ({}): {}",
            e,
            sre_domain::util::preview(stdout.trim(), 120)
        ))),
    }
}

/// The envelope answering `request_id`. A missing or different id is a
/// protocol error, never accepted.
pub fn correlate<'a>(
    envelopes: &'a [Map<String, Value>],
    request_id: &str,
) -> Result<&'a Map<String, Value>, ToolFailure> {
    if let Some(envelope) = envelopes
        .iter()
        .find(|e| e.get("id").and_then(Value::as_str) == Some(request_id))
    {
        return Ok(envelope);
    }

    let found = envelopes
        .iter()
        .find_map(|e| match e.get("id") {
            Some(Value::Null) | None => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        });
    Err(ToolFailure::id_mismatch(request_id, found))
}

/// Peel the RPC and content envelopes.
pub fn content(envelope: &Map<String, Value>) -> Result<Content, ToolFailure> {
    if let Some(error) = envelope.get("error").filter(|e| !e.is_null()) {
        return Err(reported_error(error));
    }

    let Some(result) = envelope.get("result").filter(|r| !r.is_null()) else {
        return Err(ToolFailure::new(
            ToolFailureKind::MissingResult,
            "response has neither result nor error",
        ));
    };

    let Some(blocks) = result.get("content").and_then(Value::as_array) else {
        return Ok(Content::Structured(result.clone()));
    };

    let texts: Vec<&str> = blocks
        .iter()
        .filter(|b| b.get("type").and_then(Value::as_str) == Some("text"))
        .filter_map(|b| b.get("text").and_then(Value::as_str))
        .collect();

    if result.get("isError").and_then(Value::as_bool) == Some(true) {
        let message = if texts.is_empty() {
            "tool reported an error".to_string()
        } else {
            texts.join("\n")
        };
        return Err(ToolFailure::reported(None, message));
    }

    if texts.is_empty() {
        return Err(ToolFailure::new(
            ToolFailureKind::NoTextContent,
            format!("{} content block(s), none of type text", blocks.len()),
        ));
    }
    Ok(Content::Text(texts.join("\n")))
}

fn reported_error(error: &Value) -> ToolFailure {
    match serde_json::from_value::<RpcError>(error.clone()) {
        Ok(rpc) => {
            let mut message = rpc.message.unwrap_or_else(|| "tool error".to_string());
            if let Some(data) = rpc.data.filter(|d| !d.is_null()) {
                message = format!("{} ({})", message, data);
            }
            ToolFailure::reported(rpc.code, message)
        }
        Err(_) => ToolFailure::reported(None, error.to_string()),
    }
}

/// Structured if the text is JSON, or carries JSON after a label
/// (`Monitors: [...]`); otherwise the text itself.
pub fn decode_text(text: &str) -> ToolPayload {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return ToolPayload::Structured(value);
    }
    if let Some(value) = labelled_json(trimmed) {
        return ToolPayload::Structured(value);
    }
    ToolPayload::Text(text.to_string())
}

/// JSON following the first `": ["` or `": {"` label. Everything after the
/// label must be that one JSON document.
fn labelled_json(text: &str) -> Option<Value> {
    let start = [": [", ": {"]
        .iter()
        .filter_map(|label| text.find(label))
        .min()?
        + 2;
    serde_json::from_str(text[start..].trim()).ok()
}
