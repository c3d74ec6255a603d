//! Candidate → validated [`ToolCall`].
//!
//! The normalizer is the type boundary between untrusted model output and
//! the tool process. It repairs what models commonly get wrong (comments,
//! trailing commas, alias names, a bare string where a list is declared),
//! drops what cannot be repaired, and applies the state-filter policy.
//! Only the tool name is strict: unknown names always fail.

use crate::tool::entities::{ParamType, ToolCall, ToolDefinition, ToolSpec};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Keys accepted for the tool name, in priority order.
const NAME_KEYS: [&str; 3] = ["tool_name", "name", "tool"];
/// Keys accepted for the argument map, in priority order.
const ARGUMENT_KEYS: [&str; 4] = ["arguments", "parameters", "args", "params"];

/// Value that selects alerting monitors in a state filter.
pub const ALERT_STATE: &str = "alert";

/// Why a candidate could not become a [`ToolCall`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("Malformed tool call: {0}")]
    Malformed(String),

    #[error("Tool call has no tool name")]
    MissingToolName,

    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

/// State-filter policy applied after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPolicy {
    /// Filled into an omitted state filter when the turn has no alert intent.
    /// Empty disables the fill.
    pub default_states: Vec<String>,
}

impl FilterPolicy {
    pub fn new(default_states: Vec<String>) -> Self {
        Self { default_states }
    }

    /// No default fill: only the alert override applies.
    pub fn alert_only() -> Self {
        Self {
            default_states: Vec::new(),
        }
    }
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self {
            default_states: ["alert", "warn", "no data", "ok"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Turns scanner candidates into validated calls against a [`ToolSpec`].
pub struct CallNormalizer<'a> {
    spec: &'a ToolSpec,
    policy: &'a FilterPolicy,
}

impl<'a> CallNormalizer<'a> {
    pub fn new(spec: &'a ToolSpec, policy: &'a FilterPolicy) -> Self {
        Self { spec, policy }
    }

    /// Parse, validate and apply the filter policy.
    pub fn normalize(
        &self,
        candidate: &str,
        alert_intent: bool,
    ) -> Result<ToolCall, NormalizeError> {
        let object = parse_candidate(candidate)?;

        let raw_name = NAME_KEYS
            .iter()
            .find_map(|key| object.get(*key).and_then(|v| v.as_str()))
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or(NormalizeError::MissingToolName)?;

        let definition = self
            .spec
            .get_resolved(raw_name)
            .ok_or_else(|| NormalizeError::UnknownTool(raw_name.to_string()))?;
        if definition.name != raw_name {
            debug!("Resolved tool alias '{}' -> '{}'", raw_name, definition.name);
        }

        let raw_arguments = ARGUMENT_KEYS.iter().find_map(|key| object.get(*key));
        let arguments = match raw_arguments {
            Some(Value::Object(map)) => map.clone(),
            Some(Value::Null) | None => Map::new(),
            Some(other) => {
                warn!(
                    "Ignoring non-object arguments for '{}': {}",
                    definition.name, other
                );
                Map::new()
            }
        };

        let mut call = conform_arguments(definition, arguments);
        apply_filter_policy(&mut call, definition, alert_intent, self.policy);
        Ok(call)
    }
}

/// Strip comments and trailing commas, then parse as a JSON object.
pub fn parse_candidate(candidate: &str) -> Result<Map<String, Value>, NormalizeError> {
    let cleaned = repair_json(candidate);
    match serde_json::from_str::<Value>(&cleaned) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(NormalizeError::Malformed(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(NormalizeError::Malformed(e.to_string())),
    }
}

/// Keep only declared parameters whose values conform to their type.
fn conform_arguments(definition: &ToolDefinition, arguments: Map<String, Value>) -> ToolCall {
    let mut call = ToolCall::new(&definition.name);

    for (key, value) in arguments {
        if value.is_null() {
            continue;
        }
        let Some(param) = definition.parameter(&key) else {
            warn!("Dropping undeclared parameter '{}' for '{}'", key, definition.name);
            continue;
        };

        let value = match (param.param_type, value) {
            (ParamType::StringList, Value::String(s)) => Value::Array(vec![Value::String(s)]),
            (_, value) => value,
        };

        if param.param_type.accepts(&value) {
            call.arguments.insert(key, value);
        } else {
            warn!(
                "Dropping parameter '{}' for '{}': expected {}, got {}",
                key,
                definition.name,
                param.param_type,
                json_kind(&value)
            );
        }
    }

    call
}

/// Alert override, then default fill. Both are idempotent.
///
/// With `alert_intent` the state filter is overwritten regardless of what
/// the model supplied; this is an override, not a merge.
pub fn apply_filter_policy(
    call: &mut ToolCall,
    definition: &ToolDefinition,
    alert_intent: bool,
    policy: &FilterPolicy,
) {
    let Some(filter) = definition.state_filter() else {
        return;
    };

    if alert_intent {
        let value = match filter.param_type {
            ParamType::String => Value::String(ALERT_STATE.to_string()),
            _ => Value::Array(vec![Value::String(ALERT_STATE.to_string())]),
        };
        if call.arguments.get(&filter.name) != Some(&value) {
            info!("Alert intent: setting {}={} on '{}'", filter.name, value, call.tool_name);
        }
        call.arguments.insert(filter.name.clone(), value);
        return;
    }

    if !call.arguments.contains_key(&filter.name) && !policy.default_states.is_empty() {
        let value = match filter.param_type {
            ParamType::String => Value::String(policy.default_states.join(",")),
            _ => Value::Array(
                policy
                    .default_states
                    .iter()
                    .map(|s| Value::String(s.clone()))
                    .collect(),
            ),
        };
        debug!("Filling default {}={} on '{}'", filter.name, value, call.tool_name);
        call.arguments.insert(filter.name.clone(), value);
    }
}

/// Remove `//` and `/* */` comments and trailing commas outside string literals.
pub fn repair_json(input: &str) -> String {
    let without_comments = strip_comments(input);
    strip_trailing_commas(&without_comments)
}

fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match (c, chars.peek()) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
            }
            _ => out.push(c),
        }
    }

    out
}

fn strip_trailing_commas(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        if c == '"' {
            in_string = true;
        } else if c == ',' {
            let next = chars[i + 1..].iter().find(|n| !n.is_whitespace());
            if matches!(next, Some('}') | Some(']')) {
                continue;
            }
        }
        out.push(c);
    }

    out
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::entities::ToolParameter;
    use serde_json::json;

    fn spec() -> ToolSpec {
        ToolSpec::new()
            .register(
                ToolDefinition::new("get_monitors", "Fetch monitors")
                    .with_parameter(
                        ToolParameter::new("groupStates", "States", ParamType::StringList)
                            .as_state_filter(),
                    )
                    .with_parameter(ToolParameter::new("name", "Name", ParamType::String))
                    .with_parameter(ToolParameter::new("tags", "Tags", ParamType::StringList)),
            )
            .register(
                ToolDefinition::new("list_incidents", "Incidents")
                    .with_parameter(ToolParameter::new("filter", "Filter", ParamType::String))
                    .with_parameter(ToolParameter::new(
                        "pagination",
                        "Paging",
                        ParamType::Object,
                    )),
            )
            .register_alias("list_monitors", "get_monitors")
    }

    fn normalize(candidate: &str, alert: bool) -> Result<ToolCall, NormalizeError> {
        let spec = spec();
        let policy = FilterPolicy::alert_only();
        CallNormalizer::new(&spec, &policy).normalize(candidate, alert)
    }

    #[test]
    fn test_valid_call() {
        let call = normalize(
            r#"{"tool_name": "list_incidents", "arguments": {"filter": "status:active"}}"#,
            false,
        )
        .unwrap();
        assert_eq!(call.tool_name, "list_incidents");
        assert_eq!(call.get_string("filter"), Some("status:active"));
    }

    #[test]
    fn test_unknown_tool_fails() {
        let err = normalize(r#"{"tool_name": "delete_everything", "arguments": {}}"#, true)
            .unwrap_err();
        assert_eq!(err, NormalizeError::UnknownTool("delete_everything".to_string()));
    }

    #[test]
    fn test_missing_tool_name_fails() {
        assert_eq!(
            normalize(r#"{"arguments": {"name": "cpu"}}"#, false).unwrap_err(),
            NormalizeError::MissingToolName
        );
        assert_eq!(
            normalize(r#"{"tool_name": "  "}"#, false).unwrap_err(),
            NormalizeError::MissingToolName
        );
    }

    #[test]
    fn test_malformed_json_fails() {
        assert!(matches!(
            normalize(r#"{"tool_name": get_monitors}"#, false),
            Err(NormalizeError::Malformed(_))
        ));
        assert!(matches!(
            parse_candidate("[1, 2]"),
            Err(NormalizeError::Malformed(msg)) if msg.contains("array")
        ));
    }

    #[test]
    fn test_comments_and_trailing_commas_repaired() {
        let candidate = r#"{
            // fetch monitors
            "tool_name": "get_monitors", /* inline */
            "arguments": {"name": "http://example.com/a", "tags": ["env:prod",],},
        }"#;
        let call = normalize(candidate, false).unwrap();
        assert_eq!(call.get_string("name"), Some("http://example.com/a"));
        assert_eq!(call.arguments["tags"], json!(["env:prod"]));
    }

    #[test]
    fn test_alternate_keys_and_alias() {
        let call = normalize(r#"{"name": "list_monitors", "parameters": {"name": "db"}}"#, false)
            .unwrap();
        assert_eq!(call.tool_name, "get_monitors");
        assert_eq!(call.get_string("name"), Some("db"));
    }

    #[test]
    fn test_extra_null_and_wrong_typed_fields_dropped() {
        let call = normalize(
            r#"{"tool_name": "get_monitors", "arguments": {"status": "alert", "name": 42, "tags": null}}"#,
            false,
        )
        .unwrap();
        assert!(call.arguments.is_empty());
    }

    #[test]
    fn test_bare_string_wrapped_for_list() {
        let call = normalize(
            r#"{"tool_name": "get_monitors", "arguments": {"tags": "team:sre"}}"#,
            false,
        )
        .unwrap();
        assert_eq!(call.arguments["tags"], json!(["team:sre"]));
    }

    #[test]
    fn test_non_object_arguments_become_empty() {
        let call = normalize(r#"{"tool_name": "list_incidents", "arguments": "all"}"#, false)
            .unwrap();
        assert!(call.arguments.is_empty());
    }

    #[test]
    fn test_alert_intent_injects_filter() {
        let call = normalize(r#"{"tool_name": "get_monitors", "arguments": {}}"#, true).unwrap();
        assert_eq!(call.arguments["groupStates"], json!(["alert"]));
    }

    #[test]
    fn test_alert_intent_overrides_model_value() {
        let call = normalize(
            r#"{"tool_name": "get_monitors", "arguments": {"groupStates": ["ok", "warn"]}}"#,
            true,
        )
        .unwrap();
        assert_eq!(call.arguments["groupStates"], json!(["alert"]));
    }

    #[test]
    fn test_alert_policy_idempotent() {
        let spec = spec();
        let definition = spec.get("get_monitors").unwrap();
        let policy = FilterPolicy::default();

        let mut call = ToolCall::new("get_monitors").with_arg("groupStates", json!(["alert"]));
        apply_filter_policy(&mut call, definition, true, &policy);
        let once = call.clone();
        apply_filter_policy(&mut call, definition, true, &policy);
        assert_eq!(call, once);
        assert_eq!(call.arguments["groupStates"], json!(["alert"]));
    }

    #[test]
    fn test_alert_intent_ignored_without_state_filter() {
        let call = normalize(r#"{"tool_name": "list_incidents", "arguments": {}}"#, true).unwrap();
        assert!(call.arguments.is_empty());
    }

    #[test]
    fn test_default_states_filled_without_alert_intent() {
        let spec = spec();
        let policy = FilterPolicy::default();
        let normalizer = CallNormalizer::new(&spec, &policy);

        let call = normalizer
            .normalize(r#"{"tool_name": "get_monitors"}"#, false)
            .unwrap();
        assert_eq!(
            call.arguments["groupStates"],
            json!(["alert", "warn", "no data", "ok"])
        );

        let explicit = normalizer
            .normalize(
                r#"{"tool_name": "get_monitors", "arguments": {"groupStates": ["warn"]}}"#,
                false,
            )
            .unwrap();
        assert_eq!(explicit.arguments["groupStates"], json!(["warn"]));
    }

    #[test]
    fn test_repair_leaves_strings_alone() {
        let input = r#"{"a": "// not a comment, /* nor this */", "b": "x,}"}"#;
        assert_eq!(repair_json(input), input);
    }
}
