//! Prompt templates for a conversation turn

use crate::call::normalizer::ALERT_STATE;
use crate::tool::entities::{ToolCall, ToolSpec};
use crate::tool::value_objects::{ToolFailure, ToolFailureKind, ToolResult};

/// Templates for generating prompts at each stage of a turn
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt enumerating the registered tools and the call format.
    pub fn system(spec: &ToolSpec) -> String {
        let tools: Vec<serde_json::Value> = spec.all().map(|t| t.to_prompt_json()).collect();
        let tools_json =
            serde_json::to_string_pretty(&tools).unwrap_or_else(|_| "[]".to_string());
        let example = spec.names().next().unwrap_or("tool_name");

        let mut prompt = format!(
            r#"You are a Datadog SRE assistant that helps users retrieve information from Datadog.
You have access to these tools:
{tools_json}

When the user asks for Datadog information, you should:
1. Determine which tool to use
2. Generate a JSON tool call to execute the appropriate command
3. Keep it simple and focused on the task

Your JSON tool call should be in this format:
```json
{{
    "tool_name": "{example}",
    "arguments": {{}}
}}
```

IMPORTANT RULES:
1. NEVER include comments in JSON
2. If the user doesn't specify optional parameters, OMIT them entirely
3. Only include parameters the user has explicitly mentioned
4. Always respond to direct questions or requests for Datadog data with a tool call
5. DO NOT invent fake data or make up responses
6. ALWAYS format your JSON properly with DOUBLE QUOTES for all keys and string values
7. DO NOT include explanations inside the JSON, put them before or after
8. If no tool is needed, answer in plain text without any JSON
"#
        );

        let filtered: Vec<_> = spec
            .all()
            .filter_map(|t| t.state_filter().map(|p| (t.name.as_str(), p.name.as_str())))
            .collect();
        if !filtered.is_empty() {
            prompt.push_str("\nSPECIAL INSTRUCTIONS FOR ALERT MONITORS:\n");
            for (tool, param) in filtered {
                prompt.push_str(&format!(
                    "- If a user asks for \"{ALERT_STATE}\" monitors, use \"{tool}\" with the {param} parameter set to [\"{ALERT_STATE}\"]\n\
                     - When filtering by status, use the {param} parameter, not a status field\n\
                     - For example: {{\"tool_name\": \"{tool}\", \"arguments\": {{\"{param}\": [\"{ALERT_STATE}\"]}}}}\n\
                     - Requests for {ALERT_STATE} monitors always get {param} = [\"{ALERT_STATE}\"], whatever else you supply\n"
                ));
            }
        }

        prompt
    }

    /// Tool-result message for the summary pass.
    ///
    /// A JSON document `{tool, arguments, result | error}` followed by the
    /// instruction to answer in natural language.
    pub fn tool_result(call: &ToolCall, result: &ToolResult) -> String {
        let mut document = serde_json::json!({
            "tool": call.tool_name,
            "arguments": call.arguments_json(),
        });
        match &result.outcome {
            Ok(payload) => document["result"] = payload.to_json(),
            Err(failure) => {
                let mut error = serde_json::json!({ "message": failure.message });
                if let ToolFailureKind::Reported { code: Some(code) } = failure.kind {
                    error["code"] = serde_json::json!(code);
                }
                document["error"] = error;
            }
        }

        let body = serde_json::to_string_pretty(&document).unwrap_or_else(|_| document.to_string());
        format!(
            "{body}\n\nSummarize this tool result for the user in natural language. \
             Do not call another tool and do not output JSON. \
             If the tool reported an error, explain it briefly."
        )
    }

    /// User-visible answer when a tool call could not be completed.
    pub fn tool_failure_answer(call: &ToolCall, failure: &ToolFailure) -> String {
        let what = match &failure.kind {
            ToolFailureKind::SpawnFailed => "the tool process could not be started".to_string(),
            ToolFailureKind::WriteFailed => {
                "the request could not be sent to the tool process".to_string()
            }
            ToolFailureKind::Timeout => "the tool process did not answer in time".to_string(),
            ToolFailureKind::ProcessExited { code: Some(code) } => {
                format!("the tool process exited with code {code}")
            }
            ToolFailureKind::ProcessExited { code: None } => {
                "the tool process was terminated".to_string()
            }
            ToolFailureKind::EmptyOutput => "the tool process returned nothing".to_string(),
            ToolFailureKind::Reported { .. } => "the tool reported an error".to_string(),
            _ => "the tool response could not be decoded".to_string(),
        };
        format!(
            "I couldn't run `{}`: {}.\nDetails: {}",
            call.tool_name, what, failure.message
        )
    }

    /// User-visible answer when the model itself could not be reached.
    pub fn model_unavailable_answer(reason: &str) -> String {
        format!("The language model is unavailable right now ({reason}). Please try again.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::entities::{ParamType, ToolDefinition, ToolParameter};
    use crate::tool::value_objects::ToolPayload;
    use serde_json::json;

    fn spec() -> ToolSpec {
        ToolSpec::new()
            .register(
                ToolDefinition::new("get_monitors", "Fetch monitors").with_parameter(
                    ToolParameter::new("groupStates", "States", ParamType::StringList)
                        .as_state_filter(),
                ),
            )
            .register(ToolDefinition::new("list_dashboards", "Dashboards"))
    }

    #[test]
    fn test_system_prompt_lists_tools_and_alert_rule() {
        let prompt = PromptTemplate::system(&spec());
        assert!(prompt.contains("\"get_monitors\""));
        assert!(prompt.contains("\"list_dashboards\""));
        assert!(prompt.contains("\"tool_name\""));
        assert!(prompt.contains("groupStates parameter set to [\"alert\"]"));
    }

    #[test]
    fn test_system_prompt_without_state_filter() {
        let spec = ToolSpec::new().register(ToolDefinition::new("list_dashboards", "Dashboards"));
        let prompt = PromptTemplate::system(&spec);
        assert!(!prompt.contains("SPECIAL INSTRUCTIONS"));
    }

    #[test]
    fn test_tool_result_message_success() {
        let call = ToolCall::new("get_monitors").with_arg("groupStates", json!(["alert"]));
        let result = ToolResult::success(
            "get_monitors",
            ToolPayload::Structured(json!([{"name": "cpu"}])),
        );
        let message = PromptTemplate::tool_result(&call, &result);
        let (body, instruction) = message.split_once("\n\n").unwrap();
        let document: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(document["tool"], "get_monitors");
        assert_eq!(document["arguments"]["groupStates"][0], "alert");
        assert_eq!(document["result"][0]["name"], "cpu");
        assert!(instruction.starts_with("Summarize"));
    }

    #[test]
    fn test_tool_result_message_reported_error() {
        let call = ToolCall::new("list_dashboards");
        let result = ToolResult::failure(
            "list_dashboards",
            ToolFailure::reported(Some(403), "Forbidden"),
        );
        let message = PromptTemplate::tool_result(&call, &result);
        let (body, _) = message.split_once("\n\n").unwrap();
        let document: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(document["error"]["code"], 403);
        assert_eq!(document["error"]["message"], "Forbidden");
        assert!(document.get("result").is_none());
    }

    #[test]
    fn test_failure_answer_mentions_tool() {
        let call = ToolCall::new("get_monitors");
        let answer = PromptTemplate::tool_failure_answer(&call, &ToolFailure::timeout(15_000));
        assert!(answer.contains("`get_monitors`"));
        assert!(answer.contains("did not answer in time"));
    }
}
