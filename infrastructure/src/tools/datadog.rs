//! Datadog tools: get_monitors, list_incidents, list_dashboards
//!
//! Definitions of the tools served by the Datadog MCP server. Only their
//! shape lives here; execution goes through [`McpToolExecutor`](crate::mcp::McpToolExecutor).

use sre_domain::tool::entities::{ParamType, ToolDefinition, ToolParameter};

/// Tool name constants
pub const GET_MONITORS: &str = "get_monitors";
pub const LIST_INCIDENTS: &str = "list_incidents";
pub const LIST_DASHBOARDS: &str = "list_dashboards";

/// Names models tend to use instead of the registered ones
pub const ALIASES: [(&str, &str); 6] = [
    ("monitors", GET_MONITORS),
    ("list_monitors", GET_MONITORS),
    ("incidents", LIST_INCIDENTS),
    ("get_incidents", LIST_INCIDENTS),
    ("dashboards", LIST_DASHBOARDS),
    ("get_dashboards", LIST_DASHBOARDS),
];

/// Get the tool definition for get_monitors
pub fn get_monitors_definition() -> ToolDefinition {
    ToolDefinition::new(GET_MONITORS, "Fetch the status of Datadog monitors.")
        .with_parameter(
            ToolParameter::new(
                "groupStates",
                "States to filter (e.g., alert, warn, no data, ok).",
                ParamType::StringList,
            )
            .as_state_filter(),
        )
        .with_parameter(ToolParameter::new("name", "Filter by name.", ParamType::String))
        .with_parameter(ToolParameter::new("tags", "Filter by tags.", ParamType::StringList))
}

/// Get the tool definition for list_incidents
pub fn list_incidents_definition() -> ToolDefinition {
    ToolDefinition::new(LIST_INCIDENTS, "Retrieve a list of incidents from Datadog.")
        .with_parameter(ToolParameter::new(
            "filter",
            "Filter parameters for incidents (e.g., status, priority).",
            ParamType::String,
        ))
        .with_parameter(ToolParameter::new(
            "pagination",
            "Pagination details like page size/offset.",
            ParamType::Object,
        ))
}

/// Get the tool definition for list_dashboards
pub fn list_dashboards_definition() -> ToolDefinition {
    ToolDefinition::new(LIST_DASHBOARDS, "Get a list of dashboards from Datadog.").with_parameter(
        ToolParameter::new("tags", "Filter dashboards by tags.", ParamType::StringList),
    )
}
