//! Tool registry for the assistant
//!
//! The assistant exposes a fixed set of tools, all served by one external
//! MCP server process. This module declares them; [`crate::mcp`] runs them.

pub mod datadog;

use sre_domain::tool::entities::ToolSpec;

/// Create the default tool specification: the Datadog tools and their aliases
pub fn default_tool_spec() -> ToolSpec {
    ToolSpec::new()
        .register(datadog::get_monitors_definition())
        .register(datadog::list_incidents_definition())
        .register(datadog::list_dashboards_definition())
        .register_aliases(datadog::ALIASES)
}
