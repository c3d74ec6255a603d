//! Tool server configuration from TOML (`[tool_server]` section)

use crate::mcp::ToolProcess;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Raw tool server configuration from TOML
///
/// ```toml
/// [tool_server]
/// command = "node"
/// args = ["mcp-server-datadog/build/index.js"]
/// timeout_seconds = 15
///
/// [tool_server.env]
/// DATADOG_SITE = "datadoghq.eu"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileToolServerConfig {
    pub command: String,
    pub args: Vec<String>,
    /// Extra environment for the server; the parent environment is inherited
    pub env: HashMap<String, String>,
    /// Bound on one whole exchange (spawn to response)
    pub timeout_seconds: u64,
    /// Dispatch attempts per call, retried only on dispatch failures
    pub max_dispatch_attempts: u32,
}

impl Default for FileToolServerConfig {
    fn default() -> Self {
        Self {
            command: "node".to_string(),
            args: vec!["mcp-server-datadog/build/index.js".to_string()],
            env: HashMap::new(),
            timeout_seconds: 15,
            max_dispatch_attempts: 2,
        }
    }
}

impl FileToolServerConfig {
    pub fn to_process(&self) -> ToolProcess {
        ToolProcess::new(
            self.command.clone(),
            self.args.clone(),
            Duration::from_secs(self.timeout_seconds),
        )
        .with_env(self.env.clone())
    }
}
