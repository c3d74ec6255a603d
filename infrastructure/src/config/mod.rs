//! Configuration file loading for sre-assistant
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment variables `SRE_ASSISTANT_<SECTION>__<KEY>`
//! 2. `--config <path>` specified file
//! 3. Project root: `./sre-assistant.toml` or `./.sre-assistant.toml`
//! 4. Global: `$XDG_CONFIG_HOME/sre-assistant/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileIntentConfig, FileLoggingConfig, FileModelConfig,
    FileReplConfig, FileToolServerConfig,
};
pub use loader::ConfigLoader;
