//! Alert intent configuration from TOML (`[intent]` section)

use serde::{Deserialize, Serialize};
use sre_domain::call::intent::{DEFAULT_KEYWORDS, DEFAULT_VERBS};
use sre_domain::{AlertIntentPolicy, DomainError, FilterPolicy};

/// Raw alert-intent vocabulary and default state filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileIntentConfig {
    pub verbs: Vec<String>,
    pub keywords: Vec<String>,
    /// States filled in when the model leaves a state filter out
    pub default_group_states: Vec<String>,
}

impl Default for FileIntentConfig {
    fn default() -> Self {
        Self {
            verbs: DEFAULT_VERBS.iter().map(|s| s.to_string()).collect(),
            keywords: DEFAULT_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            default_group_states: FilterPolicy::default().default_states,
        }
    }
}

impl FileIntentConfig {
    pub fn to_policy(&self) -> Result<AlertIntentPolicy, DomainError> {
        AlertIntentPolicy::new(&self.verbs, &self.keywords)
    }

    pub fn to_filter(&self) -> FilterPolicy {
        FilterPolicy::new(self.default_group_states.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_matches_builtin() {
        let policy = FileIntentConfig::default().to_policy().unwrap();
        assert!(policy.detect("show me alerting monitors"));
        assert!(!policy.detect("show me dashboards"));
    }

    #[test]
    fn test_custom_vocabulary() {
        let config = FileIntentConfig {
            verbs: vec!["fetch".to_string()],
            keywords: vec!["firing".to_string()],
            ..Default::default()
        };
        let policy = config.to_policy().unwrap();
        assert!(policy.detect("fetch what is firing"));
    }
}
