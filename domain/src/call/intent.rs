//! Alert-intent detection over the raw user utterance.

use crate::core::error::DomainError;
use regex::Regex;
use std::sync::LazyLock;

pub const DEFAULT_VERBS: [&str; 3] = ["get", "list", "show"];
pub const DEFAULT_KEYWORDS: [&str; 3] = ["alert", "alerts", "alerting"];

static DEFAULT_POLICY: LazyLock<AlertIntentPolicy> = LazyLock::new(|| {
    AlertIntentPolicy::new(DEFAULT_VERBS, DEFAULT_KEYWORDS)
        .expect("default alert intent vocabulary is valid")
});

/// Keyword heuristic deciding whether a turn asks for alerting monitors.
///
/// Matches when one of `verbs` appears as a word and one of `keywords`
/// appears as a word somewhere after it, case-insensitively. This is
/// policy, not a contract: the vocabulary comes from configuration and
/// covers English phrasings only.
#[derive(Debug, Clone)]
pub struct AlertIntentPolicy {
    pattern: Regex,
}

impl AlertIntentPolicy {
    pub fn new<V, K>(
        verbs: impl IntoIterator<Item = V>,
        keywords: impl IntoIterator<Item = K>,
    ) -> Result<Self, DomainError>
    where
        V: AsRef<str>,
        K: AsRef<str>,
    {
        let verbs = alternation(verbs);
        let keywords = alternation(keywords);
        if verbs.is_empty() {
            return Err(DomainError::InvalidIntentPolicy("no verbs".to_string()));
        }
        if keywords.is_empty() {
            return Err(DomainError::InvalidIntentPolicy("no keywords".to_string()));
        }

        let source = format!(r"(?is)\b(?:{})\b.*\b(?:{})\b", verbs, keywords);
        let pattern =
            Regex::new(&source).map_err(|e| DomainError::InvalidIntentPolicy(e.to_string()))?;
        Ok(Self { pattern })
    }

    pub fn detect(&self, utterance: &str) -> bool {
        self.pattern.is_match(utterance)
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

impl Default for AlertIntentPolicy {
    fn default() -> Self {
        DEFAULT_POLICY.clone()
    }
}

fn alternation<S: AsRef<str>>(words: impl IntoIterator<Item = S>) -> String {
    words
        .into_iter()
        .map(|w| w.as_ref().trim().to_string())
        .filter(|w| !w.is_empty())
        .map(|w| regex::escape(&w))
        .collect::<Vec<_>>()
        .join("|")
}
