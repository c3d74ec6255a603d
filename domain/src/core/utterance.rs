//! Utterance value object

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// Raw text of one user turn (Value Object)
///
/// Never empty or whitespace-only; the text is otherwise kept verbatim so
/// that intent detection sees exactly what the operator typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Utterance {
    content: String,
}

impl Utterance {
    pub fn try_new(content: impl Into<String>) -> Result<Self, DomainError> {
        let content = content.into();
        if content.trim().is_empty() {
            Err(DomainError::EmptyUtterance)
        } else {
            Ok(Self { content })
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn into_content(self) -> String {
        self.content
    }
}

impl std::fmt::Display for Utterance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

impl TryFrom<&str> for Utterance {
    type Error = DomainError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Utterance::try_new(s)
    }
}
