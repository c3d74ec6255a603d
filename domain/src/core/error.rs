//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Empty input")]
    EmptyUtterance,

    #[error("Invalid alert intent policy: {0}")]
    InvalidIntentPolicy(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(DomainError::EmptyUtterance.to_string(), "Empty input");
        assert_eq!(
            DomainError::InvalidIntentPolicy("no verbs".to_string()).to_string(),
            "Invalid alert intent policy: no verbs"
        );
    }
}
