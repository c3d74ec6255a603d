//! Core domain concepts shared across all subdomains.
//!
//! - [`utterance::Utterance`] - one validated line of operator input
//! - [`error::DomainError`] - domain-level errors

pub mod error;
pub mod utterance;
