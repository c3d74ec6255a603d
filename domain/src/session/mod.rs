//! Conversation session domain.
//!
//! - [`entities::Message`] - a single role-tagged message
//! - [`entities::History`] - the ordered message log plus the recorded turns

pub mod entities;
