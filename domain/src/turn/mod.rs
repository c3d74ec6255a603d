//! Turn domain: one user utterance and everything produced answering it.
//!
//! ```text
//! Idle → AwaitingModelPlan ─┬─ NoToolDetected → AwaitingFinalText ─────────────────────┐
//!                           └─ ToolDetected → Normalizing → Dispatching → Unwrapping   │
//!                                                  → AwaitingModelSummary ─────────────┴→ Done
//! ```
//!
//! Any failure moves straight to `Done` with a failure outcome.

pub mod entities;

pub use entities::{Turn, TurnOutcome, TurnPhase};
