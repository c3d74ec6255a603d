//! Tool-call extraction from model output.
//!
//! ```text
//! model text ──scan──▶ candidate ──normalize(alert_intent)──▶ ToolCall
//!      │                    │
//!      └─ None: plain answer └─ Err: fall back to plain answer
//! ```
//!
//! - [`scanner::scan`] - locate the balanced JSON region
//! - [`normalizer::CallNormalizer`] - repair, validate, apply filter policy
//! - [`intent::AlertIntentPolicy`] - alert-intent flag from the user text

pub mod intent;
pub mod normalizer;
pub mod scanner;

pub use intent::AlertIntentPolicy;
pub use normalizer::{CallNormalizer, FilterPolicy, NormalizeError};
pub use scanner::scan;
