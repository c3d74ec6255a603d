//! Application-level configuration.
//!
//! - [`TurnParams`] - per-turn loop control (dispatch retries, filter policy)

pub mod turn_params;

pub use turn_params::TurnParams;
