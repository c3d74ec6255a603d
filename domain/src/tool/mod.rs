//! Tool domain module
//!
//! Defines the fixed set of tools the assistant can invoke through the
//! external tool process, and the values a dispatch produces.
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ ToolSpec     │───▶│ ToolCall     │───▶│ ToolResult   │
//! │ (registry)   │    │ (invocation) │    │ (payload or  │
//! └──────┬───────┘    └──────────────┘    │  failure)    │
//!        │                                └──────────────┘
//!        ├─ aliases: "list_monitors" → "get_monitors"
//!        └─ tools:   "get_monitors"  → ToolDefinition
//! ```
//!
//! A [`ToolCall`] is only ever produced by the call normalizer
//! ([`crate::call::normalizer`]), which guarantees its name is registered
//! and its arguments conform to the declared [`ParamType`](entities::ParamType)s.

pub mod entities;
pub mod value_objects;

pub use entities::{ParamType, ToolCall, ToolDefinition, ToolParameter, ToolSpec};
pub use value_objects::{
    FailureStage, ToolFailure, ToolFailureKind, ToolPayload, ToolResult, ToolResultMetadata,
    ToolStatus,
};
