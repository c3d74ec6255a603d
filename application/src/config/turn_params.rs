//! Turn parameters - orchestrator loop control.
//!
//! [`TurnParams`] groups the static parameters that control one turn of
//! [`ConversationSession`](crate::use_cases::run_turn::ConversationSession).
//! These are application-layer concerns; the alert vocabulary itself is
//! domain policy and lives in [`AlertIntentPolicy`].

use sre_domain::{AlertIntentPolicy, FilterPolicy};
use std::time::Duration;

/// Turn control parameters.
#[derive(Debug, Clone)]
pub struct TurnParams {
    /// Dispatch attempts per tool call. Only dispatch-stage failures are retried.
    pub max_dispatch_attempts: u32,
    /// Pause between dispatch attempts.
    pub retry_delay: Duration,
    pub intent: AlertIntentPolicy,
    pub filter: FilterPolicy,
}

impl Default for TurnParams {
    fn default() -> Self {
        Self {
            max_dispatch_attempts: 2,
            retry_delay: Duration::from_millis(250),
            intent: AlertIntentPolicy::default(),
            filter: FilterPolicy::default(),
        }
    }
}

impl TurnParams {
    // ==================== Builder Methods ====================

    pub fn with_max_dispatch_attempts(mut self, attempts: u32) -> Self {
        self.max_dispatch_attempts = attempts.max(1);
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_intent(mut self, intent: AlertIntentPolicy) -> Self {
        self.intent = intent;
        self
    }

    pub fn with_filter(mut self, filter: FilterPolicy) -> Self {
        self.filter = filter;
        self
    }
}
