//! Session domain entities

use crate::turn::entities::{Turn, TurnOutcome};
use serde::{Deserialize, Serialize};

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    /// Tool result fed back to the model
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

/// A message in a conversation (Entity)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn tool(content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
        }
    }
}

/// Conversation history owned by one session (Entity)
///
/// Grows only through [`History::record`], which appends a completed turn
/// and the messages derived from it. Recorded turns are never mutated.
#[derive(Debug, Clone, Default)]
pub struct History {
    messages: Vec<Message>,
    turns: Vec<Turn>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last_turn(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn turn_count(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Append a completed turn.
    ///
    /// Messages added per outcome:
    /// - plain answer or malformed-call fallback: `user`, `assistant`
    /// - summarized tool call: `user`, `assistant(plan)`, `tool(note)`, `assistant`
    /// - failure: `user`, `assistant(explanation)`
    ///
    /// The tool note carries the tool name, arguments and status; the raw
    /// payload is not kept.
    pub fn record(&mut self, turn: Turn) {
        self.messages.push(Message::user(turn.utterance.clone()));

        if let TurnOutcome::Summarized = turn.outcome
            && let Some(note) = turn.tool_note()
        {
            if let Some(plan) = &turn.plan {
                self.messages.push(Message::assistant(plan.clone()));
            }
            self.messages.push(Message::tool(note));
        }

        self.messages.push(Message::assistant(turn.answer.clone()));
        self.turns.push(turn);
    }
}
