//! Chat message types shared by all provider adapters.
//!
//! A [`GenerateRequest`] carries an optional system instruction plus an
//! ordered list of turns. Adapters translate the canonical roles into
//! whatever the wire format expects (`assistant` → `model` for Gemini).

use serde::{Deserialize, Serialize};

/// The role of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The calling user.
    User,
    /// The model's earlier reply.
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who produced this turn.
    pub role: Role,
    /// Plain-text content of the turn.
    pub content: String,
}

impl ChatMessage {
    /// Convenience: create a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Convenience: create an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Provider-agnostic generation request.
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    /// Optional system instruction, sent out-of-band where the API supports it.
    pub system_instruction: Option<String>,

    /// Ordered conversation turns; the last turn is the active prompt.
    pub messages: Vec<ChatMessage>,

    /// Hint that the caller expects a JSON object back. Adapters with a
    /// native JSON mode enable it; others ignore the hint.
    pub expect_json: bool,
}

impl GenerateRequest {
    /// Single-shot request: one user turn, no history.
    pub fn prompt(text: impl Into<String>) -> Self {
        Self {
            system_instruction: None,
            messages: vec![ChatMessage::user(text)],
            expect_json: false,
        }
    }

    /// Set the system instruction.
    pub fn with_system(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    /// Request a JSON object reply where the provider supports it natively.
    pub fn with_json(mut self) -> Self {
        self.expect_json = true;
        self
    }
}
