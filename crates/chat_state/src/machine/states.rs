//! Reply states - Defines the possible states of the reply lifecycle

use serde::{Deserialize, Serialize};

/// Defines the possible states of the reply lifecycle.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ReplyState {
    /// No reply in flight, awaiting user input.
    #[default]
    Idle,

    /// A reply is being produced for the given conversation.
    Pending {
        /// Conversation captured when the message was sent.
        conversation_id: String,
    },
}

impl ReplyState {
    /// Check if this state allows the user to send a message.
    pub fn accepts_user_input(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Conversation the in-flight reply belongs to, if any.
    pub fn pending_conversation(&self) -> Option<&str> {
        match self {
            Self::Pending { conversation_id } => Some(conversation_id),
            Self::Idle => None,
        }
    }

    /// Get a human-readable description of the current state.
    pub fn description(&self) -> &str {
        match self {
            Self::Idle => "Ready for input",
            Self::Pending { .. } => "Waiting for AI response",
        }
    }
}
