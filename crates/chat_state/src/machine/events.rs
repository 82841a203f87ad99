//! Chat events - Defines events that trigger state transitions

use serde::{Deserialize, Serialize};

/// Defines the events that can trigger state transitions in the FSM.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChatEvent {
    /// User sent a message to the given conversation.
    UserMessageSent { conversation_id: String },

    /// The responder produced a reply.
    ReplyReceived,

    /// The responder failed; an error message is shown in its place.
    ReplyFailed { error: String },
}

impl ChatEvent {
    /// Short name used in logs and transition errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::UserMessageSent { .. } => "user_message_sent",
            Self::ReplyReceived => "reply_received",
            Self::ReplyFailed { .. } => "reply_failed",
        }
    }
}
