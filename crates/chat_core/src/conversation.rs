//! Conversation - an ordered, optionally titled sequence of messages

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::Message;

/// Id of the conversation in the default seed set.
pub const DEFAULT_CONVERSATION_ID: &str = "default";

/// Title of the conversation in the default seed set.
pub const DEFAULT_CONVERSATION_TITLE: &str = "First Conversation";

/// Label shown for conversations that have no title yet.
pub const UNTITLED_LABEL: &str = "New Chat";

/// A titled-or-untitled ordered sequence of messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique id, derived from the creation instant.
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    pub messages: Vec<Message>,

    /// Last-touched time.
    pub timestamp: DateTime<Utc>,
}

impl Conversation {
    /// Create an untitled conversation seeded with the greeting.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            messages: vec![Message::greeting()],
            timestamp: Utc::now(),
        }
    }

    /// The conversation a fresh install starts with.
    pub fn seed() -> Self {
        let mut conversation = Self::new(DEFAULT_CONVERSATION_ID);
        conversation.title = Some(DEFAULT_CONVERSATION_TITLE.to_string());
        conversation
    }

    /// Generate an id from the current instant (milliseconds since epoch).
    pub fn generate_id() -> String {
        Utc::now().timestamp_millis().to_string()
    }

    /// Title for display, falling back to "New Chat".
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(UNTITLED_LABEL)
    }

    /// Holds more than the seed message but was never given a title.
    pub fn is_unsaved(&self) -> bool {
        self.messages.len() > 1 && self.title.is_none()
    }

    /// Append a message and refresh the last-touched time.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.touch();
    }

    pub fn touch(&mut self) {
        self.timestamp = Utc::now();
    }

    /// Copy of this conversation under a new id and title.
    pub fn clone_as(&self, id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: Some(title.into()),
            messages: self.messages.clone(),
            timestamp: Utc::now(),
        }
    }
}
