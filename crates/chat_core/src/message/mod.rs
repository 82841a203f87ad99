//! Message module - a single turn in a conversation
//!
//! Messages are immutable once created and have no identity beyond their
//! position in the owning conversation.

mod content;

pub use content::{contains_code_block, first_code_block};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Text of the assistant message every new conversation starts with.
pub const GREETING_TEXT: &str = "Hello! How can I help you today?";

/// One turn in a conversation, authored by the user or the assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub text: String,
    pub is_user: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_error: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_code: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Message {
    fn new(text: String, is_user: bool, is_error: bool) -> Self {
        let is_code = contains_code_block(&text);
        Self {
            text,
            is_user,
            timestamp: Utc::now(),
            is_error,
            is_code,
        }
    }

    /// Create a message authored by the user
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text.into(), true, false)
    }

    /// Create a message authored by the assistant
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(text.into(), false, false)
    }

    /// Create an assistant message reporting a failed reply
    pub fn error(text: impl Into<String>) -> Self {
        Self::new(text.into(), false, true)
    }

    /// The seed message of a fresh conversation
    pub fn greeting() -> Self {
        Self::assistant(GREETING_TEXT)
    }

    /// Text to put on the clipboard: the first code block if any, else the
    /// whole message.
    pub fn copy_text(&self) -> &str {
        first_code_block(&self.text).unwrap_or(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_flags() {
        let user = Message::user("hi");
        assert!(user.is_user);
        assert!(!user.is_error);

        let error = Message::error("boom");
        assert!(!error.is_user);
        assert!(error.is_error);

        let greeting = Message::greeting();
        assert_eq!(greeting.text, GREETING_TEXT);
        assert!(!greeting.is_user);
    }

    #[test]
    fn test_code_flag_from_text() {
        let message = Message::assistant("```sh\nls -la\n```");
        assert!(message.is_code);
        assert_eq!(message.copy_text(), "ls -la");

        let prose = Message::assistant("no code");
        assert!(!prose.is_code);
        assert_eq!(prose.copy_text(), "no code");
    }

    #[test]
    fn test_json_layout_uses_camel_case() {
        let message = Message::user("hello");
        let json = serde_json::to_value(&message).unwrap();

        assert_eq!(json["text"], "hello");
        assert_eq!(json["isUser"], true);
        assert!(json["timestamp"].is_string());
        // false flags are left out of the persisted form
        assert!(json.get("isError").is_none());
        assert!(json.get("isCode").is_none());
    }

    #[test]
    fn test_deserialize_without_optional_flags() {
        let json = r#"{"text":"Hello","isUser":false,"timestamp":"2024-05-01T10:00:00.000Z"}"#;
        let message: Message = serde_json::from_str(json).unwrap();

        assert_eq!(message.text, "Hello");
        assert!(!message.is_error);
        assert!(!message.is_code);
    }
}
