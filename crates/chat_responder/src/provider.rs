use async_trait::async_trait;
use chat_core::Message;
use thiserror::Error;

/// Text shown in the thread when a reply could not be produced.
pub const ERROR_REPLY_TEXT: &str = "Sorry, there was an error processing your request.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResponderError {
    #[error("Simulated failure")]
    Simulated,
}

pub type Result<T> = std::result::Result<T, ResponderError>;

#[async_trait]
pub trait Responder: Send + Sync {
    /// Produce the assistant reply to `user_text`
    ///
    /// # Arguments
    /// * `history` - Conversation messages up to and including the user message
    /// * `user_text` - The message being answered
    async fn respond(&self, history: &[Message], user_text: &str) -> Result<String>;
}

/// Turn a responder outcome into the message appended to the thread.
pub fn reply_message(result: &Result<String>) -> Message {
    match result {
        Ok(text) => Message::assistant(text.as_str()),
        Err(e) => {
            tracing::warn!("Reply failed: {}", e);
            Message::error(ERROR_REPLY_TEXT)
        }
    }
}
