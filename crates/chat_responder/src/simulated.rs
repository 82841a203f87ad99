use std::time::Duration;

use async_trait::async_trait;
use chat_core::Message;

use crate::provider::{Responder, ResponderError, Result};

/// Replies with a canned echo after a fixed delay.
#[derive(Debug, Clone)]
pub struct SimulatedResponder {
    delay: Duration,
    fail: bool,
}

impl Default for SimulatedResponder {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl SimulatedResponder {
    pub fn new(delay: Duration) -> Self {
        Self { delay, fail: false }
    }

    /// Take the error path on every reply.
    pub fn failing(mut self, fail: bool) -> Self {
        self.fail = fail;
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn canned_reply(user_text: &str) -> String {
        format!(
            "I received your message: \"{}\". This is a simulated AI response.",
            user_text
        )
    }
}

#[async_trait]
impl Responder for SimulatedResponder {
    async fn respond(&self, history: &[Message], user_text: &str) -> Result<String> {
        tracing::debug!(
            "Simulating reply to {} chars after {:?} ({} messages of history)",
            user_text.len(),
            self.delay,
            history.len()
        );
        tokio::time::sleep(self.delay).await;

        if self.fail {
            return Err(ResponderError::Simulated);
        }
        Ok(Self::canned_reply(user_text))
    }
}
