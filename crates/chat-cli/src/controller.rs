//! Chat controller - wires user actions to the store and the reply lifecycle

use chat_core::{Conversation, Message};
use chat_responder::{reply_message, Responder};
use chat_state::{ChatEvent, ReplyState, StateMachine, TransitionError};
use conversation_store::{ConversationStore, KeyValueStore, StoreError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("Message is empty")]
    EmptyMessage,

    #[error("Please wait for the current reply to finish")]
    ReplyPending,

    #[error("State error: {0}")]
    Transition(#[from] TransitionError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, ControllerError>;

/// A sent message waiting for its reply.
///
/// The reply is bound to `conversation_id`, captured at send time, and is
/// appended there even if the user has switched conversations meanwhile.
#[derive(Debug, Clone)]
pub struct PendingReply {
    pub conversation_id: String,
    pub user_text: String,
    pub history: Vec<Message>,
}

/// What the responder produced for a [`PendingReply`].
#[derive(Debug, Clone)]
pub struct ReplyOutcome {
    pub conversation_id: String,
    pub result: chat_responder::Result<String>,
}

/// Await the responder for a pending reply.
pub async fn run_reply(responder: &dyn Responder, pending: PendingReply) -> ReplyOutcome {
    let result = responder
        .respond(&pending.history, &pending.user_text)
        .await;
    ReplyOutcome {
        conversation_id: pending.conversation_id,
        result,
    }
}

pub struct ChatController<K: KeyValueStore> {
    store: ConversationStore<K>,
    machine: StateMachine,
}

impl<K: KeyValueStore> ChatController<K> {
    pub fn new(store: ConversationStore<K>) -> Self {
        Self {
            store,
            machine: StateMachine::new(),
        }
    }

    pub fn store(&self) -> &ConversationStore<K> {
        &self.store
    }

    pub fn active(&self) -> &Conversation {
        self.store.active()
    }

    pub fn reply_state(&self) -> &ReplyState {
        self.machine.state()
    }

    pub fn is_pending(&self) -> bool {
        !self.machine.accepts_user_input()
    }

    /// Whether leaving the active conversation should offer a save first.
    pub fn needs_save_prompt(&self) -> bool {
        self.store.is_active_unsaved()
    }

    /// Append the user's message to the active conversation and enter the
    /// pending state.
    pub fn begin_send(&mut self, text: &str) -> Result<PendingReply> {
        if text.trim().is_empty() {
            return Err(ControllerError::EmptyMessage);
        }
        if self.is_pending() {
            return Err(ControllerError::ReplyPending);
        }

        let conversation_id = self.store.active_id().to_string();
        self.store
            .append_message(&conversation_id, Message::user(text))?;
        self.machine.try_handle_event(ChatEvent::UserMessageSent {
            conversation_id: conversation_id.clone(),
        })?;

        let history = self.store.active().messages.clone();
        Ok(PendingReply {
            conversation_id,
            user_text: text.to_string(),
            history,
        })
    }

    /// Append the reply (or the error message) to the conversation it was
    /// requested for and return to idle.
    ///
    /// Returns false when that conversation was deleted in the meantime.
    pub fn complete_reply(&mut self, outcome: ReplyOutcome) -> Result<bool> {
        let event = match &outcome.result {
            Ok(_) => ChatEvent::ReplyReceived,
            Err(e) => ChatEvent::ReplyFailed {
                error: e.to_string(),
            },
        };
        self.machine.handle_event(event);

        let message = reply_message(&outcome.result);
        Ok(self
            .store
            .append_message(&outcome.conversation_id, message)?)
    }

    /// Send a message and wait for its reply.
    pub async fn send(&mut self, responder: &dyn Responder, text: &str) -> Result<bool> {
        let pending = self.begin_send(text)?;
        let outcome = run_reply(responder, pending).await;
        self.complete_reply(outcome)
    }

    pub fn new_conversation(&mut self) -> Result<String> {
        Ok(self.store.create_conversation()?.id.clone())
    }

    pub fn select_conversation(&mut self, id: &str) -> bool {
        self.store.select_conversation(id)
    }

    pub fn delete_conversation(&mut self, id: &str) -> Result<bool> {
        Ok(self.store.delete_conversation(id)?)
    }

    pub fn rename_conversation(&mut self, id: &str, title: &str) -> Result<bool> {
        Ok(self.store.rename_conversation(id, title)?)
    }

    pub fn save_active_as(&mut self, title: &str) -> Result<Option<String>> {
        Ok(self.store.save_active_as(title)?)
    }

    /// Id of the conversation at a 1-based list position.
    pub fn id_at(&self, index: usize) -> Option<String> {
        index
            .checked_sub(1)
            .and_then(|i| self.store.conversations().get(i))
            .map(|c| c.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_responder::{ResponderError, SimulatedResponder, ERROR_REPLY_TEXT};
    use conversation_store::{ConversationStorage, MemoryKeyValueStore};
    use std::time::Duration;

    fn controller() -> ChatController<MemoryKeyValueStore> {
        let storage = ConversationStorage::new(MemoryKeyValueStore::new(), "conversations");
        ChatController::new(ConversationStore::new(storage))
    }

    #[test]
    fn test_begin_send_appends_user_message() {
        let mut controller = controller();

        let pending = controller.begin_send("Hi").unwrap();

        assert_eq!(pending.conversation_id, "default");
        assert_eq!(pending.history.len(), 2);
        assert!(controller.is_pending());
        assert!(controller.active().messages[1].is_user);
    }

    #[test]
    fn test_empty_message_rejected() {
        let mut controller = controller();

        assert!(matches!(
            controller.begin_send("   \n"),
            Err(ControllerError::EmptyMessage)
        ));
        assert!(!controller.is_pending());
        assert_eq!(controller.active().messages.len(), 1);
    }

    #[test]
    fn test_second_send_while_pending_rejected() {
        let mut controller = controller();
        controller.begin_send("one").unwrap();

        assert!(matches!(
            controller.begin_send("two"),
            Err(ControllerError::ReplyPending)
        ));
        assert_eq!(controller.active().messages.len(), 2);
    }

    #[test]
    fn test_reply_goes_to_captured_conversation() {
        let mut controller = controller();
        let pending = controller.begin_send("Hi").unwrap();

        // user switches away while the reply is in flight
        let other = controller.new_conversation().unwrap();

        let appended = controller
            .complete_reply(ReplyOutcome {
                conversation_id: pending.conversation_id,
                result: Ok("Hello".to_string()),
            })
            .unwrap();

        assert!(appended);
        assert!(!controller.is_pending());
        assert_eq!(controller.active().id, other);
        assert_eq!(controller.active().messages.len(), 1);

        let original = controller.store().get("default").unwrap();
        assert_eq!(original.messages.len(), 3);
        assert_eq!(original.messages[2].text, "Hello");
    }

    #[test]
    fn test_reply_for_deleted_conversation_is_dropped() {
        let mut controller = controller();
        controller.new_conversation().unwrap();
        controller.select_conversation("default");
        let pending = controller.begin_send("Hi").unwrap();
        controller.delete_conversation("default").unwrap();

        let appended = controller
            .complete_reply(ReplyOutcome {
                conversation_id: pending.conversation_id,
                result: Ok("late".to_string()),
            })
            .unwrap();

        assert!(!appended);
        assert!(!controller.is_pending());
    }

    #[test]
    fn test_failed_reply_appends_error_message() {
        let mut controller = controller();
        let pending = controller.begin_send("Hi").unwrap();

        controller
            .complete_reply(ReplyOutcome {
                conversation_id: pending.conversation_id,
                result: Err(ResponderError::Simulated),
            })
            .unwrap();

        let last = controller.active().messages.last().unwrap();
        assert!(last.is_error);
        assert_eq!(last.text, ERROR_REPLY_TEXT);
        assert!(!controller.is_pending());
    }

    #[tokio::test]
    async fn test_send_round_trip() {
        let mut controller = controller();
        let responder = SimulatedResponder::new(Duration::ZERO);

        assert!(controller.send(&responder, "Hi").await.unwrap());

        let messages = &controller.active().messages;
        assert_eq!(messages.len(), 3);
        assert!(messages[2].text.contains("\"Hi\""));
    }

    #[test]
    fn test_id_at_is_one_based() {
        let controller = controller();

        assert_eq!(controller.id_at(1).as_deref(), Some("default"));
        assert!(controller.id_at(0).is_none());
        assert!(controller.id_at(2).is_none());
    }
}
