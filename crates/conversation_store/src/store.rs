//! Conversation store - the in-memory conversation list and the active pointer

use crate::error::Result;
use crate::storage::{ConversationStorage, KeyValueStore};
use chat_core::{Conversation, Message};

/// Conversation store - owns the conversation list and persists every change
pub struct ConversationStore<K: KeyValueStore> {
    storage: ConversationStorage<K>,
    conversations: Vec<Conversation>,
    active_id: String,
}

impl<K: KeyValueStore> ConversationStore<K> {
    /// Load the persisted conversations (or the seed set) and make the first
    /// one active.
    pub fn new(storage: ConversationStorage<K>) -> Self {
        let mut conversations = storage.load();
        if conversations.is_empty() {
            conversations.push(Conversation::seed());
        }
        let active_id = conversations[0].id.clone();

        Self {
            storage,
            conversations,
            active_id,
        }
    }

    /// All conversations in insertion order
    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn get(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.conversations.iter().position(|c| c.id == id)
    }

    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    /// The active conversation
    pub fn active(&self) -> &Conversation {
        // active_id always names a conversation in the list
        self.get(&self.active_id)
            .unwrap_or(&self.conversations[0])
    }

    /// Whether the active conversation holds messages but no title yet.
    ///
    /// The caller decides whether to prompt for a save before switching away.
    pub fn is_active_unsaved(&self) -> bool {
        self.active().is_unsaved()
    }

    /// Create a seeded conversation, append it, and make it active.
    pub fn create_conversation(&mut self) -> Result<&Conversation> {
        let conversation = Conversation::new(self.next_id());
        tracing::debug!("Created conversation {}", conversation.id);

        self.commit(|store| {
            store.active_id = conversation.id.clone();
            store.conversations.push(conversation);
        })?;
        Ok(self.active())
    }

    /// Make `id` the active conversation. Unknown ids are ignored.
    pub fn select_conversation(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            tracing::warn!("Cannot select unknown conversation {}", id);
            return false;
        }
        self.active_id = id.to_string();
        true
    }

    /// Remove a conversation.
    ///
    /// Deleting the active conversation moves the active pointer to the first
    /// remaining one; deleting the last conversation creates a fresh one.
    /// Unknown ids are ignored.
    pub fn delete_conversation(&mut self, id: &str) -> Result<bool> {
        let Some(pos) = self.position(id) else {
            tracing::warn!("Cannot delete unknown conversation {}", id);
            return Ok(false);
        };
        let fresh_id = self.next_id();

        self.commit(|store| {
            store.conversations.remove(pos);
            if store.conversations.is_empty() {
                tracing::debug!("Last conversation deleted, created {}", fresh_id);
                store.conversations.push(Conversation::new(fresh_id));
            }
            if store.active_id == id {
                store.active_id = store.conversations[0].id.clone();
            }
        })?;
        tracing::debug!("Deleted conversation {}", id);
        Ok(true)
    }

    /// Retitle a conversation in place and refresh its timestamp.
    ///
    /// Returns false without touching anything when the title is blank or
    /// unchanged, or the id is unknown.
    pub fn rename_conversation(&mut self, id: &str, title: &str) -> Result<bool> {
        let title = title.trim();
        if title.is_empty() {
            return Ok(false);
        }

        let Some(pos) = self.position(id) else {
            tracing::warn!("Cannot rename unknown conversation {}", id);
            return Ok(false);
        };
        if self.conversations[pos].title.as_deref() == Some(title) {
            return Ok(false);
        }

        self.commit(|store| {
            let conversation = &mut store.conversations[pos];
            conversation.title = Some(title.to_string());
            conversation.touch();
        })?;
        Ok(true)
    }

    /// Clone the active conversation under a new id and `title`, append the
    /// clone, and make it active. The original stays in the list unchanged.
    ///
    /// Returns the new conversation's id, or `None` for a blank title.
    pub fn save_active_as(&mut self, title: &str) -> Result<Option<String>> {
        let title = title.trim();
        if title.is_empty() {
            return Ok(None);
        }

        let copy = self.active().clone_as(self.next_id(), title);
        let id = copy.id.clone();
        tracing::debug!("Saved conversation {} as {} ({:?})", self.active_id, id, title);

        self.commit(|store| {
            store.active_id = copy.id.clone();
            store.conversations.push(copy);
        })?;
        Ok(Some(id))
    }

    /// Append a message to a conversation and refresh its timestamp.
    ///
    /// Returns false when the conversation no longer exists.
    pub fn append_message(&mut self, conversation_id: &str, message: Message) -> Result<bool> {
        let Some(pos) = self.position(conversation_id) else {
            tracing::warn!(
                "Dropping message for unknown conversation {}",
                conversation_id
            );
            return Ok(false);
        };

        self.commit(|store| store.conversations[pos].push(message))?;
        Ok(true)
    }

    /// Apply `change` and persist the result. A failed write restores the
    /// state from before the change, so memory never runs ahead of storage.
    fn commit(&mut self, change: impl FnOnce(&mut Self)) -> Result<()> {
        let conversations = self.conversations.clone();
        let active_id = self.active_id.clone();

        change(self);

        if let Err(e) = self.storage.save(&self.conversations) {
            tracing::error!("Failed to persist conversations, rolling back: {}", e);
            self.conversations = conversations;
            self.active_id = active_id;
            return Err(e);
        }
        Ok(())
    }

    /// Id from the creation instant, bumped past any id already in use.
    fn next_id(&self) -> String {
        let mut candidate = Conversation::generate_id();
        while self.get(&candidate).is_some() {
            candidate = match candidate.parse::<i64>() {
                Ok(millis) => (millis + 1).to_string(),
                Err(_) => format!("{}-1", candidate),
            };
        }
        candidate
    }
}
