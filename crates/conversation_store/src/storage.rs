//! Key-value storage trait, its implementations, and the conversation adapter

use crate::error::{Result, StoreError};
use chat_core::{Conversation, Message};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Synchronous string key-value store
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}

/// File-based key-value store: one `<key>.json` file per key
#[derive(Clone)]
pub struct FileKeyValueStore {
    base_path: PathBuf,
}

impl FileKeyValueStore {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.base_path.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key)?;

        if !path.exists() {
            return Ok(None);
        }

        Ok(Some(fs::read_to_string(&path)?))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key)?;
        fs::create_dir_all(&self.base_path)?;
        fs::write(&path, value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key)?;

        if path.exists() {
            fs::remove_file(&path)?;
        }

        Ok(())
    }
}

/// In-memory key-value store. Clones share the same map.
#[derive(Clone, Default)]
pub struct MemoryKeyValueStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        entries.remove(key);
        Ok(())
    }
}

/// Persists the conversation list as one JSON array under a single key
pub struct ConversationStorage<K: KeyValueStore> {
    backend: K,
    key: String,
}

impl<K: KeyValueStore> ConversationStorage<K> {
    pub fn new(backend: K, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    /// Load the persisted conversations.
    ///
    /// Falls back to the default seed set when nothing is stored, the stored
    /// value cannot be read or parsed, or it holds no conversations.
    pub fn load(&self) -> Vec<Conversation> {
        let raw = match self.backend.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!("No conversations stored under {:?}, seeding", self.key);
                return Self::seed();
            }
            Err(e) => {
                tracing::warn!("Failed to read conversations, seeding: {}", e);
                return Self::seed();
            }
        };

        match serde_json::from_str::<Vec<Conversation>>(&raw) {
            Ok(conversations) if conversations.is_empty() => {
                tracing::debug!("Stored conversation list is empty, seeding");
                Self::seed()
            }
            Ok(mut conversations) => {
                for conversation in conversations.iter_mut().filter(|c| c.messages.is_empty()) {
                    tracing::warn!("Conversation {} has no messages, re-seeding", conversation.id);
                    conversation.messages.push(Message::greeting());
                }
                tracing::debug!("Loaded {} conversations", conversations.len());
                conversations
            }
            Err(e) => {
                tracing::warn!("Stored conversations are malformed, seeding: {}", e);
                Self::seed()
            }
        }
    }

    /// Serialize and persist the full set, replacing what was stored.
    pub fn save(&self, conversations: &[Conversation]) -> Result<()> {
        let contents = serde_json::to_string(conversations)?;
        self.backend.set(&self.key, &contents)
    }

    fn seed() -> Vec<Conversation> {
        vec![Conversation::seed()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_core::Message;
    use tempfile::tempdir;

    #[test]
    fn test_file_store_set_and_get() {
        let dir = tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path());

        store.set("answer", "42").unwrap();

        assert_eq!(store.get("answer").unwrap().as_deref(), Some("42"));
        assert!(dir.path().join("answer.json").exists());
    }

    #[test]
    fn test_file_store_missing_key() {
        let dir = tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path());

        assert!(store.get("nonexistent").unwrap().is_none());
    }

    #[test]
    fn test_file_store_remove() {
        let dir = tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path());

        store.set("k", "v").unwrap();
        store.remove("k").unwrap();
        assert!(store.get("k").unwrap().is_none());

        // removing again is fine
        store.remove("k").unwrap();
    }

    #[test]
    fn test_file_store_rejects_path_keys() {
        let dir = tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path());

        for key in ["", "../escape", "a/b", ".hidden"] {
            assert!(matches!(
                store.set(key, "x"),
                Err(StoreError::InvalidKey(_))
            ));
        }
    }

    #[test]
    fn test_file_store_creates_base_dir() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("nested").join("data");
        let store = FileKeyValueStore::new(&nested);

        store.set("k", "v").unwrap();
        assert!(nested.join("k.json").exists());
    }

    #[test]
    fn test_memory_store_clones_share_entries() {
        let store = MemoryKeyValueStore::new();
        let other = store.clone();

        store.set("k", "v").unwrap();
        assert_eq!(other.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_load_without_value_returns_seed() {
        let storage = ConversationStorage::new(MemoryKeyValueStore::new(), "conversations");

        let conversations = storage.load();
        assert_eq!(conversations.len(), 1);
        assert_eq!(conversations[0].id, "default");
        assert_eq!(conversations[0].messages.len(), 1);
    }

    #[test]
    fn test_load_malformed_value_returns_seed() {
        let backend = MemoryKeyValueStore::new();
        backend.set("conversations", "{definitely not json").unwrap();
        let storage = ConversationStorage::new(backend, "conversations");

        let conversations = storage.load();
        assert_eq!(conversations.len(), 1);
        assert_eq!(conversations[0].id, "default");
    }

    #[test]
    fn test_load_empty_array_returns_seed() {
        let backend = MemoryKeyValueStore::new();
        backend.set("conversations", "[]").unwrap();
        let storage = ConversationStorage::new(backend, "conversations");

        assert_eq!(storage.load().len(), 1);
    }

    #[test]
    fn test_load_unreadable_value_returns_seed() {
        let dir = tempdir().unwrap();
        // a directory where the value file should be
        std::fs::create_dir(dir.path().join("conversations.json")).unwrap();
        let backend = FileKeyValueStore::new(dir.path());
        assert!(backend.get("conversations").is_err());

        let conversations = ConversationStorage::new(backend, "conversations").load();
        assert_eq!(conversations.len(), 1);
        assert_eq!(conversations[0].id, "default");
    }

    #[test]
    fn test_load_reseeds_conversation_without_messages() {
        let backend = MemoryKeyValueStore::new();
        backend
            .set(
                "conversations",
                r#"[{"id":"7","title":"Empty","messages":[],"timestamp":"2024-05-01T10:00:00Z"}]"#,
            )
            .unwrap();
        let storage = ConversationStorage::new(backend, "conversations");

        let loaded = storage.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].title.as_deref(), Some("Empty"));
        assert_eq!(loaded[0].messages.len(), 1);
        assert!(!loaded[0].messages[0].is_user);
    }

    #[test]
    fn test_save_then_load() {
        let storage = ConversationStorage::new(MemoryKeyValueStore::new(), "conversations");

        let mut conversation = Conversation::new("100");
        conversation.push(Message::user("hi"));
        storage.save(&[Conversation::seed(), conversation.clone()]).unwrap();

        let loaded = storage.load();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1], conversation);
    }

    #[test]
    fn test_save_of_load_is_idempotent() {
        let backend = MemoryKeyValueStore::new();
        let storage = ConversationStorage::new(backend.clone(), "conversations");

        let mut conversation = Conversation::new("100");
        conversation.push(Message::user("```\ncode\n```"));
        conversation.push(Message::error("failed"));
        storage.save(&[conversation]).unwrap();
        let before = backend.get("conversations").unwrap();

        storage.save(&storage.load()).unwrap();
        let after = backend.get("conversations").unwrap();

        assert_eq!(before, after);
    }

    #[test]
    fn test_load_reads_browser_layout() {
        let backend = MemoryKeyValueStore::new();
        backend
            .set(
                "conversations",
                r#"[{"id":"1714557600000","messages":[
                    {"text":"Hello! How can I help you today?","isUser":false,"timestamp":"2024-05-01T10:00:00.000Z"},
                    {"text":"Hi","isUser":true,"timestamp":"2024-05-01T10:00:05.000Z"}
                ],"timestamp":"2024-05-01T10:00:00.000Z"}]"#,
            )
            .unwrap();
        let storage = ConversationStorage::new(backend, "conversations");

        let loaded = storage.load();
        assert_eq!(loaded.len(), 1);
        assert!(loaded[0].title.is_none());
        assert!(loaded[0].is_unsaved());
        assert_eq!(loaded[0].messages[1].text, "Hi");
    }
}
