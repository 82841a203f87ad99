//! # Conversation Store
//!
//! Holds the list of conversations and the active one, and persists the
//! whole list through an injected key-value store after every change.

pub mod error;
pub mod storage;
pub mod store;

// Re-exports
pub use error::{Result, StoreError};
pub use storage::{ConversationStorage, FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use store::ConversationStore;
