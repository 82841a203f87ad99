//! chat_core - Core types for the chat shell
//!
//! This crate provides the foundational types used across all chat crates:
//! - `message` - a single turn in a conversation
//! - `conversation` - an ordered, optionally titled message sequence
//! - `config` - application configuration and its resolution order
//! - `paths` - well-known data locations

pub mod config;
pub mod conversation;
pub mod message;
pub mod paths;

// Re-export commonly used types
pub use config::{AppConfig, ConfigError};
pub use conversation::{Conversation, DEFAULT_CONVERSATION_ID, DEFAULT_CONVERSATION_TITLE};
pub use message::{Message, GREETING_TEXT};
