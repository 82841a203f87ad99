//! chat_state - Reply state machine for the chat shell
//!
//! Tracks whether an assistant reply is in flight, which decides whether the
//! presentation layer may accept another message.

pub mod machine;

// Re-export commonly used types
pub use machine::{ChatEvent, ReplyState, StateMachine, StateTransition, TransitionError};
