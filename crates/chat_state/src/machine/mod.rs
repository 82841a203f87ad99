//! State machine module
//!
//! Contains the FSM implementation for the reply lifecycle.

mod events;
mod states;
mod transitions;

pub use events::ChatEvent;
pub use states::ReplyState;
pub use transitions::{StateMachine, StateTransition, TransitionError};
