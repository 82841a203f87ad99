//! chat_responder - Assistant reply providers
//!
//! `Responder` is the seam between the chat shell and whatever produces
//! assistant replies. `SimulatedResponder` stands in for an inference backend.

pub mod provider;
pub mod simulated;

pub use provider::{reply_message, Responder, ResponderError, Result, ERROR_REPLY_TEXT};
pub use simulated::SimulatedResponder;
