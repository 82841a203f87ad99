//! chat-cli - Terminal chat shell
//!
//! Presentation layer over the conversation store: pure views, line input,
//! the controller that wires user actions to the store, and the interactive
//! loop.

pub mod app;
pub mod clipboard;
pub mod controller;
pub mod input;
pub mod logging;
pub mod views;

pub use app::App;
pub use controller::{ChatController, ControllerError, PendingReply, ReplyOutcome};
