//! State transitions - FSM transition logic
//!
//! Implements the state machine that handles event-driven state transitions.

use thiserror::Error;

use super::events::ChatEvent;
use super::states::ReplyState;

/// Error type for invalid state transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Invalid transition from {from:?} with event {event}")]
    InvalidTransition { from: ReplyState, event: String },
}

/// Represents a state transition result.
#[derive(Debug, Clone)]
pub struct StateTransition {
    /// The state before the transition.
    pub from: ReplyState,
    /// The state after the transition.
    pub to: ReplyState,
    /// The event that triggered the transition.
    pub event: ChatEvent,
    /// Whether the state actually changed.
    pub changed: bool,
}

/// State machine for the reply lifecycle.
#[derive(Debug, Clone)]
pub struct StateMachine {
    /// Current state.
    current_state: ReplyState,
    /// Transition history (limited).
    history: Vec<StateTransition>,
    /// Max history entries to keep.
    max_history: usize,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    /// Create a new state machine in Idle state.
    pub fn new() -> Self {
        Self {
            current_state: ReplyState::Idle,
            history: Vec::new(),
            max_history: 50,
        }
    }

    /// Get the current state.
    pub fn state(&self) -> &ReplyState {
        &self.current_state
    }

    /// Get the transition history.
    pub fn history(&self) -> &[StateTransition] {
        &self.history
    }

    pub fn accepts_user_input(&self) -> bool {
        self.current_state.accepts_user_input()
    }

    /// Handle an event and transition to a new state.
    ///
    /// Events that do not apply to the current state leave it unchanged;
    /// the returned transition reports `changed = false`.
    pub fn handle_event(&mut self, event: ChatEvent) -> StateTransition {
        let old_state = self.current_state.clone();
        let new_state = Self::compute_next_state(&old_state, &event);
        let changed = old_state != new_state;

        if changed {
            tracing::debug!(
                "Reply state {:?} -> {:?} on {}",
                old_state,
                new_state,
                event.name()
            );
        }

        self.current_state = new_state.clone();

        let transition = StateTransition {
            from: old_state,
            to: new_state,
            event,
            changed,
        };

        // Add to history
        self.history.push(transition.clone());
        if self.history.len() > self.max_history {
            self.history.remove(0);
        }

        transition
    }

    /// Like [`handle_event`](Self::handle_event), but rejects events that do
    /// not apply to the current state without recording them.
    pub fn try_handle_event(
        &mut self,
        event: ChatEvent,
    ) -> Result<StateTransition, TransitionError> {
        if !self.can_transition(&event) {
            return Err(TransitionError::InvalidTransition {
                from: self.current_state.clone(),
                event: event.name().to_string(),
            });
        }
        Ok(self.handle_event(event))
    }

    /// Compute the next state given current state and event.
    fn compute_next_state(state: &ReplyState, event: &ChatEvent) -> ReplyState {
        use ChatEvent::*;
        use ReplyState::*;

        match (state, event) {
            (Idle, UserMessageSent { conversation_id }) => Pending {
                conversation_id: conversation_id.clone(),
            },
            (Pending { .. }, ReplyReceived) => Idle,
            (Pending { .. }, ReplyFailed { .. }) => Idle,

            // ========== Default: No transition ==========
            _ => state.clone(),
        }
    }

    /// Check if a transition is valid without executing it.
    pub fn can_transition(&self, event: &ChatEvent) -> bool {
        let next = Self::compute_next_state(&self.current_state, event);
        next != self.current_state
    }
}
