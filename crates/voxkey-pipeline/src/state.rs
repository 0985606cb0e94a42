//! Dictation state machine with thread-safe transitions.
//!
//! Enforces valid transitions for the push-to-talk lifecycle:
//! - Idle -> Listening (hotkey pressed, capture started)
//! - Idle -> Error (pipeline failure outside a running cycle)
//! - Listening -> Transcribing (capture finished with audio, inference begins)
//! - Listening -> Idle (capture finished empty: no speech)
//! - Listening -> Error (capture died mid-recording)
//! - Transcribing -> Idle (cycle finished, delivered or no speech)
//! - Transcribing -> Error (inference failed)
//! - Error -> Listening (next press attempts recovery)
//! - Error -> Idle (recovery attempt failed cleanly, or explicit reset)

use std::sync::{Arc, Mutex};

use voxkey_core::types::DictationState;
use voxkey_core::{Result, VoxkeyError};

/// Returns whether a transition from `from` to `target` is valid.
pub fn can_transition(from: DictationState, target: DictationState) -> bool {
    matches!(
        (from, target),
        (DictationState::Idle, DictationState::Listening)
            | (DictationState::Idle, DictationState::Error)
            | (DictationState::Listening, DictationState::Transcribing)
            | (DictationState::Listening, DictationState::Idle)
            | (DictationState::Listening, DictationState::Error)
            | (DictationState::Transcribing, DictationState::Idle)
            | (DictationState::Transcribing, DictationState::Error)
            | (DictationState::Error, DictationState::Listening)
            | (DictationState::Error, DictationState::Idle)
    )
}

/// Thread-safe state machine for the dictation lifecycle.
///
/// Clones share the underlying state, so the coordinator and its observers
/// always agree. All transitions are validated before being applied.
#[derive(Debug, Clone)]
pub struct StateMachine {
    state: Arc<Mutex<DictationState>>,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    /// Create a new state machine initialized to `Idle`.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(DictationState::Idle)),
        }
    }

    /// Returns the current state.
    pub fn current(&self) -> DictationState {
        *self.state.lock().expect("state mutex poisoned")
    }

    /// Attempt to transition to the target state.
    pub fn transition(&self, target: DictationState) -> Result<()> {
        let mut state = self.state.lock().expect("state mutex poisoned");
        if can_transition(*state, target) {
            tracing::debug!("Dictation state: {} -> {}", *state, target);
            *state = target;
            Ok(())
        } else {
            Err(VoxkeyError::Pipeline(format!(
                "Invalid state transition: {} -> {}",
                *state, target
            )))
        }
    }

    /// Force the state machine back to Idle (error recovery escape hatch).
    pub fn reset(&self) {
        let mut state = self.state.lock().expect("state mutex poisoned");
        tracing::warn!("State machine reset to Idle from {}", *state);
        *state = DictationState::Idle;
    }
}

// =============================================================================
// Tests
// =============================================================================
