//! Voxkey pipeline crate - the push-to-talk dictation lifecycle.
//!
//! A single coordinator task owns the cycle: hotkey press starts capture,
//! release hands the recording to transcription, and the cleaned text is
//! delivered to the desktop. Feedback flows out as broadcast events; the
//! state machine guarantees one cycle at a time.

pub mod coordinator;
pub mod state;

pub use coordinator::{Command, Coordinator, CoordinatorOptions};
pub use state::StateMachine;
