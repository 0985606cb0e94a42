use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{DictationState, OutputMode};

/// Feedback events emitted by the dictation pipeline.
///
/// Consumed by UI collaborators (overlay, tray, sounds) over a broadcast
/// channel. Strictly fire-and-forget: the pipeline never waits on a
/// subscriber and a missing subscriber is not an error.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[non_exhaustive]
pub enum DictationEvent {
    /// The pipeline state changed.
    StateChanged {
        cycle_id: Uuid,
        state: DictationState,
        timestamp: DateTime<Utc>,
    },

    /// A cycle finished with an empty recording or an all-filtered
    /// transcription. Not an error.
    NoSpeechDetected {
        cycle_id: Uuid,
        timestamp: DateTime<Utc>,
    },

    /// Text was delivered to the OS.
    Delivered {
        cycle_id: Uuid,
        mode: OutputMode,
        text_len: usize,
        /// Whether the paste keystroke was actually sent (paste mode only;
        /// clipboard-only delivery leaves this false).
        pasted: bool,
        timestamp: DateTime<Utc>,
    },

    /// A cycle failed. The pipeline is in the Error state until the next
    /// start attempt.
    Failed {
        cycle_id: Uuid,
        reason: String,
        timestamp: DateTime<Utc>,
    },
}

impl DictationEvent {
    /// Returns a human-readable event name for logging.
    pub fn event_name(&self) -> &'static str {
        match self {
            DictationEvent::StateChanged { .. } => "state_changed",
            DictationEvent::NoSpeechDetected { .. } => "no_speech_detected",
            DictationEvent::Delivered { .. } => "delivered",
            DictationEvent::Failed { .. } => "failed",
        }
    }

    /// The cycle this event belongs to.
    pub fn cycle_id(&self) -> Uuid {
        match self {
            DictationEvent::StateChanged { cycle_id, .. }
            | DictationEvent::NoSpeechDetected { cycle_id, .. }
            | DictationEvent::Delivered { cycle_id, .. }
            | DictationEvent::Failed { cycle_id, .. } => *cycle_id,
        }
    }

    /// User-facing message for the three terminal events, `None` for plain
    /// state changes. Distinguishes clipboard-only from paste-and-copy.
    pub fn message(&self) -> Option<String> {
        match self {
            DictationEvent::StateChanged { .. } => None,
            DictationEvent::NoSpeechDetected { .. } => {
                Some("No speech detected".to_string())
            }
            DictationEvent::Delivered { mode, pasted, .. } => Some(match (mode, pasted) {
                (OutputMode::CopyToClipboard, _) => {
                    "Copied! Press Ctrl+V to paste".to_string()
                }
                (OutputMode::PasteToActiveWindow, true) => "Copied and pasted".to_string(),
                (OutputMode::PasteToActiveWindow, false) => {
                    "Copied (paste unavailable)".to_string()
                }
            }),
            DictationEvent::Failed { reason, .. } => Some(format!("Dictation failed: {}", reason)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_name() {
        let event = DictationEvent::NoSpeechDetected {
            cycle_id: Uuid::new_v4(),
            timestamp: Utc::now(),
        };
        assert_eq!(event.event_name(), "no_speech_detected");
    }

    #[test]
    fn test_cycle_id_accessor() {
        let id = Uuid::new_v4();
        let event = DictationEvent::StateChanged {
            cycle_id: id,
            state: DictationState::Listening,
            timestamp: Utc::now(),
        };
        assert_eq!(event.cycle_id(), id);
    }

    #[test]
    fn test_message_distinguishes_output_modes() {
        let clipboard = DictationEvent::Delivered {
            cycle_id: Uuid::new_v4(),
            mode: OutputMode::CopyToClipboard,
            text_len: 5,
            pasted: false,
            timestamp: Utc::now(),
        };
        assert!(clipboard.message().unwrap().contains("Ctrl+V"));

        let pasted = DictationEvent::Delivered {
            cycle_id: Uuid::new_v4(),
            mode: OutputMode::PasteToActiveWindow,
            text_len: 5,
            pasted: true,
            timestamp: Utc::now(),
        };
        assert_eq!(pasted.message().unwrap(), "Copied and pasted");
    }

    #[test]
    fn test_state_change_has_no_message() {
        let event = DictationEvent::StateChanged {
            cycle_id: Uuid::new_v4(),
            state: DictationState::Idle,
            timestamp: Utc::now(),
        };
        assert!(event.message().is_none());
    }

    #[test]
    fn test_event_serialization_round_trip() {
        let event = DictationEvent::Failed {
            cycle_id: Uuid::new_v4(),
            reason: "device lost".to_string(),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let rt: DictationEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(rt.event_name(), "failed");
        assert_eq!(rt.cycle_id(), event.cycle_id());
    }
}
