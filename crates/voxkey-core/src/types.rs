use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Target PCM format required by the transcription model. Whatever the
/// microphone natively provides is converted to this before accumulation.
pub const TARGET_SAMPLE_RATE: u32 = 16_000;
pub const TARGET_CHANNELS: u16 = 1;

/// Operational state of the dictation pipeline.
///
/// `Idle` is both the initial state and the terminal state of every cycle.
/// `Error` is a recoverable dead-end: the next start attempt leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DictationState {
    /// No dictation in progress. Ready to start.
    Idle,
    /// Hotkey held, microphone open, audio accumulating.
    Listening,
    /// Capture closed, transcription running in the background.
    Transcribing,
    /// The last cycle failed. Cleared by the next start attempt.
    Error,
}

impl fmt::Display for DictationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DictationState::Idle => write!(f, "Idle"),
            DictationState::Listening => write!(f, "Listening"),
            DictationState::Transcribing => write!(f, "Transcribing"),
            DictationState::Error => write!(f, "Error"),
        }
    }
}

/// How transcribed text is delivered to the operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Copy to the system clipboard only.
    CopyToClipboard,
    /// Restore the previously focused window and simulate a paste keystroke.
    PasteToActiveWindow,
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputMode::CopyToClipboard => write!(f, "clipboard"),
            OutputMode::PasteToActiveWindow => write!(f, "paste"),
        }
    }
}

/// The finished result of one dictation cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionOutcome {
    /// Final text after hallucination filtering and joining.
    pub text: String,
    /// Byte length of the recording buffer the text was produced from.
    pub source_bytes: usize,
    /// When the transcription completed.
    pub timestamp: DateTime<Utc>,
}

impl TranscriptionOutcome {
    pub fn new(text: String, source_bytes: usize) -> Self {
        Self {
            text,
            source_bytes,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display() {
        assert_eq!(DictationState::Idle.to_string(), "Idle");
        assert_eq!(DictationState::Listening.to_string(), "Listening");
        assert_eq!(DictationState::Transcribing.to_string(), "Transcribing");
        assert_eq!(DictationState::Error.to_string(), "Error");
    }

    #[test]
    fn test_output_mode_serde() {
        let json = serde_json::to_string(&OutputMode::PasteToActiveWindow).unwrap();
        assert_eq!(json, "\"paste_to_active_window\"");
        let mode: OutputMode = serde_json::from_str("\"copy_to_clipboard\"").unwrap();
        assert_eq!(mode, OutputMode::CopyToClipboard);
    }

    #[test]
    fn test_transcription_outcome() {
        let outcome = TranscriptionOutcome::new("hello world".to_string(), 32_000);
        assert_eq!(outcome.text, "hello world");
        assert_eq!(outcome.source_bytes, 32_000);
    }

    #[test]
    fn test_target_format() {
        assert_eq!(TARGET_SAMPLE_RATE, 16_000);
        assert_eq!(TARGET_CHANNELS, 1);
    }
}
