//! Presentation of pipeline events on the console feedback surface.
//!
//! The overlay and sound toggles from the configuration decide what each
//! event produces: a user-facing message, an audio cue, both, or nothing.

use voxkey_core::config::FeedbackConfig;
use voxkey_core::events::DictationEvent;
use voxkey_core::types::DictationState;

/// What the feedback surface should do for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    /// Message to show the user, when the overlay is enabled.
    pub message: Option<String>,
    /// Whether to play the audio cue.
    pub chime: bool,
}

/// Map an event onto the configured feedback surface.
///
/// Messages are suppressed when the overlay is disabled; the cue fires on
/// the Listening transition (recording started) and on every terminal
/// event, when sounds are enabled.
pub fn render(event: &DictationEvent, config: &FeedbackConfig) -> Feedback {
    let message = if config.show_overlay {
        event.message()
    } else {
        None
    };

    let chime = config.play_sounds
        && match event {
            DictationEvent::StateChanged { state, .. } => *state == DictationState::Listening,
            _ => true,
        };

    Feedback { message, chime }
}
