//! Delivery of transcribed text to the desktop.
//!
//! Delivery is best-effort by design: a failed clipboard write or a
//! refused paste must never take down the pipeline, so every failure is
//! logged and reflected in the receipt instead of propagated.

use std::time::Duration;

use tracing::{debug, info, warn};

use voxkey_core::types::OutputMode;

use crate::{Desktop, PasteKey, WindowHandle};

/// Clipboard managers need a beat to observe the new contents before the
/// paste lands.
const CLIPBOARD_SETTLE: Duration = Duration::from_millis(20);
/// The re-foregrounded window needs focus before it will accept input.
const FOCUS_SETTLE: Duration = Duration::from_millis(50);
/// Let the target application process the paste before anything else
/// touches the clipboard.
const PASTE_SETTLE: Duration = Duration::from_millis(100);

/// What actually happened during one delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub mode: OutputMode,
    /// Whether the text made it onto the clipboard.
    pub clipboard_ok: bool,
    /// Whether the full paste chord was sent (paste mode only).
    pub pasted: bool,
}

/// Drives a `Desktop` through the delivery sequence.
pub struct OutputDispatcher<D: Desktop> {
    desktop: D,
    saved_window: Option<WindowHandle>,
}

impl<D: Desktop> OutputDispatcher<D> {
    pub fn new(desktop: D) -> Self {
        Self {
            desktop,
            saved_window: None,
        }
    }

    /// Record the currently focused window.
    ///
    /// Called when the hotkey is pressed, before any recording UI can
    /// steal focus, so paste mode can put the text where the user was
    /// typing.
    pub fn save_foreground_window(&mut self) {
        self.saved_window = self.desktop.foreground_window();
        debug!(window = ?self.saved_window, "Saved foreground window");
    }

    /// Deliver text. The clipboard is written in both modes; paste mode
    /// first restores focus so the clipboard write and the chord land
    /// against the window the user was dictating into. Consumes the saved
    /// window.
    pub async fn deliver(&mut self, text: &str, mode: OutputMode) -> DeliveryReceipt {
        let saved = self.saved_window.take();

        if mode == OutputMode::CopyToClipboard {
            let clipboard_ok = self.write_clipboard(text);
            info!(text_len = text.len(), clipboard_ok, "Delivered to clipboard");
            return DeliveryReceipt {
                mode,
                clipboard_ok,
                pasted: false,
            };
        }

        if let Some(window) = saved {
            if !self.desktop.force_foreground(window) {
                warn!(?window, "Focus restore refused, pasting into current focus");
            }
            tokio::time::sleep(FOCUS_SETTLE).await;
        } else {
            debug!("No saved window, pasting into current focus");
        }

        let clipboard_ok = self.write_clipboard(text);
        if !clipboard_ok {
            // Nothing on the clipboard means nothing to paste.
            return DeliveryReceipt {
                mode,
                clipboard_ok,
                pasted: false,
            };
        }
        tokio::time::sleep(CLIPBOARD_SETTLE).await;

        let pasted = self.send_chord();
        if pasted {
            tokio::time::sleep(PASTE_SETTLE).await;
        }

        info!(text_len = text.len(), pasted, "Delivered via paste");
        DeliveryReceipt {
            mode,
            clipboard_ok,
            pasted,
        }
    }

    fn write_clipboard(&mut self, text: &str) -> bool {
        match self.desktop.set_clipboard(text) {
            Ok(()) => true,
            Err(e) => {
                warn!("Clipboard write failed: {}", e);
                false
            }
        }
    }

    fn send_chord(&mut self) -> bool {
        for key in PasteKey::CHORD {
            if let Err(e) = self.desktop.send_paste_key(key) {
                warn!(?key, "Paste keystroke failed: {}", e);
                // Release the modifier so Ctrl is not left held down.
                if key != PasteKey::ModifierDown && key != PasteKey::ModifierUp {
                    let _ = self.desktop.send_paste_key(PasteKey::ModifierUp);
                }
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockDesktop;

    #[tokio::test]
    async fn test_clipboard_mode_copies_without_paste() {
        let mock = MockDesktop::new();
        let mut dispatcher = OutputDispatcher::new(mock.clone());

        let receipt = dispatcher.deliver("hello", OutputMode::CopyToClipboard).await;

        assert_eq!(mock.clipboard_texts(), vec!["hello".to_string()]);
        assert!(mock.sent_keys().is_empty());
        assert!(receipt.clipboard_ok);
        assert!(!receipt.pasted);
    }

    #[tokio::test]
    async fn test_paste_mode_sends_full_chord_and_restores_focus() {
        let mock = MockDesktop::new();
        mock.set_foreground_window(Some(WindowHandle(7)));
        let mut dispatcher = OutputDispatcher::new(mock.clone());

        dispatcher.save_foreground_window();
        let receipt = dispatcher
            .deliver("hello", OutputMode::PasteToActiveWindow)
            .await;

        assert_eq!(mock.clipboard_texts(), vec!["hello".to_string()]);
        assert_eq!(mock.sent_keys(), PasteKey::CHORD.to_vec());
        assert_eq!(mock.focus_calls(), vec![WindowHandle(7)]);
        assert!(receipt.clipboard_ok);
        assert!(receipt.pasted);
    }

    #[tokio::test]
    async fn test_paste_without_saved_window_still_pastes() {
        let mock = MockDesktop::new();
        let mut dispatcher = OutputDispatcher::new(mock.clone());

        let receipt = dispatcher
            .deliver("hello", OutputMode::PasteToActiveWindow)
            .await;

        assert!(mock.focus_calls().is_empty());
        assert_eq!(mock.sent_keys().len(), 4);
        assert!(receipt.pasted);
    }

    #[tokio::test]
    async fn test_clipboard_failure_is_swallowed() {
        let mock = MockDesktop::new();
        mock.set_fail_clipboard(true);
        let mut dispatcher = OutputDispatcher::new(mock.clone());

        let receipt = dispatcher
            .deliver("hello", OutputMode::PasteToActiveWindow)
            .await;

        assert!(!receipt.clipboard_ok);
        assert!(!receipt.pasted);
        assert!(mock.sent_keys().is_empty());
    }

    #[tokio::test]
    async fn test_send_failure_reports_not_pasted() {
        let mock = MockDesktop::new();
        mock.set_fail_send(true);
        let mut dispatcher = OutputDispatcher::new(mock.clone());

        let receipt = dispatcher
            .deliver("hello", OutputMode::PasteToActiveWindow)
            .await;

        assert!(receipt.clipboard_ok);
        assert!(!receipt.pasted);
    }

    #[tokio::test]
    async fn test_refused_foreground_still_pastes() {
        let mock = MockDesktop::new();
        mock.set_foreground_window(Some(WindowHandle(9)));
        mock.set_refuse_foreground(true);
        let mut dispatcher = OutputDispatcher::new(mock.clone());

        dispatcher.save_foreground_window();
        let receipt = dispatcher
            .deliver("hello", OutputMode::PasteToActiveWindow)
            .await;

        assert!(receipt.pasted);
    }

    #[tokio::test]
    async fn test_saved_window_is_consumed() {
        let mock = MockDesktop::new();
        mock.set_foreground_window(Some(WindowHandle(7)));
        let mut dispatcher = OutputDispatcher::new(mock.clone());

        dispatcher.save_foreground_window();
        dispatcher
            .deliver("one", OutputMode::PasteToActiveWindow)
            .await;
        dispatcher
            .deliver("two", OutputMode::PasteToActiveWindow)
            .await;

        // Second delivery had no saved window to restore.
        assert_eq!(mock.focus_calls(), vec![WindowHandle(7)]);
    }
}
