//! Voxkey output crate - delivering transcribed text to the desktop.
//!
//! Text always lands on the clipboard; in paste mode the previously focused
//! window is re-foregrounded and a Ctrl+V keystroke is simulated on top.
//! Every OS interaction goes through the `Desktop` trait so the delivery
//! sequence is testable without a real desktop session.

pub mod desktop;
pub mod dispatcher;

use std::sync::{Arc, Mutex};

use voxkey_core::{Result, VoxkeyError};

pub use desktop::SystemDesktop;
pub use dispatcher::{DeliveryReceipt, OutputDispatcher};

/// Opaque handle to a top-level window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowHandle(pub isize);

/// One event of the simulated paste chord. The four events are sent
/// discretely, in order, so the target application sees a natural Ctrl+V.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasteKey {
    ModifierDown,
    KeyDown,
    KeyUp,
    ModifierUp,
}

impl PasteKey {
    /// The full chord in send order.
    pub const CHORD: [PasteKey; 4] = [
        PasteKey::ModifierDown,
        PasteKey::KeyDown,
        PasteKey::KeyUp,
        PasteKey::ModifierUp,
    ];
}

/// OS desktop surface the dispatcher drives.
pub trait Desktop: Send {
    /// Currently focused top-level window, if any.
    fn foreground_window(&self) -> Option<WindowHandle>;

    /// Bring a window back to the foreground. Returns whether the OS
    /// honored the request.
    fn force_foreground(&mut self, window: WindowHandle) -> bool;

    /// Replace the clipboard contents with the given text.
    fn set_clipboard(&mut self, text: &str) -> Result<()>;

    /// Send one event of the paste chord.
    fn send_paste_key(&mut self, key: PasteKey) -> Result<()>;
}

// =============================================================================
// Mock implementation
// =============================================================================

#[derive(Default)]
struct MockDesktopInner {
    foreground: Option<WindowHandle>,
    clipboard_texts: Vec<String>,
    sent_keys: Vec<PasteKey>,
    focus_calls: Vec<WindowHandle>,
    fail_clipboard: bool,
    fail_send: bool,
    refuse_foreground: bool,
}

/// Mock desktop that records every interaction for assertions.
///
/// Clones share state, so tests can keep a handle while the dispatcher
/// owns the other.
#[derive(Clone, Default)]
pub struct MockDesktop {
    inner: Arc<Mutex<MockDesktopInner>>,
}

impl MockDesktop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_foreground_window(&self, window: Option<WindowHandle>) {
        self.inner.lock().expect("mock mutex poisoned").foreground = window;
    }

    pub fn set_fail_clipboard(&self, fail: bool) {
        self.inner.lock().expect("mock mutex poisoned").fail_clipboard = fail;
    }

    pub fn set_fail_send(&self, fail: bool) {
        self.inner.lock().expect("mock mutex poisoned").fail_send = fail;
    }

    pub fn set_refuse_foreground(&self, refuse: bool) {
        self.inner.lock().expect("mock mutex poisoned").refuse_foreground = refuse;
    }

    pub fn clipboard_texts(&self) -> Vec<String> {
        self.inner
            .lock()
            .expect("mock mutex poisoned")
            .clipboard_texts
            .clone()
    }

    pub fn sent_keys(&self) -> Vec<PasteKey> {
        self.inner
            .lock()
            .expect("mock mutex poisoned")
            .sent_keys
            .clone()
    }

    pub fn focus_calls(&self) -> Vec<WindowHandle> {
        self.inner
            .lock()
            .expect("mock mutex poisoned")
            .focus_calls
            .clone()
    }
}

impl Desktop for MockDesktop {
    fn foreground_window(&self) -> Option<WindowHandle> {
        self.inner.lock().expect("mock mutex poisoned").foreground
    }

    fn force_foreground(&mut self, window: WindowHandle) -> bool {
        let mut inner = self.inner.lock().expect("mock mutex poisoned");
        inner.focus_calls.push(window);
        !inner.refuse_foreground
    }

    fn set_clipboard(&mut self, text: &str) -> Result<()> {
        let mut inner = self.inner.lock().expect("mock mutex poisoned");
        if inner.fail_clipboard {
            return Err(VoxkeyError::Output("scripted clipboard failure".into()));
        }
        inner.clipboard_texts.push(text.to_string());
        Ok(())
    }

    fn send_paste_key(&mut self, key: PasteKey) -> Result<()> {
        let mut inner = self.inner.lock().expect("mock mutex poisoned");
        if inner.fail_send {
            return Err(VoxkeyError::Output("scripted send failure".into()));
        }
        inner.sent_keys.push(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_records_interactions() {
        let mock = MockDesktop::new();
        let mut desktop = mock.clone();

        desktop.set_clipboard("hello").unwrap();
        desktop.send_paste_key(PasteKey::ModifierDown).unwrap();
        assert!(desktop.force_foreground(WindowHandle(42)));

        assert_eq!(mock.clipboard_texts(), vec!["hello".to_string()]);
        assert_eq!(mock.sent_keys(), vec![PasteKey::ModifierDown]);
        assert_eq!(mock.focus_calls(), vec![WindowHandle(42)]);
    }

    #[test]
    fn test_chord_order() {
        assert_eq!(
            PasteKey::CHORD,
            [
                PasteKey::ModifierDown,
                PasteKey::KeyDown,
                PasteKey::KeyUp,
                PasteKey::ModifierUp,
            ]
        );
    }
}
