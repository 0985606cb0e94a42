//! Real desktop integration: arboard for the clipboard, SendInput for the
//! paste chord, and the Win32 foreground-window calls for focus restore.
//!
//! On non-Windows, the clipboard still works through arboard; focus and
//! keystroke simulation are stubs.

use tracing::debug;

use voxkey_core::{Result, VoxkeyError};

use crate::{Desktop, PasteKey, WindowHandle};

/// Desktop implementation backed by the real OS.
///
/// The arboard clipboard handle is opened lazily and kept for the life of
/// the process; opening it is the expensive part on most platforms.
pub struct SystemDesktop {
    clipboard: Option<arboard::Clipboard>,
}

impl SystemDesktop {
    pub fn new() -> Self {
        Self { clipboard: None }
    }

    fn clipboard(&mut self) -> Result<&mut arboard::Clipboard> {
        if self.clipboard.is_none() {
            let clipboard = arboard::Clipboard::new()
                .map_err(|e| VoxkeyError::Output(format!("Failed to open clipboard: {}", e)))?;
            self.clipboard = Some(clipboard);
        }
        Ok(self.clipboard.as_mut().expect("clipboard just opened"))
    }
}

impl Default for SystemDesktop {
    fn default() -> Self {
        Self::new()
    }
}

impl Desktop for SystemDesktop {
    #[cfg(target_os = "windows")]
    fn foreground_window(&self) -> Option<WindowHandle> {
        use windows_sys::Win32::UI::WindowsAndMessaging::GetForegroundWindow;

        let hwnd = unsafe { GetForegroundWindow() };
        if hwnd == 0 {
            None
        } else {
            Some(WindowHandle(hwnd))
        }
    }

    #[cfg(not(target_os = "windows"))]
    fn foreground_window(&self) -> Option<WindowHandle> {
        None
    }

    #[cfg(target_os = "windows")]
    fn force_foreground(&mut self, window: WindowHandle) -> bool {
        use windows_sys::Win32::System::Threading::GetCurrentThreadId;
        use windows_sys::Win32::UI::Input::KeyboardAndMouse::AttachThreadInput;
        use windows_sys::Win32::UI::WindowsAndMessaging::{
            GetForegroundWindow, GetWindowThreadProcessId, SetForegroundWindow,
        };

        // SetForegroundWindow is refused for background processes unless
        // the caller's input queue is attached to the thread owning the
        // current foreground window.
        unsafe {
            let current = GetForegroundWindow();
            if current == window.0 {
                return true;
            }

            let fg_thread = GetWindowThreadProcessId(current, std::ptr::null_mut());
            let our_thread = GetCurrentThreadId();
            let attached = fg_thread != 0
                && fg_thread != our_thread
                && AttachThreadInput(our_thread, fg_thread, 1) != 0;

            let ok = SetForegroundWindow(window.0) != 0;

            if attached {
                AttachThreadInput(our_thread, fg_thread, 0);
            }
            ok
        }
    }

    #[cfg(not(target_os = "windows"))]
    fn force_foreground(&mut self, _window: WindowHandle) -> bool {
        false
    }

    fn set_clipboard(&mut self, text: &str) -> Result<()> {
        self.clipboard()?
            .set_text(text)
            .map_err(|e| VoxkeyError::Output(format!("Failed to set clipboard: {}", e)))?;
        debug!(text_len = text.len(), "Clipboard updated");
        Ok(())
    }

    #[cfg(target_os = "windows")]
    fn send_paste_key(&mut self, key: PasteKey) -> Result<()> {
        use windows_sys::Win32::UI::Input::KeyboardAndMouse::{
            SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, KEYBDINPUT, KEYEVENTF_KEYUP, VK_CONTROL,
        };

        const VK_V: u16 = 'V' as u16;

        let (vk, flags) = match key {
            PasteKey::ModifierDown => (VK_CONTROL, 0),
            PasteKey::KeyDown => (VK_V, 0),
            PasteKey::KeyUp => (VK_V, KEYEVENTF_KEYUP),
            PasteKey::ModifierUp => (VK_CONTROL, KEYEVENTF_KEYUP),
        };

        let input = INPUT {
            r#type: INPUT_KEYBOARD,
            Anonymous: INPUT_0 {
                ki: KEYBDINPUT {
                    wVk: vk,
                    wScan: 0,
                    dwFlags: flags,
                    time: 0,
                    dwExtraInfo: 0,
                },
            },
        };

        let sent = unsafe { SendInput(1, &input, std::mem::size_of::<INPUT>() as i32) };
        if sent != 1 {
            return Err(VoxkeyError::Output(format!(
                "SendInput rejected {:?} event",
                key
            )));
        }
        Ok(())
    }

    #[cfg(not(target_os = "windows"))]
    fn send_paste_key(&mut self, key: PasteKey) -> Result<()> {
        debug!(?key, "Keystroke simulation not available on this platform");
        Err(VoxkeyError::Output(
            "Paste simulation is only available on Windows".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_desktop_creation() {
        // Clipboard is opened lazily, so construction never touches the OS.
        let _desktop = SystemDesktop::new();
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn test_paste_key_errors_off_windows() {
        let mut desktop = SystemDesktop::new();
        assert!(desktop.send_paste_key(PasteKey::KeyDown).is_err());
        assert!(!desktop.force_foreground(WindowHandle(1)));
        assert!(desktop.foreground_window().is_none());
    }
}
