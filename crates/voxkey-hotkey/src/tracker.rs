//! Press/release edge detection for a held hotkey.
//!
//! The OS only reports the press of a registered hotkey (and auto-repeats
//! it while held); the release has to be observed by sampling live key
//! state. `HoldTracker` turns those two inputs into clean edges.

use crate::binding::Binding;

/// Samples whether a virtual key is currently down.
///
/// The real implementation asks the OS; tests use a scripted probe.
pub trait KeyStateProbe {
    fn is_pressed(&self, vk: u16) -> bool;
}

/// Probe backed by `GetAsyncKeyState`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemKeyStateProbe;

#[cfg(target_os = "windows")]
impl KeyStateProbe for SystemKeyStateProbe {
    fn is_pressed(&self, vk: u16) -> bool {
        use windows_sys::Win32::UI::Input::KeyboardAndMouse::GetAsyncKeyState;
        // High bit set means the key is currently down.
        unsafe { (GetAsyncKeyState(vk as i32) as u16) & 0x8000 != 0 }
    }
}

#[cfg(not(target_os = "windows"))]
impl KeyStateProbe for SystemKeyStateProbe {
    fn is_pressed(&self, _vk: u16) -> bool {
        false
    }
}

/// Tracks the hold state of one binding.
///
/// `on_press` is fed every press event the OS delivers; repeats while the
/// key is held are collapsed. `poll_release` is called on a timer and
/// reports the release edge once, when any key in the binding goes up.
#[derive(Debug)]
pub struct HoldTracker {
    vk_codes: Vec<u16>,
    held: bool,
}

impl HoldTracker {
    pub fn new(binding: &Binding) -> Self {
        Self {
            vk_codes: binding.vk_codes(),
            held: false,
        }
    }

    /// Feed a press event. Returns `true` only on the rising edge; repeat
    /// events while held return `false`.
    pub fn on_press(&mut self) -> bool {
        if self.held {
            return false;
        }
        self.held = true;
        true
    }

    /// Sample key state. Returns `true` once on the falling edge, when the
    /// binding is held and any of its keys is no longer down.
    pub fn poll_release(&mut self, probe: &impl KeyStateProbe) -> bool {
        if !self.held {
            return false;
        }
        if self.vk_codes.iter().all(|&vk| probe.is_pressed(vk)) {
            return false;
        }
        self.held = false;
        true
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Forget the current hold without emitting a release edge. Used when
    /// the binding is unregistered mid-hold.
    pub fn reset(&mut self) {
        self.held = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct FakeProbe {
        down: HashSet<u16>,
    }

    impl FakeProbe {
        fn with_down(vks: &[u16]) -> Self {
            Self {
                down: vks.iter().copied().collect(),
            }
        }
    }

    impl KeyStateProbe for FakeProbe {
        fn is_pressed(&self, vk: u16) -> bool {
            self.down.contains(&vk)
        }
    }

    fn tracker() -> HoldTracker {
        HoldTracker::new(&"Alt+Space".parse().unwrap())
    }

    #[test]
    fn test_press_then_release_edges() {
        let mut t = tracker();
        assert!(t.on_press());
        assert!(t.is_held());

        // Both keys still down: no release yet.
        let held = FakeProbe::with_down(&[0x12, 0x20]);
        assert!(!t.poll_release(&held));
        assert!(t.is_held());

        // Space went up.
        let released = FakeProbe::with_down(&[0x12]);
        assert!(t.poll_release(&released));
        assert!(!t.is_held());
    }

    #[test]
    fn test_repeat_presses_collapse() {
        let mut t = tracker();
        assert!(t.on_press());
        assert!(!t.on_press());
        assert!(!t.on_press());
    }

    #[test]
    fn test_release_edge_fires_once() {
        let mut t = tracker();
        t.on_press();

        let up = FakeProbe::with_down(&[]);
        assert!(t.poll_release(&up));
        assert!(!t.poll_release(&up));
    }

    #[test]
    fn test_poll_without_hold_is_quiet() {
        let mut t = tracker();
        let up = FakeProbe::with_down(&[]);
        assert!(!t.poll_release(&up));
    }

    #[test]
    fn test_any_key_up_releases() {
        let mut t = tracker();
        t.on_press();

        // Modifier released while trigger still held.
        let partial = FakeProbe::with_down(&[0x20]);
        assert!(t.poll_release(&partial));
    }

    #[test]
    fn test_reset_clears_hold_silently() {
        let mut t = tracker();
        t.on_press();
        t.reset();
        assert!(!t.is_held());

        let up = FakeProbe::with_down(&[]);
        assert!(!t.poll_release(&up));
    }

    #[test]
    fn test_new_cycle_after_release() {
        let mut t = tracker();
        t.on_press();
        let up = FakeProbe::with_down(&[]);
        t.poll_release(&up);

        assert!(t.on_press());
    }
}
