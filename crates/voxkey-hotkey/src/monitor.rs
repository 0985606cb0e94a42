//! Global hotkey registration and the release-poll pump.
//!
//! On Windows, registers the binding system-wide via the `global-hotkey`
//! crate and runs a pump that turns OS press events plus key-state polling
//! into clean press/release edges on a channel.
//!
//! On non-Windows, provides a stub that registers nothing.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use voxkey_core::config::HotkeyConfig;
use voxkey_core::{Result, VoxkeyError};

use crate::binding::Binding;
use crate::tracker::{HoldTracker, SystemKeyStateProbe};

/// A push-to-talk edge observed on the hotkey.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyEdge {
    Pressed,
    Released,
}

/// Owns the OS hotkey registration and emits edges while pumped.
pub struct HotkeyMonitor {
    binding: Binding,
    poll_interval: Duration,
    edges_tx: mpsc::UnboundedSender<HotkeyEdge>,
    tracker: HoldTracker,
    #[cfg(target_os = "windows")]
    manager: global_hotkey::GlobalHotKeyManager,
    #[cfg(target_os = "windows")]
    hotkey: Option<global_hotkey::hotkey::HotKey>,
}

impl HotkeyMonitor {
    /// Parse the configured binding and register it with the OS.
    ///
    /// A registration failure is reported as `HotkeyConflict`: on Windows
    /// the overwhelmingly common cause is another application already
    /// holding the combination.
    #[cfg(target_os = "windows")]
    pub fn new(config: &HotkeyConfig, edges_tx: mpsc::UnboundedSender<HotkeyEdge>) -> Result<Self> {
        use global_hotkey::hotkey::HotKey;
        use global_hotkey::GlobalHotKeyManager;
        use std::str::FromStr;

        let binding: Binding = config.binding.parse()?;

        let manager = GlobalHotKeyManager::new()
            .map_err(|e| VoxkeyError::Hotkey(format!("Failed to create hotkey manager: {}", e)))?;

        let hotkey = HotKey::from_str(&binding.canonical())
            .map_err(|e| VoxkeyError::Hotkey(format!("Failed to parse '{}': {}", binding, e)))?;

        manager
            .register(hotkey)
            .map_err(|e| VoxkeyError::HotkeyConflict(format!("{}: {}", binding, e)))?;

        tracing::info!(binding = %binding, "Global hotkey registered");

        Ok(Self {
            tracker: HoldTracker::new(&binding),
            binding,
            poll_interval: Duration::from_millis(config.poll_interval_ms.max(1)),
            edges_tx,
            manager,
            hotkey: Some(hotkey),
        })
    }

    /// Stub constructor for non-Windows platforms. Parses and validates the
    /// binding but registers nothing.
    #[cfg(not(target_os = "windows"))]
    pub fn new(config: &HotkeyConfig, edges_tx: mpsc::UnboundedSender<HotkeyEdge>) -> Result<Self> {
        let binding: Binding = config.binding.parse()?;
        tracing::warn!("Global hotkey capture is only available on Windows");
        Ok(Self {
            tracker: HoldTracker::new(&binding),
            binding,
            poll_interval: Duration::from_millis(config.poll_interval_ms.max(1)),
            edges_tx,
        })
    }

    /// The registered binding.
    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    /// Pump press events and key-state polls into edges until the edge
    /// receiver is dropped. The OS only reports presses (auto-repeating
    /// while held), so the release edge comes from polling.
    pub async fn run(mut self) {
        let probe = SystemKeyStateProbe;
        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            if self.edges_tx.is_closed() {
                debug!("Edge receiver dropped, stopping hotkey pump");
                break;
            }

            if self.poll_press_event() && self.tracker.on_press() {
                let _ = self.edges_tx.send(HotkeyEdge::Pressed);
            }

            if self.tracker.poll_release(&probe) {
                let _ = self.edges_tx.send(HotkeyEdge::Released);
            }
        }

        self.unregister();
    }

    #[cfg(target_os = "windows")]
    fn poll_press_event(&self) -> bool {
        use global_hotkey::{GlobalHotKeyEvent, HotKeyState};

        let Some(hotkey) = &self.hotkey else {
            return false;
        };

        let mut pressed = false;
        while let Ok(event) = GlobalHotKeyEvent::receiver().try_recv() {
            if event.id() == hotkey.id() && event.state() == HotKeyState::Pressed {
                pressed = true;
            }
        }
        pressed
    }

    #[cfg(not(target_os = "windows"))]
    fn poll_press_event(&self) -> bool {
        false
    }

    /// Release the OS registration. Idempotent.
    #[cfg(target_os = "windows")]
    pub fn unregister(&mut self) {
        if let Some(hotkey) = self.hotkey.take() {
            let _ = self.manager.unregister(hotkey);
            self.tracker.reset();
            tracing::info!(binding = %self.binding, "Global hotkey unregistered");
        }
    }

    #[cfg(not(target_os = "windows"))]
    pub fn unregister(&mut self) {
        self.tracker.reset();
    }
}

#[cfg(target_os = "windows")]
impl Drop for HotkeyMonitor {
    fn drop(&mut self) {
        self.unregister();
    }
}
