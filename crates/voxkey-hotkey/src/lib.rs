//! Voxkey hotkey crate - push-to-talk hotkey registration and edge
//! detection.
//!
//! The OS hotkey facility only reports presses, auto-repeating while the
//! combination is held. This crate layers release detection on top by
//! sampling live key state on a short interval, and exposes the result as
//! clean press/release edges on a channel.

pub mod binding;
pub mod monitor;
pub mod tracker;

pub use binding::Binding;
pub use monitor::{HotkeyEdge, HotkeyMonitor};
pub use tracker::{HoldTracker, KeyStateProbe, SystemKeyStateProbe};
