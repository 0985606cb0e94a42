//! Voxkey audio crate - microphone capture and recording accumulation.
//!
//! Opens a capture device via cpal, converts every delivered chunk to the
//! fixed target format (mono, 16 kHz, 16-bit), and accumulates a complete
//! WAV-framed recording that is handed off exactly once when the recording
//! stops. Includes a mock implementation for testing without real hardware.

pub mod buffer;
pub mod capture;
pub mod convert;
pub mod recorder;

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use voxkey_core::Result;

pub use buffer::RecordingBuffer;
pub use capture::{list_devices, CaptureService};
pub use recorder::RecorderCore;

/// Control surface for the audio capture stage.
///
/// The coordinator drives capture through this trait; the finished
/// recording arrives out-of-band on the channel the implementation was
/// constructed with, never as a return value, so that the state transition
/// is always driven by the capture-finished signal.
pub trait CaptureControl: Send {
    /// Open the device and begin streaming. Fails with `DeviceUnavailable`
    /// if the selector does not resolve or the device cannot be opened;
    /// no partial state is left behind on failure.
    fn start_recording(&mut self, selector: &str) -> Result<()>;

    /// Stop streaming and deliver the accumulated buffer. Idempotent when
    /// not recording (no signal is emitted).
    fn stop_recording(&mut self);

    /// Whether a capture session is currently open.
    fn is_recording(&self) -> bool;
}

/// Mock capture service for testing the pipeline without audio hardware.
///
/// Emits a configured buffer on the finished channel when stopped, and can
/// be set up to fail `start_recording`.
#[derive(Clone)]
pub struct MockCapture {
    finished_tx: mpsc::UnboundedSender<RecordingBuffer>,
    next_buffer: Arc<Mutex<RecordingBuffer>>,
    fail_start: Arc<Mutex<bool>>,
    recording: Arc<Mutex<bool>>,
    start_calls: Arc<Mutex<u32>>,
}

impl MockCapture {
    pub fn new(finished_tx: mpsc::UnboundedSender<RecordingBuffer>) -> Self {
        Self {
            finished_tx,
            next_buffer: Arc::new(Mutex::new(RecordingBuffer::empty())),
            fail_start: Arc::new(Mutex::new(false)),
            recording: Arc::new(Mutex::new(false)),
            start_calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Set the buffer the next `stop_recording` call will deliver.
    pub fn set_next_buffer(&self, buffer: RecordingBuffer) {
        *self.next_buffer.lock().expect("mock mutex poisoned") = buffer;
    }

    /// Make the next `start_recording` call fail with `DeviceUnavailable`.
    pub fn set_fail_start(&self, fail: bool) {
        *self.fail_start.lock().expect("mock mutex poisoned") = fail;
    }

    /// Number of successful `start_recording` calls so far.
    pub fn start_count(&self) -> u32 {
        *self.start_calls.lock().expect("mock mutex poisoned")
    }
}

impl CaptureControl for MockCapture {
    fn start_recording(&mut self, selector: &str) -> Result<()> {
        if *self.fail_start.lock().expect("mock mutex poisoned") {
            return Err(voxkey_core::VoxkeyError::DeviceUnavailable(
                selector.to_string(),
            ));
        }
        *self.recording.lock().expect("mock mutex poisoned") = true;
        *self.start_calls.lock().expect("mock mutex poisoned") += 1;
        Ok(())
    }

    fn stop_recording(&mut self) {
        let mut recording = self.recording.lock().expect("mock mutex poisoned");
        if !*recording {
            return;
        }
        *recording = false;
        let buffer = std::mem::replace(
            &mut *self.next_buffer.lock().expect("mock mutex poisoned"),
            RecordingBuffer::empty(),
        );
        let _ = self.finished_tx.send(buffer);
    }

    fn is_recording(&self) -> bool {
        *self.recording.lock().expect("mock mutex poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_capture_start_stop_delivers_buffer() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut capture = MockCapture::new(tx);
        capture.set_next_buffer(RecordingBuffer::from_samples(&[0.1, 0.2, 0.3]));

        capture.start_recording("default").unwrap();
        assert!(capture.is_recording());

        capture.stop_recording();
        assert!(!capture.is_recording());

        let buffer = rx.recv().await.unwrap();
        assert!(!buffer.is_empty());
    }

    #[tokio::test]
    async fn test_mock_capture_stop_without_start_is_silent() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut capture = MockCapture::new(tx);

        capture.stop_recording();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_mock_capture_fail_start() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut capture = MockCapture::new(tx);
        capture.set_fail_start(true);

        let result = capture.start_recording("default");
        assert!(matches!(
            result,
            Err(voxkey_core::VoxkeyError::DeviceUnavailable(_))
        ));
        assert!(!capture.is_recording());
        assert_eq!(capture.start_count(), 0);
    }
}
