//! Recording accumulator shared between the audio callback and the
//! control side of a capture session.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use voxkey_core::TARGET_SAMPLE_RATE;

use crate::buffer::RecordingBuffer;

/// Accumulates converted samples for one capture session and delivers the
/// finished buffer exactly once.
///
/// The audio callback appends through a clone while the control side holds
/// the original; `finish` takes the sender so a second stop (or a stop
/// racing a device teardown) cannot deliver a duplicate buffer.
pub struct RecorderCore {
    samples: Arc<Mutex<Vec<f32>>>,
    finished_tx: Option<mpsc::UnboundedSender<RecordingBuffer>>,
    max_samples: usize,
}

impl RecorderCore {
    /// Create an accumulator bounded to `max_secs` of target-rate audio.
    pub fn new(finished_tx: mpsc::UnboundedSender<RecordingBuffer>, max_secs: u32) -> Self {
        Self {
            samples: Arc::new(Mutex::new(Vec::new())),
            finished_tx: Some(finished_tx),
            max_samples: max_secs as usize * TARGET_SAMPLE_RATE as usize,
        }
    }

    /// Handle for the audio callback to append converted samples.
    pub fn sink(&self) -> RecorderSink {
        RecorderSink {
            samples: Arc::clone(&self.samples),
            max_samples: self.max_samples,
        }
    }

    /// Number of samples accumulated so far.
    pub fn len(&self) -> usize {
        self.samples.lock().expect("recorder mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take the accumulated samples, frame them as a WAV buffer, and send
    /// the result on the finished channel. Subsequent calls do nothing.
    pub fn finish(&mut self) {
        let Some(tx) = self.finished_tx.take() else {
            debug!("Recorder already finished, ignoring");
            return;
        };

        let samples = std::mem::take(
            &mut *self.samples.lock().expect("recorder mutex poisoned"),
        );
        debug!(
            "Recording finished: {} samples ({:.2}s)",
            samples.len(),
            samples.len() as f32 / TARGET_SAMPLE_RATE as f32
        );

        let buffer = RecordingBuffer::from_samples(&samples);
        if tx.send(buffer).is_err() {
            warn!("Recording receiver dropped, discarding buffer");
        }
    }
}

/// Append-only handle given to the audio callback.
#[derive(Clone)]
pub struct RecorderSink {
    samples: Arc<Mutex<Vec<f32>>>,
    max_samples: usize,
}

impl RecorderSink {
    /// Append converted samples, dropping anything beyond the duration cap.
    pub fn push(&self, chunk: &[f32]) {
        let mut samples = self.samples.lock().expect("recorder mutex poisoned");
        if samples.len() >= self.max_samples {
            return;
        }
        let room = self.max_samples - samples.len();
        samples.extend_from_slice(&chunk[..chunk.len().min(room)]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_finish_delivers_accumulated_samples() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut recorder = RecorderCore::new(tx, 120);

        recorder.sink().push(&[0.1, 0.2, 0.3]);
        assert_eq!(recorder.len(), 3);

        recorder.finish();
        let buffer = rx.recv().await.unwrap();
        assert_eq!(buffer.samples().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_finish_is_once_only() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut recorder = RecorderCore::new(tx, 120);

        recorder.sink().push(&[0.1]);
        recorder.finish();
        recorder.finish();

        assert!(rx.recv().await.is_some());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_empty_session_delivers_empty_buffer() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut recorder = RecorderCore::new(tx, 120);

        recorder.finish();
        let buffer = rx.recv().await.unwrap();
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_duration_cap_drops_excess() {
        let (tx, _rx) = mpsc::unbounded_channel();
        // One second cap.
        let recorder = RecorderCore::new(tx, 1);
        let sink = recorder.sink();

        sink.push(&vec![0.0; 10_000]);
        sink.push(&vec![0.0; 10_000]);
        assert_eq!(recorder.len(), 16_000);

        sink.push(&[0.5, 0.5]);
        assert_eq!(recorder.len(), 16_000);
    }

    #[test]
    fn test_sink_appends_from_multiple_clones() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let recorder = RecorderCore::new(tx, 120);
        let a = recorder.sink();
        let b = a.clone();

        a.push(&[0.1]);
        b.push(&[0.2, 0.3]);
        assert_eq!(recorder.len(), 3);
    }
}
