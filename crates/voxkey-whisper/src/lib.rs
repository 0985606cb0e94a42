//! Voxkey whisper crate - model management and speech-to-text transcription.
//!
//! Provides a trait-based abstraction for turning a finished recording into
//! cleaned text, a real engine backed by whisper.cpp (behind the `whisper`
//! feature), a hallucination filter for the model's known junk outputs, and
//! a mock implementation for testing without loading a model.

use std::future::Future;
use std::sync::{Arc, Mutex};

use voxkey_core::error::{Result, VoxkeyError};
use voxkey_audio::RecordingBuffer;

pub mod engine;
pub mod filter;
pub mod models;

pub use engine::WhisperEngine;
pub use filter::HallucinationFilter;
pub use models::ModelStore;

/// Service for transcribing a finished recording into deliverable text.
///
/// Implementations return text that has already been through hallucination
/// filtering; an empty string means the recording contained no usable
/// speech, which is a normal outcome rather than an error.
pub trait Transcriber: Send + Sync {
    /// Whether a model is loaded and inference can run.
    fn is_ready(&self) -> bool;

    /// Transcribe a recording into cleaned text.
    fn transcribe(
        &self,
        recording: &RecordingBuffer,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// Mock transcriber that returns scripted results.
///
/// Used for testing the pipeline without a model. Returns the configured
/// text for every call, or a scripted failure.
#[derive(Clone)]
pub struct MockTranscriber {
    next_text: Arc<Mutex<String>>,
    fail_next: Arc<Mutex<bool>>,
    ready: Arc<Mutex<bool>>,
    delay: Arc<Mutex<std::time::Duration>>,
    call_count: Arc<Mutex<u32>>,
}

impl MockTranscriber {
    pub fn new(text: &str) -> Self {
        Self {
            next_text: Arc::new(Mutex::new(text.to_string())),
            fail_next: Arc::new(Mutex::new(false)),
            ready: Arc::new(Mutex::new(true)),
            delay: Arc::new(Mutex::new(std::time::Duration::ZERO)),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn set_ready(&self, ready: bool) {
        *self.ready.lock().expect("mock mutex poisoned") = ready;
    }

    pub fn set_next_text(&self, text: &str) {
        *self.next_text.lock().expect("mock mutex poisoned") = text.to_string();
    }

    pub fn set_fail_next(&self, fail: bool) {
        *self.fail_next.lock().expect("mock mutex poisoned") = fail;
    }

    /// Make `transcribe` take this long, for tests that need to observe
    /// the pipeline mid-transcription.
    pub fn set_delay(&self, delay: std::time::Duration) {
        *self.delay.lock().expect("mock mutex poisoned") = delay;
    }

    /// Number of `transcribe` calls so far.
    pub fn call_count(&self) -> u32 {
        *self.call_count.lock().expect("mock mutex poisoned")
    }
}

impl Default for MockTranscriber {
    fn default() -> Self {
        Self::new("mock transcription")
    }
}

impl Transcriber for MockTranscriber {
    fn is_ready(&self) -> bool {
        *self.ready.lock().expect("mock mutex poisoned")
    }

    async fn transcribe(&self, recording: &RecordingBuffer) -> Result<String> {
        *self.call_count.lock().expect("mock mutex poisoned") += 1;

        let delay = *self.delay.lock().expect("mock mutex poisoned");
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if *self.fail_next.lock().expect("mock mutex poisoned") {
            return Err(VoxkeyError::Transcription("scripted failure".into()));
        }

        if recording.is_empty() {
            return Ok(String::new());
        }

        Ok(self.next_text.lock().expect("mock mutex poisoned").clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_returns_scripted_text() {
        let transcriber = MockTranscriber::new("hello world");
        let recording = RecordingBuffer::from_samples(&[0.1; 1600]);

        let text = transcriber.transcribe(&recording).await.unwrap();
        assert_eq!(text, "hello world");
        assert_eq!(transcriber.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_empty_recording_yields_empty_text() {
        let transcriber = MockTranscriber::default();
        let text = transcriber
            .transcribe(&RecordingBuffer::empty())
            .await
            .unwrap();
        assert!(text.is_empty());
    }

    #[tokio::test]
    async fn test_mock_scripted_failure() {
        let transcriber = MockTranscriber::default();
        transcriber.set_fail_next(true);

        let recording = RecordingBuffer::from_samples(&[0.1; 100]);
        let result = transcriber.transcribe(&recording).await;
        assert!(matches!(result, Err(VoxkeyError::Transcription(_))));
    }
}
