//! Real Whisper transcription engine via whisper-rs (whisper.cpp bindings).
//!
//! When compiled with the `whisper` feature, loads a GGML model file and
//! runs speech-to-text inference on finished recordings. Without the
//! feature, initialization fails cleanly and the engine reports not-ready.

use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use voxkey_core::{Result, VoxkeyError, TARGET_SAMPLE_RATE};
use voxkey_audio::RecordingBuffer;

use crate::filter::HallucinationFilter;
use crate::models::ModelStore;
use crate::Transcriber;

/// whisper.cpp rejects input shorter than one second; quieter-than-that
/// recordings are padded with trailing silence.
const MIN_INFERENCE_SAMPLES: usize = TARGET_SAMPLE_RATE as usize + TARGET_SAMPLE_RATE as usize / 10;

/// A loaded model context. Only constructible with the `whisper` feature.
struct LoadedModel {
    #[cfg(feature = "whisper")]
    ctx: whisper_rs::WhisperContext,
}

/// Transcription engine backed by whisper.cpp.
///
/// Inference is CPU-bound and runs on the blocking pool; the single mutex
/// around the model serializes concurrent calls and lets `unload` swap the
/// model out between them.
pub struct WhisperEngine {
    model: Arc<Mutex<Option<LoadedModel>>>,
    store: ModelStore,
    model_id: String,
    language: String,
    filter: HallucinationFilter,
}

impl WhisperEngine {
    /// Create an engine with no model loaded. Call `initialize` before use.
    pub fn new(store: ModelStore, model_id: &str, language: &str) -> Self {
        Self {
            model: Arc::new(Mutex::new(None)),
            store,
            model_id: model_id.to_string(),
            language: language.to_string(),
            filter: HallucinationFilter::new(),
        }
    }

    /// The configured model identifier.
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// The store this engine resolves model files through.
    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    /// Load the configured model. Idempotent: a second call with the model
    /// already loaded is a no-op.
    #[cfg(feature = "whisper")]
    pub fn initialize(&self) -> Result<()> {
        use whisper_rs::{WhisperContext, WhisperContextParameters};

        let mut guard = self.model.lock().expect("model mutex poisoned");
        if guard.is_some() {
            debug!("Whisper model already loaded");
            return Ok(());
        }

        if !self.store.is_available(&self.model_id) {
            return Err(VoxkeyError::Transcription(format!(
                "Model '{}' not found or incomplete at {}",
                self.model_id,
                self.store.path_for(&self.model_id).display()
            )));
        }

        let path = self.store.path_for(&self.model_id);
        info!(model = %self.model_id, path = %path.display(), lang = %self.language, "Loading Whisper model");

        let ctx = WhisperContext::new_with_params(
            &path.to_string_lossy(),
            WhisperContextParameters::default(),
        )
        .map_err(|e| VoxkeyError::Transcription(format!("Failed to load Whisper model: {}", e)))?;

        *guard = Some(LoadedModel { ctx });
        info!("Whisper model loaded");
        Ok(())
    }

    /// Stub when the `whisper` feature is disabled: always fails, leaving
    /// the engine not-ready.
    #[cfg(not(feature = "whisper"))]
    pub fn initialize(&self) -> Result<()> {
        tracing::warn!("WhisperEngine built without the `whisper` feature");
        Err(VoxkeyError::Transcription(
            "Transcription requires the `whisper` feature to be enabled".into(),
        ))
    }

    /// Drop the loaded model, releasing its memory. Idempotent.
    pub fn unload(&self) {
        let mut guard = self.model.lock().expect("model mutex poisoned");
        if guard.take().is_some() {
            info!("Whisper model unloaded");
        }
    }

    #[cfg(feature = "whisper")]
    fn run_inference(
        model: &LoadedModel,
        samples: &[f32],
        language: &str,
    ) -> Result<Vec<String>> {
        use whisper_rs::{FullParams, SamplingStrategy};

        let mut state = model.ctx.create_state().map_err(|e| {
            VoxkeyError::Transcription(format!("Failed to create Whisper state: {}", e))
        })?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(if language == "auto" { None } else { Some(language) });
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_single_segment(false);

        state
            .full(params, samples)
            .map_err(|e| VoxkeyError::Transcription(format!("Whisper inference failed: {}", e)))?;

        let n_segments = state.full_n_segments().map_err(|e| {
            VoxkeyError::Transcription(format!("Failed to get segment count: {}", e))
        })?;

        let mut segments = Vec::with_capacity(n_segments as usize);
        for i in 0..n_segments {
            let text = state.full_get_segment_text(i).map_err(|e| {
                VoxkeyError::Transcription(format!("Failed to get segment {} text: {}", i, e))
            })?;
            segments.push(text);
        }
        Ok(segments)
    }

    #[cfg(not(feature = "whisper"))]
    fn run_inference(
        _model: &LoadedModel,
        _samples: &[f32],
        _language: &str,
    ) -> Result<Vec<String>> {
        Err(VoxkeyError::NotInitialized)
    }
}

impl Transcriber for WhisperEngine {
    fn is_ready(&self) -> bool {
        self.model.lock().expect("model mutex poisoned").is_some()
    }

    async fn transcribe(&self, recording: &RecordingBuffer) -> Result<String> {
        if !self.is_ready() {
            return Err(VoxkeyError::NotInitialized);
        }

        let mut samples = recording.samples()?;
        if samples.is_empty() {
            return Ok(String::new());
        }
        if samples.len() < MIN_INFERENCE_SAMPLES {
            samples.resize(MIN_INFERENCE_SAMPLES, 0.0);
        }

        debug!(
            samples = samples.len(),
            duration_secs = samples.len() as f32 / TARGET_SAMPLE_RATE as f32,
            "Starting Whisper transcription"
        );

        let model = Arc::clone(&self.model);
        let language = self.language.clone();
        let segments = tokio::task::spawn_blocking(move || {
            let guard = model.lock().expect("model mutex poisoned");
            let Some(loaded) = guard.as_ref() else {
                // Unloaded between the readiness check and the blocking task.
                return Err(VoxkeyError::NotInitialized);
            };
            Self::run_inference(loaded, &samples, &language)
        })
        .await
        .map_err(|e| VoxkeyError::Transcription(format!("Inference task failed: {}", e)))??;

        let text = self.filter.join_segments(&segments);
        info!(
            segments = segments.len(),
            text_len = text.len(),
            "Transcription complete"
        );
        Ok(text)
    }
}
