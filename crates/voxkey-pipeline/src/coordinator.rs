//! The dictation coordinator: one task that owns the full cycle.
//!
//! Press and release arrive as commands; the finished recording arrives on
//! its own channel from the capture stage. The coordinator is the only
//! writer of the state machine, so every transition happens in one place.
//! Transcription runs as a spawned task reporting back on an internal
//! channel, so the loop keeps consuming commands while inference runs and
//! presses arriving mid-cycle are dropped rather than queued.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use voxkey_core::events::DictationEvent;
use voxkey_core::types::{DictationState, OutputMode, TranscriptionOutcome};

use voxkey_audio::{CaptureControl, RecordingBuffer};
use voxkey_output::{Desktop, OutputDispatcher};
use voxkey_whisper::Transcriber;

use crate::state::StateMachine;

/// Commands driving the coordinator. Press/release edges map onto these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Hotkey pressed: begin a dictation cycle.
    Start,
    /// Hotkey released: stop capture and transcribe.
    Stop,
}

/// Per-cycle settings the coordinator reads at cycle start.
#[derive(Debug, Clone)]
pub struct CoordinatorOptions {
    /// Capture device selector.
    pub device: String,
    /// How transcribed text is delivered.
    pub output_mode: OutputMode,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            device: "default".to_string(),
            output_mode: OutputMode::CopyToClipboard,
        }
    }
}

/// A finished transcription attempt: cycle id, result, and the size of the
/// recording it came from.
type TranscribeResult = (Uuid, voxkey_core::Result<String>, usize);

/// Orchestrates capture, transcription, and delivery for one dictation
/// cycle at a time.
pub struct Coordinator<C: CaptureControl, T: Transcriber + 'static, D: Desktop> {
    capture: C,
    transcriber: Arc<T>,
    dispatcher: OutputDispatcher<D>,
    options: CoordinatorOptions,
    state: StateMachine,
    events_tx: broadcast::Sender<DictationEvent>,
    commands_rx: mpsc::UnboundedReceiver<Command>,
    finished_rx: mpsc::UnboundedReceiver<RecordingBuffer>,
    results_tx: mpsc::UnboundedSender<TranscribeResult>,
    results_rx: mpsc::UnboundedReceiver<TranscribeResult>,
    /// Set from the capture-finished signal until the cycle's terminal
    /// transition. Presses arriving while set are dropped, not queued.
    processing: bool,
    cycle_id: Uuid,
}

impl<C: CaptureControl, T: Transcriber + 'static, D: Desktop> Coordinator<C, T, D> {
    pub fn new(
        capture: C,
        transcriber: T,
        dispatcher: OutputDispatcher<D>,
        options: CoordinatorOptions,
        commands_rx: mpsc::UnboundedReceiver<Command>,
        finished_rx: mpsc::UnboundedReceiver<RecordingBuffer>,
    ) -> Self {
        let (events_tx, _) = broadcast::channel(64);
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        Self {
            capture,
            transcriber: Arc::new(transcriber),
            dispatcher,
            options,
            state: StateMachine::new(),
            events_tx,
            commands_rx,
            finished_rx,
            results_tx,
            results_rx,
            processing: false,
            cycle_id: Uuid::nil(),
        }
    }

    /// Subscribe to feedback events. Fire-and-forget: slow subscribers lag,
    /// they never block the pipeline.
    pub fn subscribe(&self) -> broadcast::Receiver<DictationEvent> {
        self.events_tx.subscribe()
    }

    /// Shared view of the state machine.
    pub fn state(&self) -> StateMachine {
        self.state.clone()
    }

    /// Run until the command channel closes.
    pub async fn run(mut self) {
        info!("Dictation coordinator started");
        loop {
            tokio::select! {
                cmd = self.commands_rx.recv() => match cmd {
                    Some(Command::Start) => self.on_start(),
                    Some(Command::Stop) => self.on_stop(),
                    None => break,
                },
                Some(buffer) = self.finished_rx.recv() => {
                    self.on_capture_finished(buffer);
                }
                Some((cycle_id, result, source_bytes)) = self.results_rx.recv() => {
                    self.on_transcribed(cycle_id, result, source_bytes).await;
                }
            }
        }

        if self.capture.is_recording() {
            self.capture.stop_recording();
        }
        info!("Dictation coordinator stopped");
    }

    fn emit(&self, event: DictationEvent) {
        // No subscribers is fine.
        let _ = self.events_tx.send(event);
    }

    fn emit_state(&self, state: DictationState) {
        self.emit(DictationEvent::StateChanged {
            cycle_id: self.cycle_id,
            state,
            timestamp: Utc::now(),
        });
    }

    /// A failure before capture ever opened. The cycle never started, so
    /// the user lands back in Idle rather than the Error dead-end.
    fn fail_start(&self, reason: String) {
        warn!(cycle_id = %self.cycle_id, "Start refused: {}", reason);
        if self.state.current() != DictationState::Idle {
            if self.state.transition(DictationState::Idle).is_err() {
                self.state.reset();
            }
            self.emit_state(DictationState::Idle);
        }
        self.emit(DictationEvent::Failed {
            cycle_id: self.cycle_id,
            reason,
            timestamp: Utc::now(),
        });
    }

    fn fail_cycle(&self, reason: String) {
        warn!(cycle_id = %self.cycle_id, "Dictation cycle failed: {}", reason);
        if self.state.current() != DictationState::Error {
            if self.state.transition(DictationState::Error).is_ok() {
                self.emit_state(DictationState::Error);
            } else {
                self.state.reset();
            }
        }
        self.emit(DictationEvent::Failed {
            cycle_id: self.cycle_id,
            reason,
            timestamp: Utc::now(),
        });
    }

    fn on_start(&mut self) {
        if self.processing {
            debug!("Press ignored: previous cycle still transcribing");
            return;
        }
        let current = self.state.current();
        if current == DictationState::Listening || current == DictationState::Transcribing {
            debug!(state = %current, "Press ignored in state");
            return;
        }

        self.cycle_id = Uuid::new_v4();

        if !self.transcriber.is_ready() {
            self.fail_start("Transcription model is not loaded".to_string());
            return;
        }

        // Capture the focus target before anything else can steal it.
        self.dispatcher.save_foreground_window();

        if let Err(e) = self.capture.start_recording(&self.options.device) {
            self.fail_start(e.to_string());
            return;
        }

        if let Err(e) = self.state.transition(DictationState::Listening) {
            warn!("{}", e);
            self.capture.stop_recording();
            self.state.reset();
            return;
        }
        info!(cycle_id = %self.cycle_id, "Recording started");
        self.emit_state(DictationState::Listening);
    }

    fn on_stop(&mut self) {
        if self.state.current() != DictationState::Listening {
            debug!("Release ignored: not listening");
            return;
        }

        // No state change here: the transition to Transcribing is driven by
        // the capture-finished signal so the transcription step always sees
        // a buffer, even for a very short hold.
        self.capture.stop_recording();
    }

    fn on_capture_finished(&mut self, buffer: RecordingBuffer) {
        debug!(
            cycle_id = %self.cycle_id,
            bytes = buffer.len(),
            "Capture finished"
        );
        self.processing = true;

        if buffer.is_empty() {
            self.finish_no_speech();
            return;
        }

        if self.state.transition(DictationState::Transcribing).is_err() {
            self.state.reset();
        }
        self.emit_state(DictationState::Transcribing);

        let transcriber = Arc::clone(&self.transcriber);
        let results_tx = self.results_tx.clone();
        let cycle_id = self.cycle_id;
        tokio::spawn(async move {
            let result = transcriber.transcribe(&buffer).await;
            let _ = results_tx.send((cycle_id, result, buffer.len()));
        });
    }

    async fn on_transcribed(
        &mut self,
        cycle_id: Uuid,
        result: voxkey_core::Result<String>,
        source_bytes: usize,
    ) {
        if cycle_id != self.cycle_id {
            debug!(%cycle_id, "Ignoring result from a superseded cycle");
            return;
        }

        let text = match result {
            Ok(text) => text,
            Err(e) => {
                self.processing = false;
                self.fail_cycle(e.to_string());
                return;
            }
        };

        if text.is_empty() {
            self.finish_no_speech();
            return;
        }

        let outcome = TranscriptionOutcome::new(text, source_bytes);
        let receipt = self
            .dispatcher
            .deliver(&outcome.text, self.options.output_mode)
            .await;

        self.processing = false;
        if self.state.transition(DictationState::Idle).is_err() {
            self.state.reset();
        }
        self.emit_state(DictationState::Idle);
        self.emit(DictationEvent::Delivered {
            cycle_id: self.cycle_id,
            mode: receipt.mode,
            text_len: outcome.text.len(),
            pasted: receipt.pasted,
            timestamp: outcome.timestamp,
        });
        info!(
            cycle_id = %self.cycle_id,
            text_len = outcome.text.len(),
            source_bytes = outcome.source_bytes,
            mode = %receipt.mode,
            pasted = receipt.pasted,
            "Dictation cycle complete"
        );
    }

    fn finish_no_speech(&mut self) {
        self.processing = false;
        if self.state.transition(DictationState::Idle).is_err() {
            self.state.reset();
        }
        self.emit_state(DictationState::Idle);
        self.emit(DictationEvent::NoSpeechDetected {
            cycle_id: self.cycle_id,
            timestamp: Utc::now(),
        });
        info!(cycle_id = %self.cycle_id, "No speech detected");
    }
}

// =============================================================================
// Tests
// =============================================================================
