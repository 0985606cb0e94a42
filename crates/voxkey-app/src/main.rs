//! Voxkey application binary - composition root.
//!
//! Ties the crates together into a single push-to-talk dictation tool:
//! 1. Load configuration from TOML
//! 2. Load the Whisper model (degrading gracefully if unavailable)
//! 3. Wire capture, transcription, and output into the coordinator
//! 4. Register the global hotkey and pump press/release edges
//!
//! The hotkey pump runs on the main task because the OS hotkey manager is
//! not `Send`; everything else runs as spawned tasks.

mod feedback;

use std::path::PathBuf;

use tokio::sync::mpsc;

use voxkey_core::config::VoxkeyConfig;
use voxkey_core::VoxkeyError;

use voxkey_audio::CaptureService;
use voxkey_hotkey::{HotkeyEdge, HotkeyMonitor};
use voxkey_output::{OutputDispatcher, SystemDesktop};
use voxkey_pipeline::{Command, Coordinator, CoordinatorOptions};
use voxkey_whisper::{ModelStore, WhisperEngine};

/// Resolve the config file path (VOXKEY_CONFIG env, or ~/.voxkey/config.toml).
fn config_path() -> PathBuf {
    if let Ok(p) = std::env::var("VOXKEY_CONFIG") {
        return PathBuf::from(p);
    }
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".voxkey").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".voxkey").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Config is read before tracing so its log level can serve as the
    // default filter; RUST_LOG still wins.
    let config_file = config_path();
    let config = VoxkeyConfig::load_or_default(&config_file);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(&config.general.log_level)
            }),
        )
        .init();

    tracing::info!("Starting Voxkey v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    for (id, name) in voxkey_audio::list_devices() {
        tracing::debug!(id = %id, name = %name, "Input device");
    }

    // Transcription engine. A missing model is not fatal at startup; each
    // press will fail with a clear event until the model appears and the
    // process is restarted.
    let store = ModelStore::new(&config.model.dir);
    let engine = WhisperEngine::new(store, &config.model.id, &config.model.language);
    match engine.initialize() {
        Ok(()) => tracing::info!(model = %engine.model_id(), "Transcription ready"),
        Err(e) => tracing::warn!(
            model = %engine.model_id(),
            dir = %engine.store().dir().display(),
            "Transcription unavailable: {}",
            e
        ),
    }

    // Wiring: capture delivers finished recordings on its own channel, the
    // hotkey pump delivers edges, and the coordinator consumes both.
    let (finished_tx, finished_rx) = mpsc::unbounded_channel();
    let (commands_tx, commands_rx) = mpsc::unbounded_channel();
    let (edges_tx, mut edges_rx) = mpsc::unbounded_channel();

    let capture = CaptureService::new(finished_tx, config.audio.max_recording_secs);
    let dispatcher = OutputDispatcher::new(SystemDesktop::new());

    let coordinator = Coordinator::new(
        capture,
        engine,
        dispatcher,
        CoordinatorOptions {
            device: config.audio.device.clone(),
            output_mode: config.output.mode,
        },
        commands_rx,
        finished_rx,
    );

    // Feedback: the console stand-in for the overlay and sound cues,
    // honoring the [feedback] toggles.
    let mut events_rx = coordinator.subscribe();
    let feedback_config = config.feedback.clone();
    tokio::spawn(async move {
        loop {
            match events_rx.recv().await {
                Ok(event) => {
                    let fb = feedback::render(&event, &feedback_config);
                    if fb.chime {
                        // Terminal bell as the audio cue.
                        eprint!("\x07");
                    }
                    if let Some(message) = fb.message {
                        tracing::info!(cycle_id = %event.cycle_id(), "{}", message);
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    tracing::debug!(skipped = n, "Feedback subscriber lagged");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    tokio::spawn(coordinator.run());

    // Map hotkey edges onto coordinator commands.
    tokio::spawn(async move {
        while let Some(edge) = edges_rx.recv().await {
            let command = match edge {
                HotkeyEdge::Pressed => Command::Start,
                HotkeyEdge::Released => Command::Stop,
            };
            if commands_tx.send(command).is_err() {
                break;
            }
        }
    });

    let monitor = match HotkeyMonitor::new(&config.hotkey, edges_tx) {
        Ok(m) => m,
        Err(VoxkeyError::HotkeyConflict(detail)) => {
            tracing::error!(
                "Hotkey '{}' is already taken by another application ({}). \
                 Change [hotkey].binding in {} and restart.",
                config.hotkey.binding,
                detail,
                config_file.display()
            );
            return Err(VoxkeyError::HotkeyConflict(detail).into());
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(
        binding = %monitor.binding(),
        mode = %config.output.mode,
        "Hold the hotkey to dictate"
    );

    // The hotkey manager is not Send, so the pump stays on the main task.
    tokio::select! {
        _ = monitor.run() => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down");
        }
    }

    Ok(())
}
