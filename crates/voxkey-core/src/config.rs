use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, VoxkeyError};
use crate::types::OutputMode;

/// Top-level configuration for the Voxkey application.
///
/// Loaded from `~/.voxkey/config.toml` by default. Mutations are
/// UI-driven and take effect on the next dictation cycle; components
/// receive the relevant section explicitly at construction or cycle start,
/// never through ambient global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoxkeyConfig {
    pub general: GeneralConfig,
    pub hotkey: HotkeyConfig,
    pub audio: AudioConfig,
    pub output: OutputConfig,
    pub model: ModelConfig,
    pub feedback: FeedbackConfig,
}

impl Default for VoxkeyConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            hotkey: HotkeyConfig::default(),
            audio: AudioConfig::default(),
            output: OutputConfig::default(),
            model: ModelConfig::default(),
            feedback: FeedbackConfig::default(),
        }
    }
}

impl VoxkeyConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: VoxkeyConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| VoxkeyError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Push-to-talk hotkey configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HotkeyConfig {
    /// Binding string, e.g. "Alt+Space" or "Ctrl+Shift+D".
    pub binding: String,
    /// Release-poll interval in milliseconds. The OS only reports the
    /// press; release is detected by sampling live key state.
    pub poll_interval_ms: u64,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            binding: "Alt+Space".to_string(),
            poll_interval_ms: 30,
        }
    }
}

/// Microphone capture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Device selector: "default" or a device id / name substring.
    pub device: String,
    /// Maximum recording duration in seconds. Bounds worst-case buffer size.
    pub max_recording_secs: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: "default".to_string(),
            max_recording_secs: 120,
        }
    }
}

/// Text delivery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Delivery mode for transcribed text.
    pub mode: OutputMode,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            mode: OutputMode::CopyToClipboard,
        }
    }
}

/// Transcription model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model identifier, e.g. "base.en" or "small".
    pub id: String,
    /// Language code ("auto" for automatic detection).
    pub language: String,
    /// Directory holding model files. "~" expands to the home directory.
    pub dir: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            id: "base.en".to_string(),
            language: "auto".to_string(),
            dir: "~/.voxkey/models".to_string(),
        }
    }
}

/// UI feedback configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    /// Show the overlay indicator during dictation.
    pub show_overlay: bool,
    /// Play sounds on recording start/stop.
    pub play_sounds: bool,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            show_overlay: true,
            play_sounds: true,
        }
    }
}
