//! Model file management.
//!
//! Resolves model identifiers to GGML files on disk and validates that a
//! file is plausibly complete before the engine tries to load it.

use std::path::{Path, PathBuf};

use tracing::warn;

/// A Whisper model the application knows how to name and validate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownModel {
    pub id: &'static str,
    /// Approximate size of the GGML file in bytes.
    pub expected_bytes: u64,
}

/// Models with known file sizes, smallest first.
const KNOWN_MODELS: &[KnownModel] = &[
    KnownModel { id: "tiny", expected_bytes: 77_700_000 },
    KnownModel { id: "tiny.en", expected_bytes: 77_700_000 },
    KnownModel { id: "base", expected_bytes: 147_900_000 },
    KnownModel { id: "base.en", expected_bytes: 147_900_000 },
    KnownModel { id: "small", expected_bytes: 487_600_000 },
    KnownModel { id: "small.en", expected_bytes: 487_600_000 },
];

/// A file smaller than this fraction of the expected size is treated as a
/// truncated download.
const MIN_SIZE_FRACTION: f64 = 0.9;

/// Locates and validates model files under a configured directory.
#[derive(Debug, Clone)]
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    /// Create a store rooted at `dir`. A leading `~` expands to the home
    /// directory.
    pub fn new(dir: &str) -> Self {
        Self {
            dir: expand_home(dir),
        }
    }

    /// Directory holding the model files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path where the given model id is expected to live.
    pub fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("ggml-{}.bin", id))
    }

    /// Whether a model file exists and is plausibly complete.
    ///
    /// Unknown ids skip the size check; a truncated download of a known
    /// model (below 90% of its expected size) is treated as unavailable.
    pub fn is_available(&self, id: &str) -> bool {
        let path = self.path_for(id);
        let Ok(metadata) = std::fs::metadata(&path) else {
            return false;
        };
        if !metadata.is_file() {
            return false;
        }

        match KNOWN_MODELS.iter().find(|m| m.id == id) {
            Some(model) => {
                let min = (model.expected_bytes as f64 * MIN_SIZE_FRACTION) as u64;
                if metadata.len() < min {
                    warn!(
                        model = id,
                        actual = metadata.len(),
                        expected = model.expected_bytes,
                        "Model file looks truncated"
                    );
                    false
                } else {
                    true
                }
            }
            None => true,
        }
    }

    /// Known model ids for configuration UIs.
    pub fn known_ids() -> Vec<&'static str> {
        KNOWN_MODELS.iter().map(|m| m.id).collect()
    }

    /// Human-readable size for a known model id ("142 MB"), or `None`.
    pub fn size_display(id: &str) -> Option<String> {
        KNOWN_MODELS
            .iter()
            .find(|m| m.id == id)
            .map(|m| format!("{} MB", m.expected_bytes / 1_000_000))
    }
}

fn expand_home(dir: &str) -> PathBuf {
    if let Some(rest) = dir.strip_prefix("~") {
        if let Some(home) = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
            let rest = rest.trim_start_matches(['/', '\\']);
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(dir)
}
