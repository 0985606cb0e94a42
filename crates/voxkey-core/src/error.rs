use thiserror::Error;

/// Top-level error type for the Voxkey system.
///
/// Cycle-scoped failures (`DeviceUnavailable`, `NotInitialized`,
/// `Transcription`) abort the current dictation cycle only; the coordinator
/// returns to a reusable state and the next hotkey press starts fresh.
/// `HotkeyConflict` is registration-time and fatal to that binding.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VoxkeyError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Hotkey '{0}' is already in use by another application")]
    HotkeyConflict(String),

    #[error("Hotkey error: {0}")]
    Hotkey(String),

    #[error("Audio device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Audio error: {0}")]
    Audio(String),

    #[error("Transcription model not initialized")]
    NotInitialized,

    #[error("Transcription error: {0}")]
    Transcription(String),

    #[error("Output error: {0}")]
    Output(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for VoxkeyError {
    fn from(err: toml::de::Error) -> Self {
        VoxkeyError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for VoxkeyError {
    fn from(err: toml::ser::Error) -> Self {
        VoxkeyError::Config(err.to_string())
    }
}

/// A specialized `Result` type for Voxkey operations.
pub type Result<T> = std::result::Result<T, VoxkeyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VoxkeyError::DeviceUnavailable("no such device".to_string());
        assert_eq!(
            err.to_string(),
            "Audio device unavailable: no such device"
        );
    }

    #[test]
    fn test_hotkey_conflict_display() {
        let err = VoxkeyError::HotkeyConflict("Alt+Space".to_string());
        assert!(err.to_string().contains("Alt+Space"));
        assert!(err.to_string().contains("already in use"));
    }

    #[test]
    fn test_not_initialized_display() {
        let err = VoxkeyError::NotInitialized;
        assert_eq!(err.to_string(), "Transcription model not initialized");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: VoxkeyError = io_err.into();
        assert!(matches!(err, VoxkeyError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_toml_error_conversion() {
        let bad = "invalid = [[[";
        let parsed: std::result::Result<toml::Value, _> = toml::from_str(bad);
        let err: VoxkeyError = parsed.unwrap_err().into();
        assert!(matches!(err, VoxkeyError::Config(_)));
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(42);
            let _value = io_result?;
            Ok("success".to_string())
        }

        assert_eq!(inner().unwrap(), "success");
    }
}
