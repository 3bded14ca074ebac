//! Error types for the Recital application

use thiserror::Error;

/// Recital application errors
#[derive(Error, Debug, Clone)]
pub enum RecitalError {
    /// A required platform capability is absent entirely
    #[error("Unsupported capability: {0}")]
    Unsupported(String),

    /// Device access failed (denied, busy, or no device present)
    #[error("Device access error: {0}")]
    DeviceAccess(String),

    /// Recording session failure
    #[error("Recording session error: {0}")]
    Session(String),

    /// Clip assembly or file system error
    #[error("Clip error: {0}")]
    Clip(String),

    /// Speech recognition error
    #[error("Speech recognition error: {0}")]
    Speech(String),

    /// Channel communication error
    #[error("Channel error: {0}")]
    Channel(String),
}

impl From<std::io::Error> for RecitalError {
    fn from(e: std::io::Error) -> Self {
        RecitalError::Clip(e.to_string())
    }
}

impl RecitalError {
    /// Get a user-facing description of the error
    ///
    /// Returns a message suitable for display in a panel notice.
    pub fn user_message(&self) -> String {
        match self {
            RecitalError::Unsupported(what) => {
                format!("{} is not supported on this system.", what)
            }
            RecitalError::DeviceAccess(_) => {
                "Could not access the capture device. Check that it is connected and not in use."
                    .to_string()
            }
            RecitalError::Session(_) => "Recording failed. Please try again.".to_string(),
            RecitalError::Clip(_) => "Could not save the recording.".to_string(),
            RecitalError::Speech(_) => "Speech recognition failed.".to_string(),
            RecitalError::Channel(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
        }
    }
}

/// Result type alias for Recital operations
pub type Result<T> = std::result::Result<T, RecitalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_names_missing_capability() {
        let err = RecitalError::Unsupported("Speech recognition".to_string());
        assert!(err.user_message().contains("Speech recognition"));
    }

    #[test]
    fn test_io_error_converts_to_clip_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: RecitalError = io.into();
        assert!(matches!(err, RecitalError::Clip(_)));
    }
}
