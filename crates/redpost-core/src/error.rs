//! Unified error types for redpost

use thiserror::Error;

/// Unified error type for all redpost operations
#[derive(Error, Debug)]
pub enum RedpostError {
    // Fatal-setup errors: abort immediately, no retry
    #[error("Session error: {0}")]
    Session(String),

    #[error("Missing credential: {0}")]
    Auth(String),

    #[error("Config error: {0}")]
    Config(String),

    // Browser/DOM errors
    #[error("Browser error: {0}")]
    Browser(String),

    // Fatal-step errors: abort the remaining pipeline
    #[error("Workflow step '{step}' failed: {message}")]
    Step { step: String, message: String },

    // Element resolver errors (caller decides the fallback)
    #[error("Element resolver error: {0}")]
    Resolver(String),

    // Remote chat-completion errors
    #[error("API error: {0}")]
    Api(String),

    #[error("Provider error: {0}")]
    Provider(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(String),
}

impl RedpostError {
    /// Build a fatal step error
    pub fn step(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Step {
            step: step.into(),
            message: message.into(),
        }
    }
}

/// Result type alias using RedpostError
pub type Result<T> = std::result::Result<T, RedpostError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_error_display() {
        let err = RedpostError::step("UploadAsset", "no file input found");
        assert_eq!(
            err.to_string(),
            "Workflow step 'UploadAsset' failed: no file input found"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: RedpostError = io.into();
        assert!(matches!(err, RedpostError::Io(_)));
    }
}
