//! Error types for range_localization

use std::fmt;

/// Main error type for the localization engine
#[derive(Debug)]
pub enum LocalizationError {
    /// World, population or landmark setup that the engine cannot start from
    InvalidConfiguration(String),
    /// Worker thread could not be joined or a shared slot was unusable
    ConcurrencyError(String),
    /// Rendering a snapshot failed
    VisualizationError(String),
    /// I/O error
    IoError(std::io::Error),
}

impl fmt::Display for LocalizationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalizationError::InvalidConfiguration(msg) => {
                write!(f, "Invalid configuration: {}", msg)
            }
            LocalizationError::ConcurrencyError(msg) => write!(f, "Concurrency error: {}", msg),
            LocalizationError::VisualizationError(msg) => {
                write!(f, "Visualization error: {}", msg)
            }
            LocalizationError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for LocalizationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LocalizationError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LocalizationError {
    fn from(e: std::io::Error) -> Self {
        LocalizationError::IoError(e)
    }
}

/// Result type alias for localization operations
pub type LocalizationResult<T> = Result<T, LocalizationError>;

/// Shorthand for building an `InvalidConfiguration` error
pub(crate) fn invalid_config<T>(msg: impl Into<String>) -> LocalizationResult<T> {
    Err(LocalizationError::InvalidConfiguration(msg.into()))
}
