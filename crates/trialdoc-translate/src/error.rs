//! Error types for extraction, patching and translation

use thiserror::Error;

/// Errors that can occur while translating a UIF tree
///
/// Batch-level failures never surface here; they are retried, then
/// degraded to passthrough text inside the batch task.
#[derive(Error, Debug)]
pub enum TranslateError {
    /// The translation backend rejected or failed a request
    #[error("Backend error: {0}")]
    Backend(String),

    /// Transport failure talking to the backend
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid configuration file
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Malformed JSON payload
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A text path that does not follow the addressing grammar
    #[error("Invalid text path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// A backend call or the batch join did not finish in time
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Task or runtime failure
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Error reading a file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslateError>;
