use thiserror::Error;

/// Core error types for pictor
#[derive(Debug, Error)]
pub enum CoreError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Image type name not present in the registry
    #[error("Unknown image type: {0}")]
    UnknownImageType(String),

    /// Image type parameters out of range
    #[error("Invalid image type {name}: {reason}")]
    InvalidImageType {
        /// Name of the offending image type.
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
