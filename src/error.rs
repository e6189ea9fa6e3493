//! Error types for model packaging and serving marshalling

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for servepack operations
pub type Result<T> = std::result::Result<T, ExportError>;

/// Main error type for the servepack crate
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("model exposes no serving signature, even after a save/reload round trip")]
    SignatureUnavailable,

    #[error("model artifact path not found: {}", .path.display())]
    PathNotFound { path: PathBuf },

    #[error("inference call failed: {0}")]
    InferenceFailure(String),

    #[error("invalid model artifact at {}: {reason}", .path.display())]
    InvalidArtifact { path: PathBuf, reason: String },

    #[error("column not found: {0}")]
    ColumnNotFound(String),

    #[error("operator has no served model name; export() must run before transform()")]
    ModelNameUnset,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::Serialization(err.to_string())
    }
}
