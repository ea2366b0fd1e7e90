//! Error types shared by the training pipeline and the prediction service

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised anywhere along the encode → scale → predict pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Training data is missing a column, is empty, or cannot be fitted.
    /// Always fatal for a training run.
    #[error("Data quality error: {0}")]
    DataQuality(String),

    /// Genre was not seen when the encoder was fitted.
    /// Local to a single request.
    #[error("Unknown genre '{genre}': not in the fitted vocabulary")]
    UnknownCategory { genre: String },

    /// A persisted artifact is absent, corrupt, or from another bundle.
    /// Fatal at service start.
    #[error("Artifact unavailable at {}: {reason}", path.display())]
    ArtifactMissing { path: PathBuf, reason: String },

    /// Request field outside its accepted range
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PipelineError {
    pub fn artifact_missing(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ArtifactMissing {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Errors a caller can recover from by fixing the request
    pub fn is_request_error(&self) -> bool {
        matches!(self, Self::UnknownCategory { .. } | Self::InvalidRequest(_))
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
