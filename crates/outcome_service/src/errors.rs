//! Prediction service error types

use boxoffice_core::PipelineError;
use thiserror::Error;

/// Prediction service errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServiceError {
    /// Errors confined to a single request
    pub fn is_request_error(&self) -> bool {
        matches!(self, ServiceError::Pipeline(e) if e.is_request_error())
    }
}
