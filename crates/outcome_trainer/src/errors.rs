use boxoffice_core::PipelineError;
use thiserror::Error;

/// Errors returned by the training pipeline.
#[derive(Debug, Error)]
pub enum TrainerError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrainerError {
    pub fn data_quality(message: impl Into<String>) -> Self {
        TrainerError::Pipeline(PipelineError::DataQuality(message.into()))
    }
}
