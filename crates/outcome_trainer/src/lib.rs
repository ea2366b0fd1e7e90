//! Box-office outcome trainer
//!
//! Offline pipeline that turns a historical movie table into the encoder,
//! scaler and forest classifier artifacts loaded by the prediction service.
//! Training is fully deterministic for a given table and seed.

pub mod cart;
pub mod config;
pub mod dataset;
pub mod deterministic;
pub mod errors;
pub mod export;
pub mod forest;
pub mod impute;
pub mod pipeline;

use std::path::Path;

pub use config::TrainerConfig;
pub use dataset::{MovieRecord, RawTable, REQUIRED_COLUMNS};
pub use deterministic::{mix_seed, train_test_split, LcgRng, Split};
pub use errors::TrainerError;
pub use forest::ForestTrainer;
pub use impute::{Column, FillValue, Imputer, Table};
pub use pipeline::{TrainedPipeline, TrainingPipeline, TrainingReport};

/// Train from `input` with default parameters and write the bundle into `output_dir`
pub fn train_from_csv(input: &Path, output_dir: &Path) -> Result<TrainingReport, TrainerError> {
    let config = TrainerConfig {
        input: input.to_path_buf(),
        output_dir: output_dir.to_path_buf(),
        ..TrainerConfig::default()
    };
    TrainingPipeline::new(config)?.run()
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
