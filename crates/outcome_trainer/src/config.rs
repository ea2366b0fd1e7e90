//! Trainer configuration
//!
//! Parameters can come from a TOML file; command-line flags are applied on top
//! by the binary.
//!
//! ```toml
//! input = "data/movie_metadata.csv"
//! output_dir = "artifacts"
//! metrics_table = "artifacts/metrics.csv"
//! test_ratio = 0.2
//! split_seed = 42
//!
//! [forest]
//! n_trees = 100
//! max_features = "sqrt"
//! class_weight = "balanced"
//! seed = 42
//! ```

use crate::errors::TrainerError;
use boxoffice_core::ForestParams;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Training run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Input CSV path
    pub input: PathBuf,
    /// Directory receiving the three artifacts
    pub output_dir: PathBuf,
    /// Optional per-film metrics table
    pub metrics_table: Option<PathBuf>,
    /// Fraction of rows held out for evaluation
    pub test_ratio: f64,
    /// Seed of the train/holdout shuffle
    pub split_seed: u64,
    /// Drop exact duplicate rows before imputation
    pub drop_duplicates: bool,
    /// Forest hyperparameters
    pub forest: ForestParams,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("movie_metadata.csv"),
            output_dir: PathBuf::from("artifacts"),
            metrics_table: None,
            test_ratio: 0.2,
            split_seed: 42,
            drop_duplicates: true,
            forest: ForestParams::default(),
        }
    }
}

impl TrainerConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, TrainerError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config: TrainerConfig = toml::from_str(&content).map_err(|e| {
            TrainerError::Config(format!("failed to parse {}: {e}", path.display()))
        })?;
        config.validate()?;

        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TrainerError> {
        if !(self.test_ratio > 0.0 && self.test_ratio < 1.0) {
            return Err(TrainerError::Config(format!(
                "test_ratio must be in (0, 1), got {}",
                self.test_ratio
            )));
        }
        self.forest.validate().map_err(TrainerError::Config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxoffice_core::{ClassWeight, MaxFeatures};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = TrainerConfig::default();
        assert_eq!(config.test_ratio, 0.2);
        assert_eq!(config.split_seed, 42);
        assert!(config.drop_duplicates);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file() -> anyhow::Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "input = \"movies.csv\"")?;
        writeln!(file, "split_seed = 7")?;
        writeln!(file, "[forest]")?;
        writeln!(file, "n_trees = 25")?;
        writeln!(file, "max_features = \"all\"")?;
        writeln!(file, "class_weight = \"none\"")?;
        file.flush()?;

        let config = TrainerConfig::load_from_file(file.path())?;
        assert_eq!(config.input, PathBuf::from("movies.csv"));
        assert_eq!(config.split_seed, 7);
        assert_eq!(config.test_ratio, 0.2);
        assert_eq!(config.forest.n_trees, 25);
        assert_eq!(config.forest.max_features, MaxFeatures::All);
        assert_eq!(config.forest.class_weight, ClassWeight::None);
        assert_eq!(config.forest.seed, 42);
        Ok(())
    }

    #[test]
    fn test_invalid_ratio() {
        for ratio in [0.0, 1.0, -0.5, f64::NAN] {
            let config = TrainerConfig {
                test_ratio: ratio,
                ..TrainerConfig::default()
            };
            assert!(matches!(config.validate(), Err(TrainerError::Config(_))));
        }
    }

    #[test]
    fn test_malformed_file() -> anyhow::Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "test_ratio = \"lots\"")?;
        file.flush()?;
        assert!(matches!(
            TrainerConfig::load_from_file(file.path()),
            Err(TrainerError::Config(_))
        ));
        Ok(())
    }
}
