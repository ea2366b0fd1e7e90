//! Bagging strategy for the forest
//!
//! Training reads these parameters; the fitted model keeps a copy so that an
//! artifact records how it was produced.

use serde::{Deserialize, Serialize};

/// Per-class sample weighting applied inside the split criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClassWeight {
    /// `n_samples / (n_classes * class_count)` over the training partition
    #[default]
    Balanced,
    /// Every sample weighs 1
    None,
}

/// Number of candidate features drawn at each split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MaxFeatures {
    /// `floor(sqrt(n_features))`, at least 1
    #[default]
    Sqrt,
    /// All features at every split
    All,
    /// A fixed count, clamped to `1..=n_features`
    Count(usize),
}

impl MaxFeatures {
    pub fn resolve(&self, feature_count: usize) -> usize {
        let n = match *self {
            MaxFeatures::Sqrt => (feature_count as f64).sqrt().floor() as usize,
            MaxFeatures::All => feature_count,
            MaxFeatures::Count(n) => n,
        };
        n.clamp(1, feature_count.max(1))
    }
}

/// Forest training parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestParams {
    /// Number of trees in the ensemble
    pub n_trees: usize,
    /// Maximum tree depth, unlimited when `None`
    pub max_depth: Option<usize>,
    /// Minimum samples required to split a node
    pub min_samples_split: usize,
    /// Minimum samples per leaf
    pub min_samples_leaf: usize,
    /// Features considered per split
    pub max_features: MaxFeatures,
    /// Draw a bootstrap resample for each tree
    pub bootstrap: bool,
    /// Class-imbalance correction
    pub class_weight: ClassWeight,
    /// Seed for bootstrap draws and feature subsampling
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            class_weight: ClassWeight::Balanced,
            seed: 42,
        }
    }
}

impl ForestParams {
    pub fn validate(&self) -> Result<(), String> {
        if self.n_trees == 0 {
            return Err("n_trees must be at least 1".to_string());
        }
        if self.min_samples_split < 2 {
            return Err("min_samples_split must be at least 2".to_string());
        }
        if self.min_samples_leaf == 0 {
            return Err("min_samples_leaf must be at least 1".to_string());
        }
        if let MaxFeatures::Count(0) = self.max_features {
            return Err("max_features count must be at least 1".to_string());
        }
        Ok(())
    }
}
