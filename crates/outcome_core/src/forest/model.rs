//! Fitted forest with probability-averaging inference
//!
//! The class order stored in the model indexes every leaf distribution and
//! every probability vector produced at inference.

use super::params::{ClassWeight, ForestParams};
use super::tree::Tree;
use crate::outcome::Outcome;
use crate::FEATURE_COUNT;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Current forest format version
pub const FOREST_FORMAT_VERSION: u32 = 1;

/// Bagged ensemble of classification trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestModel {
    /// Model format version
    pub version: u32,

    /// Class order used by leaf distributions
    pub classes: Vec<Outcome>,

    /// Trees in the ensemble
    pub trees: Vec<Tree>,

    /// Weighting policy the trees were grown with
    pub class_weight: ClassWeight,

    /// Parameters the ensemble was trained with
    pub params: ForestParams,

    /// Normalized impurity decrease per feature
    pub feature_importances: [f64; FEATURE_COUNT],

    /// Fraction of exact matches on the holdout partition
    pub holdout_accuracy: Option<f64>,
}

impl ForestModel {
    pub fn new(trees: Vec<Tree>, params: ForestParams) -> Self {
        Self {
            version: FOREST_FORMAT_VERSION,
            classes: Outcome::ALL.to_vec(),
            trees,
            class_weight: params.class_weight,
            params,
            feature_importances: [0.0; FEATURE_COUNT],
            holdout_accuracy: None,
        }
    }

    /// Validate model structure
    pub fn validate(&self) -> Result<(), String> {
        if self.version != FOREST_FORMAT_VERSION {
            return Err(format!("Unsupported forest version: {}", self.version));
        }

        let mut seen = self.classes.clone();
        seen.sort();
        seen.dedup();
        if self.classes.len() != Outcome::ALL.len() || seen.len() != self.classes.len() {
            return Err(format!("Invalid class order: {:?}", self.classes));
        }

        if self.trees.is_empty() {
            return Err("Forest has no trees".to_string());
        }

        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(FEATURE_COUNT, self.classes.len())
                .map_err(|e| format!("Tree {i} validation failed: {e}"))?;
        }

        Ok(())
    }

    /// Averaged class distribution aligned with `classes`
    pub fn predict_proba_vec(&self, features: &[f64; FEATURE_COUNT]) -> Vec<f64> {
        let k = self.classes.len();
        let mut sum = vec![0.0; k];

        for tree in &self.trees {
            if let Some(distribution) = tree.evaluate(features) {
                for (acc, p) in sum.iter_mut().zip(distribution) {
                    *acc += p;
                }
            }
        }

        let total: f64 = sum.iter().sum();
        if total > 0.0 {
            for p in &mut sum {
                *p /= total;
            }
        } else {
            sum.fill(1.0 / k as f64);
        }
        sum
    }

    /// Probability of each outcome; entries sum to one
    pub fn predict_proba(&self, features: &[f64; FEATURE_COUNT]) -> BTreeMap<Outcome, f64> {
        self.classes
            .iter()
            .copied()
            .zip(self.predict_proba_vec(features))
            .collect()
    }

    /// Most probable outcome, ties resolved by class order
    pub fn predict(&self, features: &[f64; FEATURE_COUNT]) -> Outcome {
        let proba = self.predict_proba_vec(features);
        let mut best = 0;
        for (i, &p) in proba.iter().enumerate().skip(1) {
            if p > proba[best] {
                best = i;
            }
        }
        self.classes[best]
    }

    /// Fraction of rows whose prediction matches the label
    pub fn accuracy(&self, rows: &[[f64; FEATURE_COUNT]], labels: &[Outcome]) -> f64 {
        if rows.is_empty() {
            return 0.0;
        }
        let correct = rows
            .iter()
            .zip(labels)
            .filter(|(row, label)| self.predict(row) == **label)
            .count();
        correct as f64 / rows.len() as f64
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }
}
