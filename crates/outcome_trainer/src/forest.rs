//! Bagged forest trainer
//!
//! Every tree sees its own bootstrap resample and its own feature draws; the
//! per-tree RNG stream is derived from the forest seed and the tree index, so
//! a forest is reproducible tree by tree.

use boxoffice_core::forest::{ClassWeight, ForestModel, ForestParams};
use boxoffice_core::{Outcome, FEATURE_COUNT};
use tracing::{debug, info};

use crate::cart::{CartBuilder, TreeConfig};
use crate::deterministic::{mix_seed, LcgRng};
use crate::errors::TrainerError;

/// Forest trainer
pub struct ForestTrainer {
    params: ForestParams,
}

impl ForestTrainer {
    pub fn new(params: ForestParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    /// Per-class weights aligned with [`Outcome::ALL`]
    pub fn class_weights(&self, labels: &[usize]) -> [f64; 3] {
        match self.params.class_weight {
            ClassWeight::None => [1.0; 3],
            ClassWeight::Balanced => balanced_weights(labels),
        }
    }

    /// Train a forest on scaled features
    pub fn fit(
        &self,
        features: &[[f64; FEATURE_COUNT]],
        labels: &[Outcome],
    ) -> Result<ForestModel, TrainerError> {
        self.params.validate().map_err(TrainerError::Config)?;

        if features.is_empty() {
            return Err(TrainerError::data_quality("cannot train on an empty partition"));
        }
        if features.len() != labels.len() {
            return Err(TrainerError::data_quality(format!(
                "{} feature rows but {} labels",
                features.len(),
                labels.len()
            )));
        }

        let classes = Outcome::ALL;
        let label_idx: Vec<usize> = labels
            .iter()
            .map(|l| classes.iter().position(|c| c == l).unwrap_or_default())
            .collect();

        let class_weights = self.class_weights(&label_idx);
        info!(
            "Class weights ({:?}): Flop={:.4}, Average={:.4}, Hit={:.4}",
            self.params.class_weight, class_weights[0], class_weights[1], class_weights[2]
        );

        let tree_config = TreeConfig {
            max_depth: self.params.max_depth,
            min_samples_split: self.params.min_samples_split,
            min_samples_leaf: self.params.min_samples_leaf,
            max_features: self.params.max_features.resolve(FEATURE_COUNT),
        };

        let n = features.len();
        let mut trees = Vec::with_capacity(self.params.n_trees);
        let mut importances = [0.0; FEATURE_COUNT];

        for tree_idx in 0..self.params.n_trees {
            let mut rng = LcgRng::new(mix_seed(self.params.seed, tree_idx as u64 + 1));

            let mut counts = vec![0u32; n];
            if self.params.bootstrap {
                for _ in 0..n {
                    counts[rng.next_range(n)] += 1;
                }
            } else {
                counts.fill(1);
            }

            let weights: Vec<f64> = counts
                .iter()
                .zip(&label_idx)
                .map(|(&c, &l)| c as f64 * class_weights[l])
                .collect();

            let builder =
                CartBuilder::new(features, &label_idx, &weights, classes.len(), tree_config.clone())?;
            let (tree, tree_importances) = builder.build(&mut rng);

            debug!(
                "Tree {}/{}: {} nodes, depth {}",
                tree_idx + 1,
                self.params.n_trees,
                tree.nodes.len(),
                tree.depth()
            );

            let total: f64 = tree_importances.iter().sum();
            if total > 0.0 {
                for (acc, v) in importances.iter_mut().zip(tree_importances) {
                    *acc += v / total;
                }
            }
            trees.push(tree);
        }

        let mut model = ForestModel::new(trees, self.params.clone());
        model.feature_importances = normalize(importances);
        Ok(model)
    }
}

/// `n / (k * count_c)` for each present class, 0 for absent ones
pub fn balanced_weights(labels: &[usize]) -> [f64; 3] {
    let mut counts = [0usize; 3];
    for &l in labels {
        counts[l] += 1;
    }
    let present = counts.iter().filter(|&&c| c > 0).count();
    let n = labels.len() as f64;

    let mut weights = [0.0; 3];
    for (w, &c) in weights.iter_mut().zip(&counts) {
        if c > 0 {
            *w = n / (present as f64 * c as f64);
        }
    }
    weights
}

fn normalize(values: [f64; FEATURE_COUNT]) -> [f64; FEATURE_COUNT] {
    let total: f64 = values.iter().sum();
    if total <= 0.0 {
        return values;
    }
    values.map(|v| v / total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxoffice_core::forest::MaxFeatures;

    fn create_simple_dataset() -> (Vec<[f64; FEATURE_COUNT]>, Vec<Outcome>) {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..30 {
            let budget = i as f64 / 10.0 - 1.5;
            features.push([0.0, (i % 3) as f64, budget, 0.0]);
            labels.push(if budget < -0.5 {
                Outcome::Flop
            } else if budget < 0.5 {
                Outcome::Average
            } else {
                Outcome::Hit
            });
        }
        (features, labels)
    }

    fn small_params() -> ForestParams {
        ForestParams {
            n_trees: 5,
            max_features: MaxFeatures::All,
            seed: 7,
            ..ForestParams::default()
        }
    }

    #[test]
    fn test_balanced_weights() {
        // 1 flop, 3 average, 0 hits
        let w = balanced_weights(&[0, 1, 1, 1]);
        assert!((w[0] - 2.0).abs() < 1e-12);
        assert!((w[1] - 4.0 / 6.0).abs() < 1e-12);
        assert_eq!(w[2], 0.0);
    }

    #[test]
    fn test_class_weight_none() {
        let trainer = ForestTrainer::new(ForestParams {
            class_weight: ClassWeight::None,
            ..ForestParams::default()
        });
        assert_eq!(trainer.class_weights(&[0, 1, 1, 1]), [1.0; 3]);
    }

    #[test]
    fn test_train_simple_forest() -> anyhow::Result<()> {
        let (features, labels) = create_simple_dataset();
        let model = ForestTrainer::new(small_params()).fit(&features, &labels)?;

        assert_eq!(model.num_trees(), 5);
        assert!(model.validate().is_ok());
        assert!(model.accuracy(&features, &labels) >= 0.9);
        assert_eq!(model.predict(&[0.0, 0.0, -1.4, 0.0]), Outcome::Flop);
        assert_eq!(model.predict(&[0.0, 0.0, 1.3, 0.0]), Outcome::Hit);

        let total: f64 = model.feature_importances.iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!(model.feature_importances[2] > model.feature_importances[1]);
        Ok(())
    }

    #[test]
    fn test_determinism() -> anyhow::Result<()> {
        let (features, labels) = create_simple_dataset();
        let model1 = ForestTrainer::new(small_params()).fit(&features, &labels)?;
        let model2 = ForestTrainer::new(small_params()).fit(&features, &labels)?;
        assert_eq!(model1, model2);

        let other = ForestTrainer::new(ForestParams {
            seed: 8,
            ..small_params()
        })
        .fit(&features, &labels)?;
        assert_ne!(model1.trees, other.trees);
        Ok(())
    }

    #[test]
    fn test_no_bootstrap_single_tree_fits_training_set() -> anyhow::Result<()> {
        let (features, labels) = create_simple_dataset();
        let params = ForestParams {
            n_trees: 1,
            bootstrap: false,
            ..small_params()
        };
        let model = ForestTrainer::new(params).fit(&features, &labels)?;
        assert_eq!(model.accuracy(&features, &labels), 1.0);
        Ok(())
    }

    #[test]
    fn test_rejects_bad_input() {
        let trainer = ForestTrainer::new(small_params());
        assert!(trainer.fit(&[], &[]).is_err());
        assert!(trainer
            .fit(&[[0.0; FEATURE_COUNT]], &[Outcome::Hit, Outcome::Flop])
            .is_err());

        let bad = ForestTrainer::new(ForestParams {
            n_trees: 0,
            ..ForestParams::default()
        });
        assert!(matches!(
            bad.fit(&[[0.0; FEATURE_COUNT]], &[Outcome::Hit]),
            Err(TrainerError::Config(_))
        ));
    }
}
