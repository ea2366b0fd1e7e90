//! CART (Classification and Regression Tree) builder
//!
//! Grows a single classification tree with a weighted Gini criterion. Sample
//! weights carry both the class weighting and the bootstrap multiplicity, so
//! resampling never duplicates rows.

use boxoffice_core::forest::{Node, Tree};
use boxoffice_core::FEATURE_COUNT;

use crate::deterministic::LcgRng;
use crate::errors::TrainerError;

/// Training parameters for a single tree
#[derive(Clone, Debug)]
pub struct TreeConfig {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Candidate features drawn per split
    pub max_features: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: FEATURE_COUNT,
        }
    }
}

/// Best split found at a node
#[derive(Debug, Clone)]
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    /// Weighted impurity decrease
    gain: f64,
}

/// Builds one classification tree over a weighted sample
pub struct CartBuilder<'a> {
    config: TreeConfig,
    features: &'a [[f64; FEATURE_COUNT]],
    labels: &'a [usize],
    weights: &'a [f64],
    n_classes: usize,
    importances: [f64; FEATURE_COUNT],
}

impl<'a> CartBuilder<'a> {
    /// `labels[i]` is a class index below `n_classes`; rows with zero weight
    /// are left out of the tree.
    pub fn new(
        features: &'a [[f64; FEATURE_COUNT]],
        labels: &'a [usize],
        weights: &'a [f64],
        n_classes: usize,
        config: TreeConfig,
    ) -> Result<Self, TrainerError> {
        if features.len() != labels.len() || features.len() != weights.len() {
            return Err(TrainerError::data_quality(format!(
                "{} feature rows, {} labels and {} weights",
                features.len(),
                labels.len(),
                weights.len()
            )));
        }
        if let Some(&bad) = labels.iter().find(|&&l| l >= n_classes) {
            return Err(TrainerError::data_quality(format!(
                "class index {bad} out of range for {n_classes} classes"
            )));
        }

        Ok(Self {
            config,
            features,
            labels,
            weights,
            n_classes,
            importances: [0.0; FEATURE_COUNT],
        })
    }

    /// Build the tree; returns it with its unnormalized impurity decrease per feature
    pub fn build(mut self, rng: &mut LcgRng) -> (Tree, [f64; FEATURE_COUNT]) {
        let mut nodes = Vec::new();
        let indices: Vec<usize> = (0..self.features.len())
            .filter(|&i| self.weights[i] > 0.0)
            .collect();

        self.build_node(&indices, 0, &mut nodes, rng);

        (Tree::new(nodes), self.importances)
    }

    fn build_node(
        &mut self,
        indices: &[usize],
        depth: usize,
        nodes: &mut Vec<Node>,
        rng: &mut LcgRng,
    ) -> i32 {
        let current_idx = nodes.len() as i32;
        let totals = self.class_totals(indices);

        let depth_reached = self.config.max_depth.is_some_and(|max| depth >= max);
        let pure = totals.iter().filter(|&&w| w > 0.0).count() <= 1;

        if depth_reached || pure || indices.len() < self.config.min_samples_split {
            nodes.push(Node::leaf(current_idx, self.distribution(&totals)));
            return current_idx;
        }

        let split = match self.find_best_split(indices, &totals, rng) {
            Some(s) => s,
            None => {
                nodes.push(Node::leaf(current_idx, self.distribution(&totals)));
                return current_idx;
            }
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| self.features[i][split.feature_idx] <= split.threshold);

        self.importances[split.feature_idx] += split.gain;

        // Reserve space for current node
        nodes.push(Node::internal(
            current_idx,
            split.feature_idx as i32,
            split.threshold,
            -1,
            -1,
        ));

        let left_idx = self.build_node(&left_indices, depth + 1, nodes, rng);
        let right_idx = self.build_node(&right_indices, depth + 1, nodes, rng);

        let node = &mut nodes[current_idx as usize];
        node.left = left_idx;
        node.right = right_idx;

        current_idx
    }

    /// Search candidate features in random order. The first `max_features`
    /// are always examined; later ones only while no valid split was found.
    fn find_best_split(
        &self,
        indices: &[usize],
        totals: &[f64],
        rng: &mut LcgRng,
    ) -> Option<SplitCandidate> {
        let parent_impurity = weighted_gini(totals);
        let order = rng.permutation(FEATURE_COUNT);
        let mut best: Option<SplitCandidate> = None;

        for (visited, &feature_idx) in order.iter().enumerate() {
            if visited >= self.config.max_features && best.is_some() {
                break;
            }

            if let Some(candidate) = self.best_split_on(indices, feature_idx, parent_impurity) {
                if best.as_ref().map_or(true, |b| candidate.gain > b.gain) {
                    best = Some(candidate);
                }
            }
        }

        best
    }

    /// Exact-greedy scan over the sorted values of one feature
    fn best_split_on(
        &self,
        indices: &[usize],
        feature_idx: usize,
        parent_impurity: f64,
    ) -> Option<SplitCandidate> {
        let mut sorted = indices.to_vec();
        sorted.sort_by(|&a, &b| {
            self.features[a][feature_idx].total_cmp(&self.features[b][feature_idx])
        });

        let min_leaf = self.config.min_samples_leaf;
        let mut left = vec![0.0; self.n_classes];
        let mut right = self.class_totals(&sorted);
        let mut best: Option<SplitCandidate> = None;

        for pos in 0..sorted.len().saturating_sub(1) {
            let idx = sorted[pos];
            let w = self.weights[idx];
            left[self.labels[idx]] += w;
            right[self.labels[idx]] -= w;

            let here = self.features[idx][feature_idx];
            let next = self.features[sorted[pos + 1]][feature_idx];
            if here >= next {
                continue;
            }

            let n_left = pos + 1;
            if n_left < min_leaf || sorted.len() - n_left < min_leaf {
                continue;
            }

            let gain = parent_impurity - weighted_gini(&left) - weighted_gini(&right);
            if best.as_ref().map_or(true, |b| gain > b.gain) {
                let mut threshold = here + (next - here) / 2.0;
                if threshold >= next {
                    threshold = here;
                }
                best = Some(SplitCandidate {
                    feature_idx,
                    threshold,
                    gain,
                });
            }
        }

        best
    }

    fn class_totals(&self, indices: &[usize]) -> Vec<f64> {
        let mut totals = vec![0.0; self.n_classes];
        for &i in indices {
            totals[self.labels[i]] += self.weights[i];
        }
        totals
    }

    fn distribution(&self, totals: &[f64]) -> Vec<f64> {
        let sum: f64 = totals.iter().sum();
        if sum > 0.0 {
            totals.iter().map(|w| w / sum).collect()
        } else {
            vec![1.0 / self.n_classes as f64; self.n_classes]
        }
    }
}

/// Gini impurity scaled by node weight: `W - Σ w_c² / W`
fn weighted_gini(totals: &[f64]) -> f64 {
    let sum: f64 = totals.iter().sum();
    if sum <= 0.0 {
        return 0.0;
    }
    let squares: f64 = totals.iter().map(|w| w * w).sum();
    sum - squares / sum
}
