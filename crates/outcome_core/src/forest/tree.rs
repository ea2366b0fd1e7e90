//! Classification tree structures
//!
//! Trees are stored as a flat node array with node 0 as the root. Leaves
//! carry the weighted class distribution of the training samples that reached
//! them, normalized to sum to one.

use serde::{Deserialize, Serialize};

/// A decision tree node (internal or leaf)
///
/// For internal nodes:
/// - `feature_idx >= 0`: index into the feature vector
/// - `left` and `right` point to child node indices
/// - `leaf` is `None`
///
/// For leaf nodes:
/// - `feature_idx == -1`
/// - `leaf` holds one probability per class
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    /// Node ID (for reference, not used in traversal)
    pub id: i32,

    /// Left child index (-1 for leaf nodes)
    pub left: i32,

    /// Right child index (-1 for leaf nodes)
    pub right: i32,

    /// Feature index to split on (-1 for leaf nodes)
    pub feature_idx: i32,

    /// Samples with `x[feature_idx] <= threshold` go left
    pub threshold: f64,

    /// Class distribution (Some for leaf nodes)
    pub leaf: Option<Vec<f64>>,
}

impl Node {
    /// Create a new internal (split) node
    pub fn internal(id: i32, feature_idx: i32, threshold: f64, left: i32, right: i32) -> Self {
        Self {
            id,
            left,
            right,
            feature_idx,
            threshold,
            leaf: None,
        }
    }

    /// Create a new leaf node
    pub fn leaf(id: i32, distribution: Vec<f64>) -> Self {
        Self {
            id,
            left: -1,
            right: -1,
            feature_idx: -1,
            threshold: 0.0,
            leaf: Some(distribution),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.feature_idx == -1 || self.leaf.is_some()
    }
}

/// A single classification tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Class distribution of the leaf reached by `features`.
    ///
    /// Returns `None` for a malformed tree; `validate` rules that out for
    /// loaded models.
    pub fn evaluate(&self, features: &[f64]) -> Option<&[f64]> {
        let mut idx = 0usize;

        loop {
            let node = self.nodes.get(idx)?;

            if let Some(distribution) = &node.leaf {
                return Some(distribution);
            }

            let value = *features.get(usize::try_from(node.feature_idx).ok()?)?;
            let next = if value <= node.threshold {
                node.left
            } else {
                node.right
            };
            idx = usize::try_from(next).ok()?;
        }
    }

    /// Number of edges on the longest root-to-leaf path
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize, limit: usize) -> usize {
            match nodes.get(idx) {
                Some(node) if !node.is_leaf() && limit > 0 => {
                    let left = walk(nodes, node.left as usize, limit - 1);
                    let right = walk(nodes, node.right as usize, limit - 1);
                    1 + left.max(right)
                }
                _ => 0,
            }
        }
        walk(&self.nodes, 0, self.nodes.len())
    }

    /// Validate tree structure against the expected feature and class counts
    pub fn validate(&self, feature_count: usize, class_count: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("Tree has no nodes".to_string());
        }

        for (i, node) in self.nodes.iter().enumerate() {
            match &node.leaf {
                Some(distribution) => {
                    if distribution.len() != class_count {
                        return Err(format!(
                            "Leaf {i} has {} class weights, expected {class_count}",
                            distribution.len()
                        ));
                    }
                    if distribution.iter().any(|p| !p.is_finite() || *p < 0.0) {
                        return Err(format!("Leaf {i} has an invalid class weight"));
                    }
                }
                None => {
                    // Children are always appended after their parent
                    for child in [node.left, node.right] {
                        if child <= i as i32 || child as usize >= self.nodes.len() {
                            return Err(format!("Node {i} has invalid child: {child}"));
                        }
                    }
                    if node.feature_idx < 0 || node.feature_idx as usize >= feature_count {
                        return Err(format!(
                            "Internal node {i} has invalid feature index: {}",
                            node.feature_idx
                        ));
                    }
                    if !node.threshold.is_finite() {
                        return Err(format!("Internal node {i} has a non-finite threshold"));
                    }
                }
            }
        }

        Ok(())
    }
}
