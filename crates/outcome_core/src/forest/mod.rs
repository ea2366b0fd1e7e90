//! Bagged decision-tree classifier
//!
//! Inference side of the ensemble: tree structures, the fitted forest and the
//! parameters it was trained with. Tree growing lives in the trainer crate.
//!
//! # Model Format
//!
//! ```json
//! {
//!   "version": 1,
//!   "classes": ["Flop", "Average", "Hit"],
//!   "class_weight": "balanced",
//!   "trees": [
//!     {
//!       "nodes": [
//!         {"id":0,"left":1,"right":2,"feature_idx":2,"threshold":-0.41,"leaf":null},
//!         {"id":1,"left":-1,"right":-1,"feature_idx":-1,"threshold":0.0,"leaf":[0.7,0.3,0.0]},
//!         {"id":2,"left":-1,"right":-1,"feature_idx":-1,"threshold":0.0,"leaf":[0.1,0.2,0.7]}
//!       ]
//!     }
//!   ],
//!   "feature_importances": [0.1, 0.3, 0.45, 0.15],
//!   "holdout_accuracy": 0.62,
//!   "params": { "n_trees": 100, "seed": 42, "...": "..." }
//! }
//! ```

pub mod model;
pub mod params;
pub mod tree;

pub use model::{ForestModel, FOREST_FORMAT_VERSION};
pub use params::{ClassWeight, ForestParams, MaxFeatures};
pub use tree::{Node, Tree};
