//! Box-office outcome model core
//!
//! Shared pieces of the training pipeline and the prediction service. Both
//! sides go through the same encode → scale → predict path defined here.
//!
//! Modules:
//! - `outcome`: Financial outcome labels, label derivation and heuristic verdict
//! - `encoder`: First-seen-order genre label encoder
//! - `scaler`: Standard scaler with frozen statistics
//! - `forest`: Tree ensemble structures and probability-averaging inference
//! - `artifact`: Versioned, hash-checked artifact persistence
//! - `serde_canon`: Canonical JSON for hashing
//! - `errors`: Pipeline error taxonomy

pub mod artifact;
pub mod encoder;
pub mod errors;
pub mod forest;
pub mod outcome;
pub mod scaler;
pub mod serde_canon;

pub use artifact::{ArtifactKind, ModelArtifacts, SavedBundle, ARTIFACT_FORMAT_VERSION};
pub use encoder::{main_genre, GenreEncoder};
pub use errors::{PipelineError, Result};
pub use forest::{ClassWeight, ForestModel, ForestParams, MaxFeatures, Node, Tree};
pub use outcome::{derive_label, heuristic_verdict, roi, Outcome};
pub use scaler::StandardScaler;

/// Number of model features
pub const FEATURE_COUNT: usize = 4;

/// Feature order shared by the encoder, scaler and classifier
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] =
    ["main_genre", "cast_total_facebook_likes", "budget", "title_year"];

/// Assemble the unscaled feature vector in model order
pub fn feature_vector(
    genre_code: u32,
    cast_popularity: f64,
    budget: f64,
    release_year: f64,
) -> [f64; FEATURE_COUNT] {
    [genre_code as f64, cast_popularity, budget, release_year]
}

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_vector_order() {
        let v = feature_vector(3, 5000.0, 10_000_000.0, 2016.0);
        assert_eq!(v, [3.0, 5000.0, 10_000_000.0, 2016.0]);
        assert_eq!(FEATURE_NAMES[2], "budget");
    }
}
