//! Prediction service
//!
//! Every request runs the same encode → scale → predict path as training,
//! reading the shared artifacts without locking. Request errors stay local to
//! the request that caused them.

use crate::cache::ArtifactCache;
use crate::types::{
    PredictionRequest, PredictionResponse, MAX_QUALITY_SCORE, MAX_RELEASE_YEAR, MIN_RELEASE_YEAR,
};
use boxoffice_core::{heuristic_verdict, ModelArtifacts, PipelineError, Result};
use std::sync::Arc;
use tracing::debug;

/// Stateless request handler over a shared artifact cache
#[derive(Debug, Clone)]
pub struct PredictionService {
    cache: Arc<ArtifactCache>,
}

impl PredictionService {
    pub fn new(cache: Arc<ArtifactCache>) -> Self {
        Self { cache }
    }

    /// Service that refuses to start without a valid bundle
    pub fn start(cache: Arc<ArtifactCache>) -> Result<Self> {
        cache.get()?;
        Ok(Self::new(cache))
    }

    pub fn cache(&self) -> &ArtifactCache {
        &self.cache
    }

    fn artifacts(&self) -> Result<Arc<ModelArtifacts>> {
        self.cache.get()
    }

    /// Classify one film
    pub fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse> {
        validate_request(request)?;
        let artifacts = self.artifacts()?;

        let row = artifacts.prepare(
            &request.genre,
            request.cast_popularity as f64,
            request.budget,
            f64::from(request.release_year),
        )?;

        let predicted_label = artifacts.classifier.predict(&row);
        let class_probabilities = artifacts.classifier.predict_proba(&row);
        let verdict = heuristic_verdict(request.quality_score);

        debug!(
            "Predicted {} for genre '{}' (heuristic {})",
            predicted_label, request.genre, verdict
        );

        Ok(PredictionResponse {
            predicted_label,
            class_probabilities,
            heuristic_verdict: verdict,
        })
    }

    /// Genre vocabulary in code order
    pub fn genres(&self) -> Result<Vec<String>> {
        Ok(self.artifacts()?.encoder.classes().to_vec())
    }
}

/// Reject requests outside the accepted input ranges
pub fn validate_request(request: &PredictionRequest) -> Result<()> {
    if request.genre.trim().is_empty() {
        return Err(PipelineError::InvalidRequest("genre must not be empty".into()));
    }
    if !request.budget.is_finite() || request.budget < 0.0 {
        return Err(PipelineError::InvalidRequest(format!(
            "budget must be a non-negative number, got {}",
            request.budget
        )));
    }
    if request.cast_popularity < 0 {
        return Err(PipelineError::InvalidRequest(format!(
            "castPopularity must be non-negative, got {}",
            request.cast_popularity
        )));
    }
    if !(0.0..=MAX_QUALITY_SCORE).contains(&request.quality_score) {
        return Err(PipelineError::InvalidRequest(format!(
            "qualityScore must be in [0, {}], got {}",
            MAX_QUALITY_SCORE, request.quality_score
        )));
    }
    if !(MIN_RELEASE_YEAR..=MAX_RELEASE_YEAR).contains(&request.release_year) {
        return Err(PipelineError::InvalidRequest(format!(
            "releaseYear must be in [{}, {}], got {}",
            MIN_RELEASE_YEAR, MAX_RELEASE_YEAR, request.release_year
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> PredictionRequest {
        PredictionRequest {
            genre: "Action".into(),
            budget: 10_000_000.0,
            release_year: 2016,
            cast_popularity: 5000,
            quality_score: 7.0,
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(validate_request(&request()).is_ok());
        assert!(validate_request(&PredictionRequest {
            budget: 0.0,
            quality_score: 0.0,
            release_year: 1900,
            ..request()
        })
        .is_ok());
    }

    #[test]
    fn test_out_of_range_requests() {
        let bad = [
            PredictionRequest { budget: -1.0, ..request() },
            PredictionRequest { budget: f64::NAN, ..request() },
            PredictionRequest { cast_popularity: -5, ..request() },
            PredictionRequest { quality_score: 10.5, ..request() },
            PredictionRequest { quality_score: -0.1, ..request() },
            PredictionRequest { release_year: 1899, ..request() },
            PredictionRequest { release_year: 2031, ..request() },
            PredictionRequest { genre: "  ".into(), ..request() },
        ];
        for req in &bad {
            match validate_request(req) {
                Err(e @ PipelineError::InvalidRequest(_)) => assert!(e.is_request_error()),
                other => panic!("expected InvalidRequest for {req:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_start_refuses_without_bundle() {
        let dir = tempfile::TempDir::new().unwrap();
        let cache = Arc::new(ArtifactCache::new(dir.path()));
        assert!(matches!(
            PredictionService::start(cache),
            Err(PipelineError::ArtifactMissing { .. })
        ));
    }

    #[test]
    fn test_invalid_request_skips_loading() {
        let dir = tempfile::TempDir::new().unwrap();
        let cache = Arc::new(ArtifactCache::new(dir.path()));
        let service = PredictionService::new(cache);

        let result = service.predict(&PredictionRequest {
            budget: -1.0,
            ..request()
        });
        assert!(matches!(result, Err(PipelineError::InvalidRequest(_))));
        assert_eq!(service.cache().load_count(), 0);
    }
}
