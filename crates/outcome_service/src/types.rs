//! Request and response types

use boxoffice_core::Outcome;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Earliest accepted release year
pub const MIN_RELEASE_YEAR: i32 = 1900;
/// Latest accepted release year
pub const MAX_RELEASE_YEAR: i32 = 2030;
/// Upper bound of the quality score scale
pub const MAX_QUALITY_SCORE: f64 = 10.0;

/// A single film to classify
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRequest {
    /// Genre; a pipe-delimited list is reduced to its first entry
    pub genre: String,
    /// Production budget
    pub budget: f64,
    /// Release year
    pub release_year: i32,
    /// Total cast social-media popularity
    pub cast_popularity: i64,
    /// Quality score on a 0-10 scale, used only for the heuristic verdict
    pub quality_score: f64,
}

/// Model prediction plus the rule-based verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResponse {
    pub predicted_label: Outcome,
    pub class_probabilities: BTreeMap<Outcome, f64>,
    pub heuristic_verdict: Outcome,
}

/// Line-oriented reply of the batch mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchReply {
    Prediction(PredictionResponse),
    Rejected { error: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_camel_case() {
        let json = r#"{
            "genre": "Action|Adventure",
            "budget": 10000000,
            "releaseYear": 2016,
            "castPopularity": 5000,
            "qualityScore": 7.5
        }"#;
        let request: PredictionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.release_year, 2016);
        assert_eq!(request.cast_popularity, 5000);
        assert_eq!(request.budget, 10_000_000.0);
    }

    #[test]
    fn test_response_shape() {
        let response = PredictionResponse {
            predicted_label: Outcome::Hit,
            class_probabilities: Outcome::ALL.iter().map(|o| (*o, 1.0 / 3.0)).collect(),
            heuristic_verdict: Outcome::Average,
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["predictedLabel"], "Hit");
        assert_eq!(value["heuristicVerdict"], "Average");
        assert!(value["classProbabilities"]["Flop"].is_number());
    }

    #[test]
    fn test_rejected_reply() {
        let reply = BatchReply::Rejected {
            error: "Unknown genre".into(),
        };
        assert_eq!(
            serde_json::to_string(&reply).unwrap(),
            r#"{"error":"Unknown genre"}"#
        );
    }
}
