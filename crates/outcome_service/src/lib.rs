//! Box-office outcome prediction service
//!
//! Loads a trained artifact bundle once per process and classifies single
//! films through the shared encode → scale → predict path.

pub mod cache;
pub mod config;
pub mod errors;
pub mod service;
pub mod types;

use std::io::{BufRead, Write};

pub use cache::ArtifactCache;
pub use config::ServiceConfig;
pub use errors::ServiceError;
pub use service::{validate_request, PredictionService};
pub use types::{BatchReply, PredictionRequest, PredictionResponse};

/// Answer one JSON request per input line with one JSON reply per output line.
///
/// Malformed or rejected requests produce an `{"error": ...}` line and the
/// loop continues. Returns the number of requests answered successfully.
pub fn serve_lines<R: BufRead, W: Write>(
    service: &PredictionService,
    input: R,
    mut output: W,
) -> Result<usize, ServiceError> {
    let mut answered = 0;

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let reply = match serde_json::from_str::<PredictionRequest>(&line) {
            Ok(request) => match service.predict(&request) {
                Ok(response) => {
                    answered += 1;
                    BatchReply::Prediction(response)
                }
                Err(e) if e.is_request_error() => BatchReply::Rejected {
                    error: e.to_string(),
                },
                Err(e) => return Err(e.into()),
            },
            Err(e) => BatchReply::Rejected {
                error: format!("malformed request: {e}"),
            },
        };

        let encoded = serde_json::to_string(&reply)
            .map_err(|e| ServiceError::Pipeline(e.into()))?;
        writeln!(output, "{encoded}")?;
    }

    output.flush()?;
    Ok(answered)
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
