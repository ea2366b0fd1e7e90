//! Standardization of the feature vector
//!
//! Statistics are captured once over the training matrix and reused verbatim
//! at inference. A column whose training standard deviation is zero carries
//! no information; it is emitted as `0.0` rather than divided by zero.

use crate::errors::{PipelineError, Result};
use crate::FEATURE_COUNT;
use serde::{Deserialize, Serialize};

/// Per-feature mean and population standard deviation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub means: [f64; FEATURE_COUNT],
    pub std_devs: [f64; FEATURE_COUNT],
}

impl StandardScaler {
    /// Fit statistics over the training matrix
    pub fn fit(rows: &[[f64; FEATURE_COUNT]]) -> Result<Self> {
        if rows.is_empty() {
            return Err(PipelineError::DataQuality(
                "cannot fit scaler on an empty feature matrix".into(),
            ));
        }

        let n = rows.len() as f64;
        let mut means = [0.0; FEATURE_COUNT];
        for row in rows {
            for (mean, &value) in means.iter_mut().zip(row.iter()) {
                *mean += value;
            }
        }
        for mean in &mut means {
            *mean /= n;
        }

        let mut std_devs = [0.0; FEATURE_COUNT];
        for row in rows {
            for i in 0..FEATURE_COUNT {
                let diff = row[i] - means[i];
                std_devs[i] += diff * diff;
            }
        }
        for sd in &mut std_devs {
            *sd = (*sd / n).sqrt();
        }

        Ok(Self { means, std_devs })
    }

    /// Standardize a single vector
    pub fn transform(&self, row: &[f64; FEATURE_COUNT]) -> [f64; FEATURE_COUNT] {
        let mut out = [0.0; FEATURE_COUNT];
        for i in 0..FEATURE_COUNT {
            out[i] = if self.std_devs[i] == 0.0 {
                0.0
            } else {
                (row[i] - self.means[i]) / self.std_devs[i]
            };
        }
        out
    }

    pub fn transform_all(&self, rows: &[[f64; FEATURE_COUNT]]) -> Vec<[f64; FEATURE_COUNT]> {
        rows.iter().map(|row| self.transform(row)).collect()
    }

    /// Structural check applied after loading
    pub fn validate(&self) -> std::result::Result<(), String> {
        for i in 0..FEATURE_COUNT {
            if !self.means[i].is_finite() {
                return Err(format!("mean of feature {i} is not finite"));
            }
            if !self.std_devs[i].is_finite() || self.std_devs[i] < 0.0 {
                return Err(format!("invalid std dev for feature {i}: {}", self.std_devs[i]));
            }
        }
        Ok(())
    }
}
