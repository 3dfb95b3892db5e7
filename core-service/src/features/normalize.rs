//! Min-max normalization
//!
//! Parameters come from the model artifact (training-time calibration) so the
//! detector sees inputs scaled the way it was trained. The defaults are fixed
//! protocol bounds used when an artifact carries none.

use serde::{Deserialize, Serialize};

use super::layout::FEATURE_COUNT;
use crate::error::ModelError;

const MAX_FRAME_LEN: f32 = 65535.0;
const MAX_RELATIVE_TIME: f32 = 3600.0;
const MAX_INTER_ARRIVAL: f32 = 60.0;
const MAX_PORT: f32 = 65535.0;

/// Per-feature min/max
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationParams {
    pub min_vals: Vec<f32>,
    pub max_vals: Vec<f32>,
}

impl Default for NormalizationParams {
    fn default() -> Self {
        let mut max_vals = vec![1.0; FEATURE_COUNT];
        max_vals[0] = MAX_FRAME_LEN;
        max_vals[1] = MAX_RELATIVE_TIME;
        max_vals[2] = MAX_INTER_ARRIVAL;
        max_vals[9] = MAX_PORT;
        max_vals[10] = MAX_PORT;

        Self {
            min_vals: vec![0.0; FEATURE_COUNT],
            max_vals,
        }
    }
}

impl NormalizationParams {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.min_vals.len() != FEATURE_COUNT || self.max_vals.len() != FEATURE_COUNT {
            return Err(ModelError::DimensionMismatch {
                expected: self.min_vals.len().min(self.max_vals.len()),
                actual: FEATURE_COUNT,
            });
        }
        if self.min_vals.iter().chain(&self.max_vals).any(|v| !v.is_finite()) {
            return Err(ModelError::Weights("normalization bounds must be finite".into()));
        }
        Ok(())
    }

    /// Scale one raw vector into [0, 1] in place
    pub fn apply(&self, features: &mut [f32; FEATURE_COUNT]) {
        for (i, value) in features.iter_mut().enumerate() {
            let min_val = self.min_vals.get(i).copied().unwrap_or(0.0);
            let max_val = self.max_vals.get(i).copied().unwrap_or(1.0);
            let range = (max_val - min_val).max(1e-8);

            *value = ((*value - min_val) / range).clamp(0.0, 1.0);
        }
    }
}
