//! Slope-based curve similarity
//!
//! Curves are compared through their discrete slopes, so a constant vertical
//! offset between two otherwise identical curves costs nothing.

use serde::{Deserialize, Serialize};
use terroir_core::{Error, Result};

use super::numeric::gradient;

/// Parameters for similarity scoring
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityParams {
    /// Decay rate of the score with distance; larger is stricter
    pub sensitivity: f64,
}

impl Default for SimilarityParams {
    fn default() -> Self {
        Self { sensitivity: 10.0 }
    }
}

/// Similarity of two curves
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Similarity {
    /// Score in (0, 100]; 100 means identical slopes
    pub score: f64,
    /// Mean absolute slope difference, >= 0
    pub distance: f64,
}

/// Mean absolute difference between the slopes of `a` and `b`.
pub fn slope_distance(a: &[f64], b: &[f64]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(Error::LengthMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    if a.len() < 2 {
        return Err(Error::InsufficientData {
            valid: a.len(),
            required: 2,
        });
    }

    let total: f64 = gradient(a)
        .iter()
        .zip(gradient(b))
        .map(|(sa, sb)| (sa - sb).abs())
        .sum();
    Ok(total / a.len() as f64)
}

/// Map a distance onto `100 * exp(-sensitivity * distance)`.
///
/// The result stays in (0, 100] under floating point: it never underflows
/// to zero, and only a zero distance reaches exactly 100.
pub fn score_from_distance(distance: f64, params: &SimilarityParams) -> f64 {
    let score = (100.0 * (-params.sensitivity * distance).exp()).max(f64::MIN_POSITIVE);
    if distance > 0.0 && score >= 100.0 {
        f64::from_bits(100.0_f64.to_bits() - 1)
    } else {
        score
    }
}

/// Score the similarity of two equal-length curves.
pub fn similarity(a: &[f64], b: &[f64], params: &SimilarityParams) -> Result<Similarity> {
    if !(params.sensitivity.is_finite() && params.sensitivity > 0.0) {
        return Err(Error::InvalidParameter {
            name: "sensitivity",
            value: params.sensitivity.to_string(),
            reason: "sensitivity must be positive and finite".into(),
        });
    }
    let distance = slope_distance(a, b)?;
    Ok(Similarity {
        score: score_from_distance(distance, params),
        distance,
    })
}
