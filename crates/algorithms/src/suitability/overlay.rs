//! Weighted linear combination of criterion scores

use terroir_core::{Error, Raster, Result};

use crate::maybe_rayon::*;

/// Tolerance on the sum of weights
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// A criterion score raster and its AHP weight
#[derive(Debug, Clone, Copy)]
pub struct WeightedLayer<'a> {
    pub name: &'static str,
    pub scores: &'a Raster<f64>,
    pub weight: f64,
}

impl<'a> WeightedLayer<'a> {
    pub fn new(name: &'static str, scores: &'a Raster<f64>, weight: f64) -> Self {
        Self {
            name,
            scores,
            weight,
        }
    }
}

/// Σ wᵢ · scoreᵢ per cell.
///
/// Weights must be non-negative and sum to 1; all layers must share a shape.
/// A cell that is no-data in any layer is NaN.
pub fn weighted_overlay(layers: &[WeightedLayer<'_>]) -> Result<Raster<f64>> {
    let first = layers.first().ok_or_else(|| Error::InvalidParameter {
        name: "layers",
        value: "0".into(),
        reason: "at least one layer is required".into(),
    })?;

    for layer in layers {
        if !(layer.weight >= 0.0 && layer.weight.is_finite()) {
            return Err(Error::InvalidParameter {
                name: "weight",
                value: format!("{}={}", layer.name, layer.weight),
                reason: "weights must be non-negative".into(),
            });
        }
        first.scores.ensure_same_shape(layer.scores)?;
    }

    let total: f64 = layers.iter().map(|l| l.weight).sum();
    if (total - 1.0).abs() > WEIGHT_TOLERANCE {
        return Err(Error::InvalidParameter {
            name: "weights",
            value: total.to_string(),
            reason: "weights must sum to 1".into(),
        });
    }

    let (rows, cols) = first.scores.shape();
    let views: Vec<_> = layers.iter().map(|l| (l.scores.view(), l.weight)).collect();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for (col, cell) in row_data.iter_mut().enumerate() {
                let mut sum = 0.0;
                let mut valid = true;
                for (view, weight) in &views {
                    let score = view[[row, col]];
                    if score.is_nan() {
                        valid = false;
                        break;
                    }
                    sum += weight * score;
                }
                if valid {
                    *cell = sum;
                }
            }
            row_data
        })
        .collect();

    first.scores.derive(data, Some(f64::NAN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_weighted_sum() {
        let a = Raster::filled(2, 2, 9.0);
        let b = Raster::filled(2, 2, 3.0);
        let out = weighted_overlay(&[
            WeightedLayer::new("a", &a, 0.75),
            WeightedLayer::new("b", &b, 0.25),
        ])
        .unwrap();
        assert_relative_eq!(out.get(1, 1).unwrap(), 7.5);
    }

    #[test]
    fn test_nan_propagates() {
        let a = Raster::from_vec(vec![5.0, f64::NAN], 1, 2).unwrap();
        let b = Raster::filled(1, 2, 5.0);
        let out = weighted_overlay(&[
            WeightedLayer::new("a", &a, 0.5),
            WeightedLayer::new("b", &b, 0.5),
        ])
        .unwrap();
        assert_relative_eq!(out.get(0, 0).unwrap(), 5.0);
        assert!(out.get(0, 1).unwrap().is_nan());
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let a = Raster::filled(2, 2, 1.0);
        let err = weighted_overlay(&[
            WeightedLayer::new("a", &a, 0.5),
            WeightedLayer::new("b", &a, 0.4),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { name: "weights", .. }));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let a = Raster::filled(2, 2, 1.0);
        assert!(weighted_overlay(&[
            WeightedLayer::new("a", &a, 1.5),
            WeightedLayer::new("b", &a, -0.5),
        ])
        .is_err());
    }

    #[test]
    fn test_shape_mismatch() {
        let a = Raster::filled(2, 2, 1.0);
        let b = Raster::filled(3, 2, 1.0);
        let err = weighted_overlay(&[
            WeightedLayer::new("a", &a, 0.5),
            WeightedLayer::new("b", &b, 0.5),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::SizeMismatch { .. }));
    }

    #[test]
    fn test_empty_layers() {
        assert!(weighted_overlay(&[]).is_err());
    }
}
