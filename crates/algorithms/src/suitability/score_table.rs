//! Reclassification of continuous criteria into AHP scores

use serde::{Deserialize, Serialize};
use terroir_core::{Error, Raster, Result};

use crate::maybe_rayon::*;

/// One `[min, max)` interval and the score it maps to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreClass {
    pub min: f64,
    pub max: f64,
    pub score: f64,
}

impl ScoreClass {
    pub fn new(min: f64, max: f64, score: f64) -> Self {
        Self { min, max, score }
    }

    fn contains(&self, value: f64) -> bool {
        value >= self.min && value < self.max
    }
}

/// Ordered classification table.
///
/// The first class containing a value decides its score; values outside every
/// class get `default_score`. NaN stays NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreTable {
    pub classes: Vec<ScoreClass>,
    pub default_score: f64,
}

impl ScoreTable {
    pub fn new(classes: Vec<ScoreClass>, default_score: f64) -> Result<Self> {
        if let Some(bad) = classes.iter().find(|c| !(c.min < c.max)) {
            return Err(Error::InvalidParameter {
                name: "classes",
                value: format!("[{}, {})", bad.min, bad.max),
                reason: "class minimum must be below its maximum".into(),
            });
        }
        Ok(Self {
            classes,
            default_score,
        })
    }

    /// Slope in degrees: gentle ground scores highest
    pub fn slope() -> Self {
        Self {
            classes: vec![
                ScoreClass::new(f64::NEG_INFINITY, 5.0, 9.0),
                ScoreClass::new(5.0, 15.0, 8.0),
                ScoreClass::new(15.0, 25.0, 6.0),
                ScoreClass::new(25.0, f64::INFINITY, 1.0),
            ],
            default_score: 1.0,
        }
    }

    /// Aspect in degrees: south-facing slopes score highest, flat (-1) and
    /// north-facing ground falls to the default
    pub fn aspect() -> Self {
        Self {
            classes: vec![
                ScoreClass::new(135.0, 225.0, 9.0),
                ScoreClass::new(90.0, 135.0, 7.0),
                ScoreClass::new(225.0, 270.0, 7.0),
            ],
            default_score: 3.0,
        }
    }

    /// Elevation in meters, tuned for upland orchards (800-1300 m)
    pub fn elevation() -> Self {
        Self {
            classes: vec![
                ScoreClass::new(f64::NEG_INFINITY, 600.0, 3.0),
                ScoreClass::new(600.0, 800.0, 6.0),
                ScoreClass::new(800.0, 1300.0, 9.0),
                ScoreClass::new(1300.0, f64::INFINITY, 5.0),
            ],
            default_score: 1.0,
        }
    }

    pub fn classify(&self, value: f64) -> f64 {
        if value.is_nan() {
            return f64::NAN;
        }
        self.classes
            .iter()
            .find(|c| c.contains(value))
            .map_or(self.default_score, |c| c.score)
    }

    /// Score every cell of `raster`; no-data cells become NaN.
    pub fn apply(&self, raster: &Raster<f64>) -> Result<Raster<f64>> {
        let (rows, cols) = raster.shape();
        let view = raster.view();

        let data: Vec<f64> = (0..rows)
            .into_par_iter()
            .flat_map(|row| {
                let mut row_data = vec![f64::NAN; cols];
                for (col, cell) in row_data.iter_mut().enumerate() {
                    let value = view[[row, col]];
                    if !raster.is_nodata(value) {
                        *cell = self.classify(value);
                    }
                }
                row_data
            })
            .collect();

        raster.derive(data, Some(f64::NAN))
    }
}

/// Linear climate score from mean annual temperature (°C), clamped to 1-9
pub fn climate_score(temperature: f64) -> f64 {
    ((temperature + 50.0) / 100.0 * 8.0 + 1.0).clamp(1.0, 9.0)
}

/// [`climate_score`] over a temperature raster
pub fn climate_scores(temperature: &Raster<f64>) -> Result<Raster<f64>> {
    let data: Vec<f64> = temperature
        .data()
        .iter()
        .map(|&t| {
            if temperature.is_nodata(t) {
                f64::NAN
            } else {
                climate_score(t)
            }
        })
        .collect();
    temperature.derive(data, Some(f64::NAN))
}
