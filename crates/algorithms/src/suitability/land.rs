//! Land suitability index from terrain and climate

use serde::{Deserialize, Serialize};
use terroir_core::{Algorithm, Error, Raster, Result};
use tracing::{debug, info};

use super::grade::GradeHistogram;
use super::overlay::{weighted_overlay, WeightedLayer};
use super::score_table::{climate_scores, ScoreTable};
use crate::terrain::{aspect, slope, SlopeParams};

/// AHP weights of the four criteria
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CriteriaWeights {
    pub slope: f64,
    pub elevation: f64,
    pub aspect: f64,
    pub climate: f64,
}

impl Default for CriteriaWeights {
    fn default() -> Self {
        Self {
            slope: 0.35,
            elevation: 0.25,
            aspect: 0.20,
            climate: 0.20,
        }
    }
}

/// Parameters for [`land_suitability`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuitabilityParams {
    pub weights: CriteriaWeights,
    pub slope_table: ScoreTable,
    pub aspect_table: ScoreTable,
    pub elevation_table: ScoreTable,
    /// Multiplier from the 1-9 index to the reported score
    pub score_scale: f64,
    /// Cells scoring strictly above this are prime
    pub prime_threshold: f64,
    pub slope: SlopeParams,
}

impl Default for SuitabilityParams {
    fn default() -> Self {
        Self {
            weights: CriteriaWeights::default(),
            slope_table: ScoreTable::slope(),
            aspect_table: ScoreTable::aspect(),
            elevation_table: ScoreTable::elevation(),
            score_scale: 10.0,
            prime_threshold: 85.0,
            slope: SlopeParams::default(),
        }
    }
}

/// Aggregate figures of a suitability map
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuitabilitySummary {
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub valid_cells: usize,
    pub prime_cells: usize,
    pub grades: GradeHistogram,
}

/// Output of [`land_suitability`]
#[derive(Debug, Clone)]
pub struct SuitabilityMap {
    /// Score per cell, NaN where any input is missing
    pub score: Raster<f64>,
    /// 1 where the score exceeds the prime threshold, no-data (0) elsewhere
    pub prime: Raster<u8>,
    pub summary: SuitabilitySummary,
}

/// Score land suitability from a DEM and a mean annual temperature raster.
///
/// Slope, aspect and elevation are reclassified into 1-9 scores, temperature
/// is mapped linearly, and the weighted sum is scaled to 0-100.
pub fn land_suitability(
    dem: &Raster<f64>,
    temperature: &Raster<f64>,
    params: &SuitabilityParams,
) -> Result<SuitabilityMap> {
    dem.ensure_same_shape(temperature)?;

    let slope_scores = params.slope_table.apply(&slope(dem, params.slope)?)?;
    let aspect_scores = params.aspect_table.apply(&aspect(dem)?)?;
    let elevation_scores = params.elevation_table.apply(dem)?;
    let climate = climate_scores(temperature)?;
    debug!("criterion scores computed");

    let w = params.weights;
    let lsi = weighted_overlay(&[
        WeightedLayer::new("slope", &slope_scores, w.slope),
        WeightedLayer::new("elevation", &elevation_scores, w.elevation),
        WeightedLayer::new("aspect", &aspect_scores, w.aspect),
        WeightedLayer::new("climate", &climate, w.climate),
    ])?;

    let scores: Vec<f64> = lsi.data().iter().map(|v| v * params.score_scale).collect();
    let prime_data: Vec<u8> = scores
        .iter()
        .map(|&s| u8::from(s > params.prime_threshold))
        .collect();

    let score = lsi.derive(scores, Some(f64::NAN))?;
    let prime = lsi.derive(prime_data, Some(0))?;

    let stats = score.statistics();
    let summary = SuitabilitySummary {
        mean: stats.mean,
        min: stats.min,
        max: stats.max,
        valid_cells: stats.valid_count,
        prime_cells: prime.data().iter().filter(|&&v| v == 1).count(),
        grades: GradeHistogram::from_scores(score.data().iter().copied()),
    };

    info!(
        mean = summary.mean,
        valid = summary.valid_cells,
        prime = summary.prime_cells,
        "land suitability computed"
    );

    Ok(SuitabilityMap {
        score,
        prime,
        summary,
    })
}

/// Land suitability algorithm over `(dem, temperature)`
#[derive(Debug, Clone, Default)]
pub struct LandSuitability;

impl Algorithm for LandSuitability {
    type Input = (Raster<f64>, Raster<f64>);
    type Output = SuitabilityMap;
    type Params = SuitabilityParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "LandSuitability"
    }

    fn description(&self) -> &'static str {
        "AHP weighted overlay of slope, elevation, aspect and climate scores"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        let (dem, temperature) = input;
        land_suitability(&dem, &temperature, &params)
    }
}
