//! Land suitability by AHP weighted overlay
//!
//! Terrain and climate criteria are reclassified into 1-9 scores, combined
//! with fixed weights and scaled to 0-100. High-scoring cells are graded and
//! flagged as prime land.

mod grade;
mod land;
mod overlay;
mod score_table;

pub use grade::{Grade, GradeHistogram};
pub use land::{
    land_suitability, CriteriaWeights, LandSuitability, SuitabilityMap, SuitabilityParams,
    SuitabilitySummary,
};
pub use overlay::{weighted_overlay, WeightedLayer, WEIGHT_TOLERANCE};
pub use score_table::{climate_score, climate_scores, ScoreClass, ScoreTable};
