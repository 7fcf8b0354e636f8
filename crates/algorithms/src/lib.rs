//! # Terroir Algorithms
//!
//! Site-matching algorithms for terroir.
//!
//! ## Available Algorithm Categories
//!
//! - **phenology**: Series cleaning, Savitzky-Golay smoothing, landmark
//!   extraction, landmark-guided time warping, similarity ranking
//! - **terrain**: Slope, aspect
//! - **suitability**: Criterion reclassification, AHP weighted overlay, grades
//! - **sites**: Prime regions and candidate sampling from score rasters
//! - **synthetic**: Double-logistic curves, composite sampling, test terrain

mod maybe_rayon;

pub mod phenology;
pub mod sites;
pub mod suitability;
pub mod synthetic;
pub mod terrain;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::phenology::{
        clean, extract_landmarks, rank, search_sites, similarity, warp_curve, LandmarkExtraction,
        LandmarkExtractor, LandmarkParams, LandmarkSet, MatchResult, PhenologyMatcher, Ranking,
        SearchParams, SimilarityParams, SmoothingParams,
    };
    pub use crate::sites::{largest_region, sample_sites, Region};
    pub use crate::suitability::{
        land_suitability, weighted_overlay, Grade, LandSuitability, ScoreTable, SuitabilityMap,
        SuitabilityParams,
    };
    pub use crate::synthetic::{CompositeSampler, DoubleLogistic, SyntheticProvider};
    pub use crate::terrain::{aspect, slope, Aspect, Slope, SlopeParams};
    pub use terroir_core::prelude::*;
}
