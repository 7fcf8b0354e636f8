//! Phenology curve matching
//!
//! Daily vegetation-index series are cleaned, smoothed with a
//! Savitzky-Golay filter and reduced to four seasonal landmarks. Curves are
//! aligned on those landmarks by piecewise-linear time warping and compared
//! through their slopes, so a later or earlier season does not count as
//! dissimilar on its own.
//!
//! - [`clean`]: fill missing samples by linear interpolation
//! - [`SavitzkyGolay`]: polynomial smoothing
//! - [`LandmarkExtractor`]: green-up, maturity, senescence and dormancy
//! - [`warp_curve`]: align a curve onto a reference timeline
//! - [`similarity`]: slope-based score in (0, 100]
//! - [`rank`]: score many candidates and keep the best

mod clean;
mod landmarks;
mod numeric;
mod peaks;
mod savgol;
mod search;
mod similarity;
mod warp;

pub use clean::{clean, MIN_VALID_SAMPLES};
pub use landmarks::{
    extract_landmarks, LandmarkExtraction, LandmarkExtractor, LandmarkParams, LandmarkSet,
    LandmarkSource, Phase, PhenologyProfile,
};
pub use numeric::{gradient, PiecewiseLinear};
pub use peaks::{find_peaks, PeakParams};
pub use savgol::{SavitzkyGolay, SmoothingParams};
pub use search::{
    rank, search_sites, select_matches, MatchResult, PhenologyMatcher, Ranking, SearchParams,
    SearchSummary,
};
pub use similarity::{score_from_distance, similarity, slope_distance, Similarity, SimilarityParams};
pub use warp::{warp_curve, WarpFunction};
