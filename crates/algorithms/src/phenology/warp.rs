//! Landmark-based time warping
//!
//! Two landmark sets, each padded with day 0 and a closing day (365, or one
//! past the latest landmark for longer series), define a
//! piecewise-linear correspondence between a target timeline and the
//! reference timeline. The target curve is resampled on the reference
//! timeline through the inverse of that correspondence.

use terroir_core::{Result, DAYS_PER_YEAR};

use super::landmarks::LandmarkSet;
use super::numeric::{lerp_at, PiecewiseLinear};

/// Piecewise-linear map between a target and a reference timeline.
#[derive(Debug, Clone)]
pub struct WarpFunction {
    forward: PiecewiseLinear,
    inverse: PiecewiseLinear,
}

impl WarpFunction {
    /// Build the map sending each target landmark onto the matching
    /// reference landmark, after sorting both sets by day.
    ///
    /// Both timelines close at day 365 unless a landmark lies at or beyond
    /// it, in which case that timeline closes one day after its last landmark.
    pub fn new(reference: &LandmarkSet, target: &LandmarkSet) -> Result<Self> {
        let target_anchors = anchors(target);
        let reference_anchors = anchors(reference);
        let forward = PiecewiseLinear::new(target_anchors, reference_anchors)?;
        let inverse = forward.inverse()?;
        Ok(Self { forward, inverse })
    }

    /// Target day → reference day
    pub fn to_reference(&self, target_day: f64) -> f64 {
        self.forward.eval(target_day)
    }

    /// Reference day → target day
    pub fn to_target(&self, reference_day: f64) -> f64 {
        self.inverse.eval(reference_day)
    }

    /// Resample `target` onto a reference timeline of `reference_len` days.
    ///
    /// Target coordinates are clamped to the target's own index range.
    pub fn resample(&self, target: &[f64], reference_len: usize) -> Vec<f64> {
        let last = target.len().saturating_sub(1) as f64;
        (0..reference_len)
            .map(|day| lerp_at(target, self.to_target(day as f64).clamp(0.0, last)))
            .collect()
    }
}

fn anchors(landmarks: &LandmarkSet) -> Vec<f64> {
    let days = landmarks.sorted_days();
    let closing = DAYS_PER_YEAR.max(days[3] + 1);
    std::iter::once(0.0)
        .chain(days.into_iter().map(|d| d as f64))
        .chain(std::iter::once(closing as f64))
        .collect()
}

/// Warp `target` onto the timeline of `reference`.
///
/// The result has the reference's length; `reference` itself only supplies
/// that length.
pub fn warp_curve(
    reference: &[f64],
    target: &[f64],
    reference_landmarks: &LandmarkSet,
    target_landmarks: &LandmarkSet,
) -> Result<Vec<f64>> {
    let warp = WarpFunction::new(reference_landmarks, target_landmarks)?;
    Ok(warp.resample(target, reference.len()))
}
