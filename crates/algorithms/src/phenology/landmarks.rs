//! Phenological landmark extraction
//!
//! The cleaned series is smoothed, differentiated three times, and the peaks
//! of the third derivative mark the transitions of the growing season:
//! maxima in the first part of the year (green-up onset, the inflection
//! before maturity) and minima in the rest (senescence onset, dormancy
//! onset).

use serde::{Deserialize, Serialize};
use std::fmt;
use terroir_core::{Algorithm, Error, Result, TimeSeries};
use tracing::debug;

use super::clean::clean;
use super::numeric::gradient;
use super::peaks::{find_peaks, PeakParams};
use super::savgol::{SavitzkyGolay, SmoothingParams};

/// A phenological transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Greenup,
    Maturity,
    Senescence,
    Dormancy,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::Greenup,
        Phase::Maturity,
        Phase::Senescence,
        Phase::Dormancy,
    ];
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Greenup => "Greenup",
            Phase::Maturity => "Maturity",
            Phase::Senescence => "Senescence",
            Phase::Dormancy => "Dormancy",
        };
        f.write_str(name)
    }
}

/// How a landmark set was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LandmarkSource {
    /// All four landmarks came from third-derivative peaks
    Detected,
    /// At least one peak list was empty and the fixed calendar was used
    Fallback,
}

/// Day-of-year indices (0-based) of the four transitions of one series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandmarkSet {
    pub greenup: usize,
    pub maturity: usize,
    pub senescence: usize,
    pub dormancy: usize,
    pub source: LandmarkSource,
}

impl LandmarkSet {
    /// Calendar used when peak detection comes up empty.
    ///
    /// This is a known degradation: flat, monotonic or very short seasons
    /// have no usable third-derivative peaks and all share this set.
    pub const FALLBACK: LandmarkSet = LandmarkSet {
        greenup: 100,
        maturity: 150,
        senescence: 260,
        dormancy: 300,
        source: LandmarkSource::Fallback,
    };

    pub fn detected(greenup: usize, maturity: usize, senescence: usize, dormancy: usize) -> Self {
        Self {
            greenup,
            maturity,
            senescence,
            dormancy,
            source: LandmarkSource::Detected,
        }
    }

    pub fn get(&self, phase: Phase) -> usize {
        match phase {
            Phase::Greenup => self.greenup,
            Phase::Maturity => self.maturity,
            Phase::Senescence => self.senescence,
            Phase::Dormancy => self.dormancy,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Phase, usize)> + '_ {
        Phase::ALL.into_iter().map(move |p| (p, self.get(p)))
    }

    /// Landmark days in ascending order
    pub fn sorted_days(&self) -> [usize; 4] {
        let mut days = [self.greenup, self.maturity, self.senescence, self.dormancy];
        days.sort_unstable();
        days
    }

    pub fn is_fallback(&self) -> bool {
        self.source == LandmarkSource::Fallback
    }
}

/// Parameters for landmark extraction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandmarkParams {
    pub smoothing: SmoothingParams,
    pub peaks: PeakParams,
    /// First index of the second half of the year; upward landmarks are
    /// searched before it and downward landmarks from it onward
    pub split_day: usize,
}

impl Default for LandmarkParams {
    fn default() -> Self {
        Self {
            smoothing: SmoothingParams::default(),
            peaks: PeakParams::default(),
            split_day: 180,
        }
    }
}

/// Smoothed curve and landmarks of one series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhenologyProfile {
    pub smoothed: Vec<f64>,
    pub landmarks: LandmarkSet,
}

/// Landmark extractor with a prebuilt smoothing filter.
///
/// Build once and reuse across a batch of series.
#[derive(Debug, Clone)]
pub struct LandmarkExtractor {
    filter: SavitzkyGolay,
    params: LandmarkParams,
}

impl LandmarkExtractor {
    pub fn new(params: LandmarkParams) -> Result<Self> {
        if params.split_day == 0 {
            return Err(Error::InvalidParameter {
                name: "split_day",
                value: "0".into(),
                reason: "split day must be > 0".into(),
            });
        }
        Ok(Self {
            filter: SavitzkyGolay::new(params.smoothing)?,
            params,
        })
    }

    pub fn params(&self) -> &LandmarkParams {
        &self.params
    }

    /// Clean, smooth and locate the four landmarks of `series`.
    ///
    /// Errors are per-series rejections: [`Error::InsufficientData`] from
    /// cleaning or [`Error::WindowTooLarge`] from smoothing.
    pub fn extract(&self, series: &TimeSeries) -> Result<PhenologyProfile> {
        let cleaned = clean(series)?;
        let smoothed = self.filter.smooth(cleaned.values())?;

        let d3 = gradient(&gradient(&gradient(&smoothed)));
        let split = self.params.split_day.min(d3.len());

        let upward = find_peaks(&d3[..split], &self.params.peaks);
        let falling: Vec<f64> = d3[split..].iter().map(|v| -v).collect();
        let downward: Vec<usize> = find_peaks(&falling, &self.params.peaks)
            .into_iter()
            .map(|i| i + split)
            .collect();

        let landmarks = match (upward.first(), upward.last(), downward.first(), downward.last()) {
            (Some(&g), Some(&m), Some(&s), Some(&d)) => LandmarkSet::detected(g, m, s, d),
            _ => {
                debug!(
                    upward = upward.len(),
                    downward = downward.len(),
                    "no third-derivative peaks in one half of the year, using fallback landmarks"
                );
                LandmarkSet::FALLBACK
            }
        };

        Ok(PhenologyProfile { smoothed, landmarks })
    }
}

/// Extract landmarks from a single series
pub fn extract_landmarks(series: &TimeSeries, params: LandmarkParams) -> Result<PhenologyProfile> {
    LandmarkExtractor::new(params)?.extract(series)
}

/// Landmark extraction algorithm
#[derive(Debug, Clone, Default)]
pub struct LandmarkExtraction;

impl Algorithm for LandmarkExtraction {
    type Input = TimeSeries;
    type Output = PhenologyProfile;
    type Params = LandmarkParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Landmark Extraction"
    }

    fn description(&self) -> &'static str {
        "Locate green-up, maturity, senescence and dormancy in a vegetation-index series"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        extract_landmarks(&input, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::DoubleLogistic;
    use terroir_core::DAYS_PER_YEAR;

    #[test]
    fn test_flat_series_uses_fallback() {
        let flat = TimeSeries::new(vec![0.35; DAYS_PER_YEAR]);
        let profile = extract_landmarks(&flat, LandmarkParams::default()).unwrap();
        assert_eq!(profile.landmarks, LandmarkSet::FALLBACK);
        assert_eq!(profile.landmarks.greenup, 100);
        assert_eq!(profile.landmarks.maturity, 150);
        assert_eq!(profile.landmarks.senescence, 260);
        assert_eq!(profile.landmarks.dormancy, 300);
        assert!(profile.landmarks.is_fallback());
    }

    #[test]
    fn test_monotonic_series_uses_fallback() {
        let ramp = TimeSeries::from_fn(DAYS_PER_YEAR, |i| 0.1 + 0.002 * i as f64);
        let profile = extract_landmarks(&ramp, LandmarkParams::default()).unwrap();
        assert!(profile.landmarks.is_fallback());
    }

    #[test]
    fn test_seasonal_curve_ordering() {
        let curve = DoubleLogistic::default().series();
        let profile = extract_landmarks(&curve, LandmarkParams::default()).unwrap();
        let lm = profile.landmarks;

        assert_eq!(lm.source, LandmarkSource::Detected);
        assert!(lm.greenup <= lm.maturity);
        assert!(lm.maturity < 180);
        assert!(lm.senescence >= 180);
        assert!(lm.senescence <= lm.dormancy);
        assert!(lm.dormancy < DAYS_PER_YEAR);
    }

    #[test]
    fn test_shifted_season_shifts_greenup() {
        let early = DoubleLogistic::default();
        let late = DoubleLogistic {
            start: early.start + 15.0,
            ..early
        };
        let a = extract_landmarks(&early.series(), LandmarkParams::default()).unwrap();
        let b = extract_landmarks(&late.series(), LandmarkParams::default()).unwrap();
        let shift = b.landmarks.greenup as i64 - a.landmarks.greenup as i64;
        assert!((10..=20).contains(&shift), "green-up shift was {shift}");
    }

    #[test]
    fn test_insufficient_data_propagates() {
        let mut values = vec![f64::NAN; DAYS_PER_YEAR];
        values[3] = 0.2;
        let err = extract_landmarks(&TimeSeries::new(values), LandmarkParams::default()).unwrap_err();
        assert!(matches!(err, Error::InsufficientData { valid: 1, .. }));
    }

    #[test]
    fn test_short_series_window_too_large() {
        let short = TimeSeries::new(vec![0.3; 20]);
        let err = extract_landmarks(&short, LandmarkParams::default()).unwrap_err();
        assert!(matches!(err, Error::WindowTooLarge { window: 31, len: 20 }));
    }

    #[test]
    fn test_smoothed_has_series_length() {
        let profile = LandmarkExtraction
            .execute_default(DoubleLogistic::default().series())
            .unwrap();
        assert_eq!(profile.smoothed.len(), DAYS_PER_YEAR);
    }

    #[test]
    fn test_sorted_days() {
        let lm = LandmarkSet::detected(120, 90, 300, 250);
        assert_eq!(lm.sorted_days(), [90, 120, 250, 300]);
        assert_eq!(lm.iter().count(), 4);
        assert_eq!(lm.get(Phase::Senescence), 300);
    }
}
