//! Daily vegetation-index time series and the provider boundary

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Samples in one yearly series (day-of-year 1..=365)
pub const DAYS_PER_YEAR: usize = 365;

/// An ordered sequence of daily samples; NaN marks a missing entry.
///
/// Index `i` holds day-of-year `i + 1`. Algorithms take series by reference
/// and return new sequences.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    values: Vec<f64>,
}

impl TimeSeries {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// A series with every entry missing, as produced when retrieval fails
    pub fn missing(len: usize) -> Self {
        Self::new(vec![f64::NAN; len])
    }

    /// Build a series by evaluating `f` at every index
    pub fn from_fn(len: usize, f: impl FnMut(usize) -> f64) -> Self {
        Self::new((0..len).map(f).collect())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// Value at `index`, `None` when out of range or missing
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().filter(|v| !v.is_nan())
    }

    /// Number of non-missing samples
    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_nan()).count()
    }

    /// True when no entry is missing
    pub fn is_complete(&self) -> bool {
        self.values.iter().all(|v| !v.is_nan())
    }
}

impl From<Vec<f64>> for TimeSeries {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

// Missing samples travel as JSON `null`.
impl Serialize for TimeSeries {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.values.iter().map(|v| (!v.is_nan()).then_some(*v)))
    }
}

impl<'de> Deserialize<'de> for TimeSeries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw: Vec<Option<f64>> = Vec::deserialize(deserializer)?;
        Ok(Self::new(raw.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect()))
    }
}

/// Geographic identity of a sampled location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub id: usize,
    pub row: usize,
    pub col: usize,
    /// Map x of the cell center
    pub x: f64,
    /// Map y of the cell center
    pub y: f64,
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "site-{}@{},{}", self.id, self.row, self.col)
    }
}

/// Supplies a yearly vegetation-index series for a site.
///
/// Implementations wrap whatever imagery archive is available. Retrieval
/// failures are reported as [`TimeSeries::missing`], which the cleaning step
/// rejects as insufficient data.
pub trait SeriesProvider: Sync {
    fn series(&self, site: &Site, year: i32) -> TimeSeries;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_series() {
        let s = TimeSeries::missing(DAYS_PER_YEAR);
        assert_eq!(s.len(), 365);
        assert_eq!(s.valid_count(), 0);
        assert_eq!(s.get(0), None);
    }

    #[test]
    fn test_valid_count_and_get() {
        let s = TimeSeries::new(vec![0.1, f64::NAN, 0.3]);
        assert_eq!(s.valid_count(), 2);
        assert!(!s.is_complete());
        assert_eq!(s.get(2), Some(0.3));
        assert_eq!(s.get(1), None);
        assert_eq!(s.get(10), None);
    }

    #[test]
    fn test_json_nulls_are_missing() {
        let s: TimeSeries = serde_json::from_str("[0.2, null, 0.4]").unwrap();
        assert_eq!(s.len(), 3);
        assert!(s.values()[1].is_nan());
        assert_eq!(serde_json::to_string(&s).unwrap(), "[0.2,null,0.4]");
    }

    #[test]
    fn test_site_display() {
        let site = Site {
            id: 4,
            row: 12,
            col: 30,
            x: 0.0,
            y: 0.0,
        };
        assert_eq!(site.to_string(), "site-4@12,30");
    }
}
