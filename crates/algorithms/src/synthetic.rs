//! Synthetic inputs for demos, tests and benchmarks
//!
//! Seasonal vegetation curves follow a double-logistic model. A composite
//! sampler degrades them the way a 16-day satellite product would, and a
//! closure-driven [`SyntheticProvider`] stands in for an imagery archive.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use terroir_core::{GeoTransform, Raster, SeriesProvider, Site, TimeSeries, DAYS_PER_YEAR};

/// Double-logistic seasonal curve.
///
/// `base + amplitude * (1/(1+e^(-g(t-start))) - (1 - 1/(1+e^(d(t-end)))))`
/// with `t` the day of year (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoubleLogistic {
    /// Day of the green-up inflection
    pub start: f64,
    /// Day of the senescence inflection
    pub end: f64,
    pub growth_rate: f64,
    pub decay_rate: f64,
    /// Dormant-season index value
    pub base: f64,
    /// Peak rise above `base`
    pub amplitude: f64,
}

impl Default for DoubleLogistic {
    fn default() -> Self {
        Self {
            start: 120.0,
            end: 270.0,
            growth_rate: 0.2,
            decay_rate: 0.2,
            base: 0.15,
            amplitude: 0.6,
        }
    }
}

impl DoubleLogistic {
    pub fn value(&self, day: f64) -> f64 {
        let rise = 1.0 / (1.0 + (-self.growth_rate * (day - self.start)).exp());
        let fall = 1.0 - 1.0 / (1.0 + (self.decay_rate * (day - self.end)).exp());
        self.base + self.amplitude * (rise - fall)
    }

    /// One complete daily year
    pub fn series(&self) -> TimeSeries {
        TimeSeries::from_fn(DAYS_PER_YEAR, |i| self.value((i + 1) as f64))
    }
}

/// Reduces a daily curve to periodic composites.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositeSampler {
    /// Days between observations
    pub interval: usize,
    /// Standard deviation of the additive Gaussian noise; negative or
    /// non-finite values mean no noise
    pub noise: f64,
    /// Probability that an observation is lost (clouds)
    pub dropout: f64,
}

impl Default for CompositeSampler {
    fn default() -> Self {
        Self {
            interval: 16,
            noise: 0.02,
            dropout: 0.1,
        }
    }
}

impl CompositeSampler {
    /// Keep every `interval`-th day starting at day 1, perturbed and thinned;
    /// every other entry is missing.
    pub fn sample(&self, daily: &TimeSeries, seed: u64) -> TimeSeries {
        let mut rng = StdRng::seed_from_u64(seed);
        let interval = self.interval.max(1);
        let sd = if self.noise.is_finite() { self.noise.max(0.0) } else { 0.0 };
        let noise = Normal::new(0.0, sd).ok();

        TimeSeries::from_fn(daily.len(), |i| {
            if i % interval != 0 {
                return f64::NAN;
            }
            let lost = rng.gen_bool(self.dropout.clamp(0.0, 1.0));
            let offset = noise.map_or(0.0, |n| n.sample(&mut rng));
            match daily.get(i) {
                Some(v) if !lost => v + offset,
                _ => f64::NAN,
            }
        })
    }
}

type CurveRule = dyn Fn(&Site, i32) -> Option<DoubleLogistic> + Send + Sync;

/// [`SeriesProvider`] backed by a per-site curve rule.
///
/// A rule returning `None` simulates a failed retrieval and yields a fully
/// missing series.
pub struct SyntheticProvider {
    rule: Box<CurveRule>,
    sampler: Option<CompositeSampler>,
    seed: u64,
}

impl SyntheticProvider {
    /// Clean daily curves
    pub fn new(rule: impl Fn(&Site, i32) -> Option<DoubleLogistic> + Send + Sync + 'static) -> Self {
        Self {
            rule: Box::new(rule),
            sampler: None,
            seed: 0,
        }
    }

    /// Degrade every curve through `sampler`; each site gets its own noise
    /// stream derived from `seed`.
    pub fn with_sampler(mut self, sampler: CompositeSampler, seed: u64) -> Self {
        self.sampler = Some(sampler);
        self.seed = seed;
        self
    }
}

impl std::fmt::Debug for SyntheticProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntheticProvider")
            .field("sampler", &self.sampler)
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

impl SeriesProvider for SyntheticProvider {
    fn series(&self, site: &Site, year: i32) -> TimeSeries {
        let Some(curve) = (self.rule)(site, year) else {
            return TimeSeries::missing(DAYS_PER_YEAR);
        };
        let daily = curve.series();
        match &self.sampler {
            Some(sampler) => {
                let seed = self
                    .seed
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(site.id as u64)
                    .wrapping_add((year as u64) << 32);
                sampler.sample(&daily, seed)
            }
            None => daily,
        }
    }
}

/// Cell size of generated DEMs, in meters
pub const SYNTHETIC_CELL_SIZE: f64 = 30.0;

/// Rolling upland terrain rising from about 550 m.
///
/// A tilted base plane plus a handful of Gaussian hills at seeded positions.
pub fn synthetic_dem(rows: usize, cols: usize, seed: u64) -> Raster<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let span = rows.max(cols).max(1) as f64;
    let hills: Vec<(f64, f64, f64, f64)> = (0..6)
        .map(|_| {
            (
                rng.gen_range(0.0..rows.max(1) as f64),
                rng.gen_range(0.0..cols.max(1) as f64),
                rng.gen_range(150.0..500.0),
                rng.gen_range(0.08..0.25) * span,
            )
        })
        .collect();

    let data = Array2::from_shape_fn((rows, cols), |(r, c)| {
        let (r, c) = (r as f64, c as f64);
        let tilt = 550.0 + 300.0 * r / span;
        let relief: f64 = hills
            .iter()
            .map(|&(hr, hc, height, radius)| {
                let d2 = (r - hr).powi(2) + (c - hc).powi(2);
                height * (-d2 / (2.0 * radius * radius)).exp()
            })
            .sum();
        tilt + relief
    });

    let mut dem = Raster::from_array(data);
    dem.set_transform(GeoTransform::new(
        0.0,
        rows as f64 * SYNTHETIC_CELL_SIZE,
        SYNTHETIC_CELL_SIZE,
        -SYNTHETIC_CELL_SIZE,
    ));
    dem.set_nodata(Some(f64::NAN));
    dem
}

/// Mean annual temperature from elevation with a standard lapse rate
/// (6.5 °C per km).
pub fn lapse_rate_temperature(dem: &Raster<f64>, sea_level_celsius: f64) -> Raster<f64> {
    let mut temperature = dem.clone();
    temperature
        .data_mut()
        .mapv_inplace(|z| sea_level_celsius - 0.0065 * z);
    temperature
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_curve_shape() {
        let curve = DoubleLogistic::default();
        assert_relative_eq!(curve.value(1.0), 0.15, epsilon = 1e-6);
        assert_relative_eq!(curve.value(195.0), 0.75, epsilon = 1e-6);
        assert_relative_eq!(curve.value(120.0), 0.45, epsilon = 1e-6);
        assert_eq!(curve.series().len(), DAYS_PER_YEAR);
        assert!(curve.series().is_complete());
    }

    #[test]
    fn test_sampler_interval_and_seed() {
        let daily = DoubleLogistic::default().series();
        let sampler = CompositeSampler {
            dropout: 0.0,
            ..CompositeSampler::default()
        };
        let a = sampler.sample(&daily, 3);
        assert_eq!(a.valid_count(), 23);
        assert!(a.get(0).is_some());
        assert!(a.get(1).is_none());
        assert!(a.get(16).is_some());

        let b = sampler.sample(&daily, 3);
        assert_eq!(a.values()[16], b.values()[16]);
    }

    #[test]
    fn test_sampler_noise_is_gaussian() {
        let flat = TimeSeries::new(vec![0.5; 16 * 4000]);
        let sampler = CompositeSampler {
            noise: 0.1,
            dropout: 0.0,
            ..CompositeSampler::default()
        };
        let kept: Vec<f64> = sampler
            .sample(&flat, 17)
            .values()
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .collect();
        assert_eq!(kept.len(), 4000);

        let n = kept.len() as f64;
        let mean = kept.iter().sum::<f64>() / n;
        let sd = (kept.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
        assert_relative_eq!(mean, 0.5, epsilon = 0.01);
        assert_relative_eq!(sd, 0.1, epsilon = 0.01);
    }

    #[test]
    fn test_invalid_noise_means_none() {
        let daily = DoubleLogistic::default().series();
        for noise in [-0.5, f64::NAN, f64::INFINITY, 0.0] {
            let sampler = CompositeSampler {
                noise,
                dropout: 0.0,
                ..CompositeSampler::default()
            };
            let sampled = sampler.sample(&daily, 5);
            assert_eq!(sampled.values()[32], daily.values()[32]);
        }
    }

    #[test]
    fn test_sampler_dropout() {
        let daily = DoubleLogistic::default().series();
        let sampler = CompositeSampler {
            dropout: 1.0,
            ..CompositeSampler::default()
        };
        assert_eq!(sampler.sample(&daily, 1).valid_count(), 0);
    }

    #[test]
    fn test_provider_missing_rule() {
        let provider = SyntheticProvider::new(|site, _| (site.id % 2 == 0).then(DoubleLogistic::default));
        let site = |id| Site {
            id,
            row: 0,
            col: 0,
            x: 0.0,
            y: 0.0,
        };
        assert!(provider.series(&site(0), 2024).is_complete());
        assert_eq!(provider.series(&site(1), 2024).valid_count(), 0);
    }

    #[test]
    fn test_dem_is_seeded() {
        let a = synthetic_dem(40, 30, 9);
        let b = synthetic_dem(40, 30, 9);
        assert_eq!(a.shape(), (40, 30));
        assert_eq!(a.data(), b.data());
        let stats = a.statistics();
        assert!(stats.min.unwrap() >= 500.0);
        assert!(stats.max.unwrap() > stats.min.unwrap());
    }

    #[test]
    fn test_lapse_rate() {
        let dem = Raster::filled(2, 2, 1000.0);
        let t = lapse_rate_temperature(&dem, 16.5);
        assert_relative_eq!(t.get(0, 0).unwrap(), 10.0, epsilon = 1e-9);
    }
}
