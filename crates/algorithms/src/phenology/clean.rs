//! Gap filling for daily series
//!
//! Missing samples are replaced by the piecewise-linear interpolant through
//! the valid samples. Gaps before the first or after the last valid sample
//! continue the slope of the nearest valid segment, unbounded.

use super::numeric::PiecewiseLinear;
use terroir_core::{Error, Result, TimeSeries};

/// Fewest valid samples a series needs to be cleaned
pub const MIN_VALID_SAMPLES: usize = 3;

/// Fill missing entries of a series.
///
/// Leading and trailing gaps are extrapolated linearly from the first and
/// last valid segments, without bounds. When the valid samples are few and
/// far from the ends of the year, edge values can land well outside the
/// physical range of the index; smoothing and landmark extraction still run,
/// but the filled edges carry no information.
///
/// Non-finite samples (NaN, ±inf) count as missing. Fails with
/// [`Error::InsufficientData`] when fewer than [`MIN_VALID_SAMPLES`] remain.
/// The input is not modified and the result has the same length.
pub fn clean(series: &TimeSeries) -> Result<TimeSeries> {
    let values = series.values();
    let (xs, ys): (Vec<f64>, Vec<f64>) = values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .map(|(i, &v)| (i as f64, v))
        .unzip();

    if xs.len() < MIN_VALID_SAMPLES {
        return Err(Error::InsufficientData {
            valid: xs.len(),
            required: MIN_VALID_SAMPLES,
        });
    }
    if xs.len() == values.len() {
        return Ok(series.clone());
    }

    let interpolant = PiecewiseLinear::new(xs, ys)?;
    Ok(TimeSeries::from_fn(values.len(), |i| {
        let v = values[i];
        if v.is_finite() {
            v
        } else {
            interpolant.eval(i as f64)
        }
    }))
}
