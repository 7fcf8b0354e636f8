//! Finite differences and piecewise-linear interpolation on 1-D samples

use terroir_core::{Error, Result};

/// Discrete gradient with unit spacing.
///
/// Interior points use central differences `(y[i+1] - y[i-1]) / 2`; the two
/// end points use one-sided first differences. Series shorter than two
/// samples have no slope and yield zeros.
pub fn gradient(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    if n < 2 {
        return vec![0.0; n];
    }

    let mut out = Vec::with_capacity(n);
    out.push(values[1] - values[0]);
    out.extend(values.windows(3).map(|w| (w[2] - w[0]) / 2.0));
    out.push(values[n - 1] - values[n - 2]);
    out
}

/// Linear resample of `values` at a fractional index.
///
/// The position is clamped to `[0, len - 1]`, so the result is always drawn
/// from the two samples bracketing it.
pub fn lerp_at(values: &[f64], position: f64) -> f64 {
    let last = values.len().saturating_sub(1);
    if values.is_empty() {
        return f64::NAN;
    }
    let pos = position.clamp(0.0, last as f64);
    let i = pos.floor() as usize;
    if i >= last {
        return values[last];
    }
    let t = pos - i as f64;
    values[i] + t * (values[i + 1] - values[i])
}

/// Piecewise-linear function through a set of knots.
///
/// Knot abscissae must be non-decreasing. Repeated abscissae form zero-width
/// segments that are never selected for evaluation, so the function jumps to
/// the value of the last repeated knot. Outside the knot range the first and
/// last non-degenerate segments are extended linearly.
#[derive(Debug, Clone, PartialEq)]
pub struct PiecewiseLinear {
    xs: Vec<f64>,
    ys: Vec<f64>,
    first: usize,
    last: usize,
}

impl PiecewiseLinear {
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> Result<Self> {
        if xs.len() != ys.len() {
            return Err(Error::LengthMismatch {
                expected: xs.len(),
                actual: ys.len(),
            });
        }
        if xs.iter().chain(&ys).any(|v| !v.is_finite()) {
            return Err(Error::InvalidParameter {
                name: "knots",
                value: format!("{xs:?}"),
                reason: "knots must be finite".into(),
            });
        }
        if xs.windows(2).any(|w| w[1] < w[0]) {
            return Err(Error::InvalidParameter {
                name: "knots",
                value: format!("{xs:?}"),
                reason: "abscissae must be non-decreasing".into(),
            });
        }

        let mut spans = (0..xs.len().saturating_sub(1)).filter(|&i| xs[i + 1] > xs[i]);
        let first = spans.next().ok_or_else(|| Error::InvalidParameter {
            name: "knots",
            value: format!("{xs:?}"),
            reason: "need at least two distinct abscissae".into(),
        })?;
        let last = spans.last().unwrap_or(first);

        Ok(Self { xs, ys, first, last })
    }

    pub fn knots(&self) -> (&[f64], &[f64]) {
        (&self.xs, &self.ys)
    }

    /// Evaluate at `x`; NaN in, NaN out
    pub fn eval(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        let segment = if x < self.xs[self.first] {
            self.first
        } else if x >= self.xs[self.last + 1] {
            self.last
        } else {
            // first knot strictly greater than x; xs[i] <= x < xs[i + 1]
            self.xs.partition_point(|&k| k <= x).saturating_sub(1)
        };
        self.eval_segment(segment, x)
    }

    fn eval_segment(&self, i: usize, x: f64) -> f64 {
        let (x0, x1) = (self.xs[i], self.xs[i + 1]);
        let (y0, y1) = (self.ys[i], self.ys[i + 1]);
        y0 + (x - x0) * (y1 - y0) / (x1 - x0)
    }

    /// The same knots with the axes swapped
    pub fn inverse(&self) -> Result<Self> {
        Self::new(self.ys.clone(), self.xs.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_gradient_linear_is_constant() {
        let y: Vec<f64> = (0..10).map(|i| 3.0 * i as f64 + 1.0).collect();
        assert!(gradient(&y).iter().all(|g| (g - 3.0).abs() < 1e-12));
    }

    #[test]
    fn test_gradient_quadratic() {
        let y = [0.0, 1.0, 4.0, 9.0, 16.0];
        assert_eq!(gradient(&y), vec![1.0, 2.0, 4.0, 6.0, 7.0]);
    }

    #[test]
    fn test_gradient_short() {
        assert_eq!(gradient(&[5.0]), vec![0.0]);
        assert_eq!(gradient(&[1.0, 4.0]), vec![3.0, 3.0]);
        assert!(gradient(&[]).is_empty());
    }

    #[test]
    fn test_lerp_at_clamps() {
        let v = [0.0, 10.0, 20.0];
        assert_relative_eq!(lerp_at(&v, 0.25), 2.5);
        assert_relative_eq!(lerp_at(&v, 1.5), 15.0);
        assert_relative_eq!(lerp_at(&v, -4.0), 0.0);
        assert_relative_eq!(lerp_at(&v, 9.0), 20.0);
        assert_relative_eq!(lerp_at(&v, 2.0), 20.0);
    }

    #[test]
    fn test_piecewise_interpolates_and_extrapolates() {
        let f = PiecewiseLinear::new(vec![0.0, 10.0, 20.0], vec![0.0, 5.0, 25.0]).unwrap();
        assert_relative_eq!(f.eval(5.0), 2.5);
        assert_relative_eq!(f.eval(10.0), 5.0);
        assert_relative_eq!(f.eval(15.0), 15.0);
        assert_relative_eq!(f.eval(-2.0), -1.0);
        assert_relative_eq!(f.eval(22.0), 29.0);
    }

    #[test]
    fn test_piecewise_duplicate_knots() {
        let f = PiecewiseLinear::new(vec![0.0, 5.0, 5.0, 10.0], vec![0.0, 1.0, 3.0, 4.0]).unwrap();
        assert_relative_eq!(f.eval(2.5), 0.5);
        assert_relative_eq!(f.eval(5.0), 3.0);
        assert_relative_eq!(f.eval(7.5), 3.5);
    }

    #[test]
    fn test_piecewise_non_finite_input() {
        let f = PiecewiseLinear::new(vec![0.0, 10.0], vec![0.0, 1.0]).unwrap();
        assert!(f.eval(f64::NAN).is_nan());
        assert_eq!(f.eval(f64::INFINITY), f64::INFINITY);
        assert_eq!(f.eval(f64::NEG_INFINITY), f64::NEG_INFINITY);
    }

    #[test]
    fn test_piecewise_inverse() {
        let f = PiecewiseLinear::new(vec![0.0, 100.0, 365.0], vec![0.0, 120.0, 365.0]).unwrap();
        let g = f.inverse().unwrap();
        for x in [0.0, 37.0, 100.0, 250.0, 364.0] {
            assert_relative_eq!(g.eval(f.eval(x)), x, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_piecewise_rejects_bad_knots() {
        assert!(PiecewiseLinear::new(vec![0.0, 1.0], vec![0.0]).is_err());
        assert!(PiecewiseLinear::new(vec![2.0, 1.0], vec![0.0, 1.0]).is_err());
        assert!(PiecewiseLinear::new(vec![1.0, 1.0], vec![0.0, 1.0]).is_err());
        assert!(PiecewiseLinear::new(vec![0.0, f64::NAN], vec![0.0, 1.0]).is_err());
    }
}
