//! Savitzky–Golay smoothing
//!
//! Each output sample is the value at the window center of the least-squares
//! polynomial fitted to the surrounding `window` samples. Samples closer to
//! an end than half a window are taken from the polynomial fitted to the
//! first (or last) full window, evaluated at their own position.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use terroir_core::{Error, Result};

/// Parameters for Savitzky–Golay smoothing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingParams {
    /// Window width in samples (odd)
    pub window: usize,
    /// Degree of the local polynomial
    pub polyorder: usize,
}

impl Default for SmoothingParams {
    fn default() -> Self {
        Self {
            window: 31,
            polyorder: 3,
        }
    }
}

/// A Savitzky–Golay filter with precomputed weights.
///
/// Row `k` of the weight matrix maps the samples of one window to the fitted
/// value at window position `k`; the center row is the usual convolution
/// kernel.
#[derive(Debug, Clone)]
pub struct SavitzkyGolay {
    weights: Array2<f64>,
}

impl SavitzkyGolay {
    pub fn new(params: SmoothingParams) -> Result<Self> {
        let SmoothingParams { window, polyorder } = params;
        if window == 0 || window % 2 == 0 {
            return Err(Error::InvalidParameter {
                name: "window",
                value: window.to_string(),
                reason: "window must be a positive odd number".into(),
            });
        }
        if polyorder >= window {
            return Err(Error::InvalidParameter {
                name: "polyorder",
                value: polyorder.to_string(),
                reason: format!("polyorder must be less than window ({window})"),
            });
        }

        let half = (window / 2) as f64;
        let terms = polyorder + 1;
        // Vandermonde matrix over window offsets -half..=half
        let vander = Array2::from_shape_fn((window, terms), |(i, j)| (i as f64 - half).powi(j as i32));
        let normal = vander.t().dot(&vander);

        let mut weights = Array2::zeros((window, window));
        for k in 0..window {
            let coeffs = solve(&normal, &vander.row(k).to_owned())?;
            weights.row_mut(k).assign(&vander.dot(&coeffs));
        }

        Ok(Self { weights })
    }

    pub fn window(&self) -> usize {
        self.weights.nrows()
    }

    /// Smooth `values`, returning a new sequence of the same length.
    ///
    /// Fails with [`Error::WindowTooLarge`] when the window is wider than
    /// the input.
    pub fn smooth(&self, values: &[f64]) -> Result<Vec<f64>> {
        let n = values.len();
        let w = self.window();
        if w > n {
            return Err(Error::WindowTooLarge { window: w, len: n });
        }
        let half = w / 2;

        let apply = |row: usize, start: usize| -> f64 {
            self.weights
                .row(row)
                .iter()
                .zip(&values[start..start + w])
                .map(|(c, y)| c * y)
                .sum()
        };

        let mut out = vec![0.0; n];
        for (k, slot) in out.iter_mut().enumerate().take(half) {
            *slot = apply(k, 0);
        }
        for center in half..n - half {
            out[center] = apply(half, center - half);
        }
        for k in half + 1..w {
            out[n - w + k] = apply(k, n - w);
        }
        Ok(out)
    }
}

/// Solve a small dense system by Gaussian elimination with partial pivoting.
fn solve(matrix: &Array2<f64>, rhs: &Array1<f64>) -> Result<Array1<f64>> {
    let n = rhs.len();
    let mut a = matrix.clone();
    let mut b = rhs.clone();

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&i, &j| a[(i, col)].abs().total_cmp(&a[(j, col)].abs()))
            .unwrap_or(col);
        if a[(pivot_row, col)].abs() < 1e-12 {
            return Err(Error::Algorithm(
                "Savitzky-Golay: singular normal matrix".into(),
            ));
        }
        if pivot_row != col {
            for j in 0..n {
                a.swap((col, j), (pivot_row, j));
            }
            b.swap(col, pivot_row);
        }

        let pivot = a[(col, col)];
        for row in col + 1..n {
            let factor = a[(row, col)] / pivot;
            for j in col..n {
                a[(row, j)] -= factor * a[(col, j)];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = Array1::zeros(n);
    for col in (0..n).rev() {
        let tail: f64 = (col + 1..n).map(|j| a[(col, j)] * x[j]).sum();
        x[col] = (b[col] - tail) / a[(col, col)];
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_center_kernel_matches_reference() {
        // Classic 5-point quadratic kernel: (-3, 12, 17, 12, -3) / 35
        let sg = SavitzkyGolay::new(SmoothingParams { window: 5, polyorder: 2 }).unwrap();
        let expected = [-3.0, 12.0, 17.0, 12.0, -3.0];
        for (w, e) in sg.weights.row(2).iter().zip(expected) {
            assert_relative_eq!(*w, e / 35.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_preserves_cubic() {
        let y: Vec<f64> = (0..60)
            .map(|i| {
                let t = i as f64 / 10.0;
                0.3 + 0.2 * t - 0.05 * t * t + 0.004 * t * t * t
            })
            .collect();
        let sg = SavitzkyGolay::new(SmoothingParams::default()).unwrap();
        let smoothed = sg.smooth(&y).unwrap();
        for (a, b) in smoothed.iter().zip(&y) {
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_flat_stays_flat() {
        let sg = SavitzkyGolay::new(SmoothingParams::default()).unwrap();
        let smoothed = sg.smooth(&[0.42; 365]).unwrap();
        assert!(smoothed.iter().all(|v| (v - 0.42).abs() < 1e-12));
    }

    #[test]
    fn test_reduces_alternating_noise() {
        let y: Vec<f64> = (0..100).map(|i| if i % 2 == 0 { 0.05 } else { -0.05 }).collect();
        let sg = SavitzkyGolay::new(SmoothingParams::default()).unwrap();
        let smoothed = sg.smooth(&y).unwrap();
        let max_interior = smoothed[15..85].iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        assert!(max_interior < 0.01, "noise not attenuated: {max_interior}");
    }

    #[test]
    fn test_window_too_large() {
        let sg = SavitzkyGolay::new(SmoothingParams::default()).unwrap();
        assert!(matches!(
            sg.smooth(&[0.1; 20]),
            Err(Error::WindowTooLarge { window: 31, len: 20 })
        ));
    }

    #[test]
    fn test_window_equal_to_length() {
        let sg = SavitzkyGolay::new(SmoothingParams { window: 7, polyorder: 3 }).unwrap();
        let y = [0.1, 0.3, 0.2, 0.5, 0.4, 0.6, 0.5];
        assert_eq!(sg.smooth(&y).unwrap().len(), 7);
    }

    #[test]
    fn test_invalid_params() {
        assert!(SavitzkyGolay::new(SmoothingParams { window: 30, polyorder: 3 }).is_err());
        assert!(SavitzkyGolay::new(SmoothingParams { window: 3, polyorder: 3 }).is_err());
        assert!(SavitzkyGolay::new(SmoothingParams { window: 0, polyorder: 0 }).is_err());
    }
}
