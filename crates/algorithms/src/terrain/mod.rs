//! Terrain derivatives used by the suitability criteria
//!
//! - Slope: steepness in degrees
//! - Aspect: compass direction of steepest descent
//!
//! Both use Horn's (1981) 3x3 finite differences. Edge cells and cells whose
//! neighborhood touches no-data have no value.

mod aspect;
mod slope;

pub use aspect::{aspect, Aspect, NO_ASPECT};
pub use slope::{slope, Slope, SlopeParams};

use ndarray::ArrayView2;

/// Horn partial sums `(dz/dx, dz/dy)` at an interior cell, before scaling
/// by cell size. `dz/dy` grows with the row index (southward).
///
/// ```text
/// a b c
/// d e f
/// g h i
/// ```
pub(crate) fn horn_differences(
    data: &ArrayView2<'_, f64>,
    row: usize,
    col: usize,
    is_nodata: impl Fn(f64) -> bool,
) -> Option<(f64, f64)> {
    let (rows, cols) = data.dim();
    if row == 0 || col == 0 || row + 1 >= rows || col + 1 >= cols {
        return None;
    }

    let at = |r: usize, c: usize| data[[r, c]];
    let window = [
        at(row - 1, col - 1),
        at(row - 1, col),
        at(row - 1, col + 1),
        at(row, col - 1),
        at(row, col),
        at(row, col + 1),
        at(row + 1, col - 1),
        at(row + 1, col),
        at(row + 1, col + 1),
    ];
    if window.iter().any(|&v| is_nodata(v)) {
        return None;
    }
    let [a, b, c, d, _, f, g, h, i] = window;

    let dz_dx = (c + 2.0 * f + i) - (a + 2.0 * d + g);
    let dz_dy = (g + 2.0 * h + i) - (a + 2.0 * b + c);
    Some((dz_dx, dz_dy))
}
