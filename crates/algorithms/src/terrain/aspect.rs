//! Aspect from a DEM

use std::f64::consts::TAU;
use terroir_core::{Algorithm, Error, Raster, Result};

use super::horn_differences;
use crate::maybe_rayon::*;

/// Gradients below this are treated as flat
const FLAT_THRESHOLD: f64 = 1e-10;

/// Value written for flat, edge and no-data cells
pub const NO_ASPECT: f64 = -1.0;

/// Aspect algorithm
#[derive(Debug, Clone, Default)]
pub struct Aspect;

impl Algorithm for Aspect {
    type Input = Raster<f64>;
    type Output = Raster<f64>;
    type Params = ();
    type Error = Error;

    fn name(&self) -> &'static str {
        "Aspect"
    }

    fn description(&self) -> &'static str {
        "Direction of steepest descent in degrees clockwise from north"
    }

    fn execute(&self, input: Self::Input, _params: Self::Params) -> Result<Self::Output> {
        aspect(&input)
    }
}

/// Aspect in degrees clockwise from north: 0 = N, 90 = E, 180 = S, 270 = W.
///
/// Flat, edge and no-data cells are -1.
pub fn aspect(dem: &Raster<f64>) -> Result<Raster<f64>> {
    let (rows, cols) = dem.shape();
    let view = dem.view();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![NO_ASPECT; cols];
            for (col, cell) in row_data.iter_mut().enumerate() {
                let Some((dx, dy)) = horn_differences(&view, row, col, |v| dem.is_nodata(v)) else {
                    continue;
                };
                if dx.abs() < FLAT_THRESHOLD && dy.abs() < FLAT_THRESHOLD {
                    continue;
                }
                // Descent points along (-dx east, +dy north) since rows run south.
                *cell = (-dx).atan2(dy).rem_euclid(TAU).to_degrees();
            }
            row_data
        })
        .collect();

    dem.derive(data, Some(NO_ASPECT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ramp(rows: usize, cols: usize, f: impl Fn(usize, usize) -> f64) -> Raster<f64> {
        let mut dem = Raster::new(rows, cols);
        for row in 0..rows {
            for col in 0..cols {
                dem.set(row, col, f(row, col)).unwrap();
            }
        }
        dem
    }

    #[test]
    fn test_south_facing() {
        // Elevation drops toward the bottom rows
        let dem = ramp(5, 5, |row, _| 100.0 - 10.0 * row as f64);
        assert_relative_eq!(aspect(&dem).unwrap().get(2, 2).unwrap(), 180.0, epsilon = 1e-9);
    }

    #[test]
    fn test_east_and_west_facing() {
        let east = ramp(5, 5, |_, col| 100.0 - 10.0 * col as f64);
        let west = ramp(5, 5, |_, col| 10.0 * col as f64);
        assert_relative_eq!(aspect(&east).unwrap().get(2, 2).unwrap(), 90.0, epsilon = 1e-9);
        assert_relative_eq!(aspect(&west).unwrap().get(2, 2).unwrap(), 270.0, epsilon = 1e-9);
    }

    #[test]
    fn test_north_facing() {
        let dem = ramp(5, 5, |row, _| 10.0 * row as f64);
        let value = aspect(&dem).unwrap().get(2, 2).unwrap();
        assert!(value < 1e-9 || (360.0 - value) < 1e-9, "got {value}");
    }

    #[test]
    fn test_flat_and_edges() {
        let dem: Raster<f64> = Raster::filled(4, 4, 250.0);
        let result = aspect(&dem).unwrap();
        assert_eq!(result.get(1, 1).unwrap(), NO_ASPECT);
        assert_eq!(result.get(0, 0).unwrap(), NO_ASPECT);
    }
}
