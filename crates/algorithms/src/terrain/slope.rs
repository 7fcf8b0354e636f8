//! Slope from a DEM

use serde::{Deserialize, Serialize};
use terroir_core::{Algorithm, Error, Raster, Result};

use super::horn_differences;
use crate::maybe_rayon::*;

/// Parameters for slope calculation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlopeParams {
    /// Horizontal units per elevation unit; use ~111320 for lat/lon DEMs in meters
    pub z_factor: f64,
}

impl Default for SlopeParams {
    fn default() -> Self {
        Self { z_factor: 1.0 }
    }
}

/// Slope algorithm
#[derive(Debug, Clone, Default)]
pub struct Slope;

impl Algorithm for Slope {
    type Input = Raster<f64>;
    type Output = Raster<f64>;
    type Params = SlopeParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Slope"
    }

    fn description(&self) -> &'static str {
        "Slope in degrees from a DEM using Horn's method"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        slope(&input, params)
    }
}

/// Slope in degrees (0-90).
///
/// dz/dx = ((c + 2f + i) - (a + 2d + g)) / (8 * cellsize)
/// dz/dy = ((g + 2h + i) - (a + 2b + c)) / (8 * cellsize)
/// slope = atan(sqrt(dz/dx² + dz/dy²))
///
/// Edge and no-data cells are NaN.
pub fn slope(dem: &Raster<f64>, params: SlopeParams) -> Result<Raster<f64>> {
    if !(params.z_factor > 0.0 && params.z_factor.is_finite()) {
        return Err(Error::InvalidParameter {
            name: "z_factor",
            value: params.z_factor.to_string(),
            reason: "must be positive".into(),
        });
    }

    let (rows, cols) = dem.shape();
    let eight_cell_size = 8.0 * dem.cell_size() * params.z_factor;
    let view = dem.view();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for (col, cell) in row_data.iter_mut().enumerate() {
                if let Some((dx, dy)) = horn_differences(&view, row, col, |v| dem.is_nodata(v)) {
                    let (dx, dy) = (dx / eight_cell_size, dy / eight_cell_size);
                    *cell = (dx * dx + dy * dy).sqrt().atan().to_degrees();
                }
            }
            row_data
        })
        .collect();

    dem.derive(data, Some(f64::NAN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use terroir_core::GeoTransform;

    fn plane(rows: usize, cols: usize, dz_per_col: f64) -> Raster<f64> {
        let mut dem = Raster::new(rows, cols);
        dem.set_transform(GeoTransform::new(0.0, rows as f64, 1.0, -1.0));
        for row in 0..rows {
            for col in 0..cols {
                dem.set(row, col, col as f64 * dz_per_col).unwrap();
            }
        }
        dem
    }

    #[test]
    fn test_flat_is_zero() {
        let dem: Raster<f64> = Raster::filled(6, 6, 420.0);
        let result = slope(&dem, SlopeParams::default()).unwrap();
        assert_relative_eq!(result.get(3, 3).unwrap(), 0.0);
    }

    #[test]
    fn test_45_degree_plane() {
        let result = slope(&plane(7, 7, 1.0), SlopeParams::default()).unwrap();
        assert_relative_eq!(result.get(3, 3).unwrap(), 45.0, epsilon = 1e-10);
        assert_relative_eq!(result.get(1, 5).unwrap(), 45.0, epsilon = 1e-10);
    }

    #[test]
    fn test_edges_and_nodata_are_nan() {
        let mut dem = plane(5, 5, 2.0);
        dem.set(2, 3, f64::NAN).unwrap();
        let result = slope(&dem, SlopeParams::default()).unwrap();
        assert!(result.get(0, 2).unwrap().is_nan());
        assert!(result.get(4, 4).unwrap().is_nan());
        assert!(result.get(2, 2).unwrap().is_nan());
        assert!(!result.get(1, 1).unwrap().is_nan());
    }

    #[test]
    fn test_rejects_zero_z_factor() {
        let dem: Raster<f64> = Raster::new(3, 3);
        assert!(slope(&dem, SlopeParams { z_factor: 0.0 }).is_err());
    }
}
