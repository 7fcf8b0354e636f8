//! Candidate and reference sites from score rasters
//!
//! The reference site is the centroid of the largest connected patch of
//! high-scoring cells; candidate sites are a seeded random sample of valid
//! cells.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use terroir_core::{Raster, Site};

/// A connected patch of cells above a threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Member cells as (row, col)
    pub cells: Vec<(usize, usize)>,
    /// Member cell closest to the mean position
    pub centroid_cell: (usize, usize),
    /// Map coordinates of the centroid cell center
    pub centroid: (f64, f64),
}

impl Region {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The centroid cell as a [`Site`]
    pub fn site(&self, id: usize) -> Site {
        let (row, col) = self.centroid_cell;
        let (x, y) = self.centroid;
        Site { id, row, col, x, y }
    }
}

/// 8-connected regions of cells scoring strictly above `threshold`, in
/// row-major order of their first cell.
pub fn regions(raster: &Raster<f64>, threshold: f64) -> Vec<Region> {
    let (rows, cols) = raster.shape();
    let data = raster.data();
    let inside = |r: usize, c: usize| {
        let v = data[[r, c]];
        !raster.is_nodata(v) && v > threshold
    };

    let mut visited = Array2::<bool>::from_elem((rows, cols), false);
    let mut found = Vec::new();

    for r in 0..rows {
        for c in 0..cols {
            if visited[[r, c]] || !inside(r, c) {
                continue;
            }

            let mut cells = Vec::new();
            let mut stack = vec![(r, c)];
            visited[[r, c]] = true;

            while let Some((cr, cc)) = stack.pop() {
                cells.push((cr, cc));
                for nr in cr.saturating_sub(1)..=(cr + 1).min(rows - 1) {
                    for nc in cc.saturating_sub(1)..=(cc + 1).min(cols - 1) {
                        if !visited[[nr, nc]] && inside(nr, nc) {
                            visited[[nr, nc]] = true;
                            stack.push((nr, nc));
                        }
                    }
                }
            }

            cells.sort_unstable();
            found.push(region_from_cells(raster, cells));
        }
    }

    found
}

/// The largest region above `threshold`; ties go to the first found.
/// `None` when no cell clears the threshold.
pub fn largest_region(raster: &Raster<f64>, threshold: f64) -> Option<Region> {
    regions(raster, threshold)
        .into_iter()
        .fold(None, |best: Option<Region>, region| match best {
            Some(b) if b.len() >= region.len() => Some(b),
            _ => Some(region),
        })
}

fn region_from_cells(raster: &Raster<f64>, cells: Vec<(usize, usize)>) -> Region {
    let n = cells.len() as f64;
    let mean_row = cells.iter().map(|&(r, _)| r as f64).sum::<f64>() / n;
    let mean_col = cells.iter().map(|&(_, c)| c as f64).sum::<f64>() / n;

    let distance = |&(r, c): &(usize, usize)| {
        let dr = r as f64 - mean_row;
        let dc = c as f64 - mean_col;
        dr * dr + dc * dc
    };
    let centroid_cell = cells
        .iter()
        .copied()
        .min_by(|a, b| distance(a).total_cmp(&distance(b)))
        .unwrap_or((0, 0));

    Region {
        centroid: raster.cell_center(centroid_cell.0, centroid_cell.1),
        centroid_cell,
        cells,
    }
}

/// Seeded sample of up to `count` distinct valid cells as sites.
///
/// Site ids run 0..n in sampling order. The same seed and raster always give
/// the same sites.
pub fn sample_sites(raster: &Raster<f64>, count: usize, seed: u64) -> Vec<Site> {
    let (rows, cols) = raster.shape();
    let data = raster.data();
    let valid: Vec<(usize, usize)> = (0..rows)
        .flat_map(|r| (0..cols).map(move |c| (r, c)))
        .filter(|&(r, c)| !raster.is_nodata(data[[r, c]]))
        .collect();

    let mut rng = StdRng::seed_from_u64(seed);
    valid
        .choose_multiple(&mut rng, count)
        .enumerate()
        .map(|(id, &(row, col))| {
            let (x, y) = raster.cell_center(row, col);
            Site { id, row, col, x, y }
        })
        .collect()
}
