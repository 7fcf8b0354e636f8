//! Local-maximum peak detection with height and spacing constraints

use serde::{Deserialize, Serialize};

/// Constraints on accepted peaks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakParams {
    /// Minimum peak value (inclusive)
    pub min_height: f64,
    /// Minimum index spacing between two kept peaks
    pub min_distance: usize,
}

impl Default for PeakParams {
    fn default() -> Self {
        Self {
            min_height: 1e-4,
            min_distance: 20,
        }
    }
}

/// Find peak indices in `signal`, in ascending order.
///
/// A peak is a sample strictly greater than its left neighbor and greater
/// than the first differing sample on its right; flat tops report their
/// middle index. End samples are never peaks. Peaks below `min_height` are
/// dropped, then peaks are visited from the highest down and every lower
/// peak closer than `min_distance` to a kept one is suppressed.
pub fn find_peaks(signal: &[f64], params: &PeakParams) -> Vec<usize> {
    let mut peaks: Vec<usize> = local_maxima(signal)
        .into_iter()
        .filter(|&i| signal[i] >= params.min_height)
        .collect();

    if params.min_distance > 1 && peaks.len() > 1 {
        peaks = suppress_close(signal, &peaks, params.min_distance);
    }
    peaks
}

fn local_maxima(x: &[f64]) -> Vec<usize> {
    let mut maxima = Vec::new();
    if x.len() < 3 {
        return maxima;
    }
    let last = x.len() - 1;

    let mut i = 1;
    while i < last {
        if x[i - 1] < x[i] {
            let mut ahead = i + 1;
            while ahead < last && x[ahead] == x[i] {
                ahead += 1;
            }
            if x[ahead] < x[i] {
                maxima.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    maxima
}

fn suppress_close(x: &[f64], peaks: &[usize], distance: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..peaks.len()).collect();
    order.sort_by(|&a, &b| x[peaks[a]].total_cmp(&x[peaks[b]]));

    let mut keep = vec![true; peaks.len()];
    for &i in order.iter().rev() {
        if !keep[i] {
            continue;
        }
        for j in (0..i).rev() {
            if peaks[i] - peaks[j] >= distance {
                break;
            }
            keep[j] = false;
        }
        for j in i + 1..peaks.len() {
            if peaks[j] - peaks[i] >= distance {
                break;
            }
            keep[j] = false;
        }
    }

    peaks
        .iter()
        .zip(keep)
        .filter_map(|(&p, k)| k.then_some(p))
        .collect()
}
