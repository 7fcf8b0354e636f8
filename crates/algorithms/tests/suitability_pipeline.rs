//! Land suitability over synthetic terrain, feeding site selection.

use terroir_algorithms::sites::{largest_region, sample_sites};
use terroir_algorithms::suitability::{land_suitability, Grade, SuitabilityParams};
use terroir_algorithms::synthetic::{lapse_rate_temperature, synthetic_dem};
use terroir_algorithms::terrain::{aspect, slope, SlopeParams, NO_ASPECT};

#[test]
fn terrain_derivatives_cover_interior() {
    let dem = synthetic_dem(48, 48, 11);
    let slope = slope(&dem, SlopeParams::default()).unwrap();
    let aspect = aspect(&dem).unwrap();

    for row in 1..47 {
        for col in 1..47 {
            let s = slope.get(row, col).unwrap();
            assert!((0.0..90.0).contains(&s), "slope {s} at ({row}, {col})");
            let a = aspect.get(row, col).unwrap();
            assert!(a == NO_ASPECT || (0.0..=360.0).contains(&a));
        }
    }
    assert!(slope.get(0, 10).unwrap().is_nan());
}

#[test]
fn suitability_scores_and_summary_agree() {
    let dem = synthetic_dem(64, 64, 5);
    let temperature = lapse_rate_temperature(&dem, 18.0);
    let map = land_suitability(&dem, &temperature, &SuitabilityParams::default()).unwrap();

    assert_eq!(map.summary.valid_cells, 62 * 62);
    assert_eq!(map.summary.grades.total(), map.summary.valid_cells);

    let min = map.summary.min.unwrap();
    let max = map.summary.max.unwrap();
    assert!(min >= 10.0 && max <= 90.0, "scores span {min}..{max}");

    let prime = map.prime.data().iter().filter(|&&v| v == 1).count();
    assert_eq!(prime, map.summary.prime_cells);
    assert!(map.summary.grades.count(Grade::S) <= map.summary.prime_cells);
}

#[test]
fn reference_region_and_candidates_from_scores() {
    let dem = synthetic_dem(64, 64, 5);
    let temperature = lapse_rate_temperature(&dem, 18.0);
    let map = land_suitability(&dem, &temperature, &SuitabilityParams::default()).unwrap();

    let threshold = map.summary.max.unwrap() - 5.0;
    let region = largest_region(&map.score, threshold).unwrap();
    for &(row, col) in &region.cells {
        assert!(map.score.get(row, col).unwrap() > threshold);
    }
    assert!(region.cells.contains(&region.centroid_cell));

    let sites = sample_sites(&map.score, 25, 99);
    assert_eq!(sites.len(), 25);
    for site in &sites {
        assert!(!map.score.get(site.row, site.col).unwrap().is_nan());
    }
}
