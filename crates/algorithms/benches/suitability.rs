//! Benchmarks for land suitability

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use terroir_algorithms::suitability::{land_suitability, SuitabilityParams};
use terroir_algorithms::synthetic::{lapse_rate_temperature, synthetic_dem};

fn bench_land_suitability(c: &mut Criterion) {
    let mut group = c.benchmark_group("land_suitability");

    for size in [256, 512, 1024].iter() {
        let dem = synthetic_dem(*size, *size, 1);
        let temperature = lapse_rate_temperature(&dem, 18.0);
        let params = SuitabilityParams::default();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| land_suitability(black_box(&dem), black_box(&temperature), &params).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_land_suitability);
criterion_main!(benches);
