use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use percolate::cluster::Algorithm;
use percolate::OccupancyGrid;
use rand::prelude::*;

fn bench_labeling(c: &mut Criterion) {
    let mut group = c.benchmark_group("label_clusters");

    // Near the square-lattice threshold, where clusters are largest and most tangled.
    let mut rng = StdRng::seed_from_u64(42);
    let p = 0.5927;

    for n in [64usize, 256, 512] {
        let grid = OccupancyGrid::random(n, p, &mut rng).unwrap();

        for algorithm in Algorithm::ALL {
            group.bench_with_input(BenchmarkId::new(algorithm.as_str(), n), &grid, |b, grid| {
                b.iter(|| {
                    algorithm
                        .labeler()
                        .label_clusters(black_box(grid), false)
                        .unwrap()
                })
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_labeling);
criterion_main!(benches);
