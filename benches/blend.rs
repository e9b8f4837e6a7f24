use criterion::{criterion_group, criterion_main, Criterion};

use blend_index::blend::{Blend, BlendLimits};
use helpers::catalog::create_catalog;
use rand::{rngs::StdRng, SeedableRng};

fn criterion_benchmark(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);

    const NUM_TRACKS: usize = 10_000;

    let mut data = create_catalog(NUM_TRACKS, 50, NUM_TRACKS - 1, &mut rng);
    let limits = BlendLimits {
        per_playlist: 8,
        capacities: [200, 120, 60],
    };
    let mut blend = Blend::new(&mut data.catalog, &limits);

    // The one track left outside the blend cycles in and out
    let (track, playlist) = data.assignments[NUM_TRACKS - 1];
    c.bench_function("churn", |b| {
        b.iter(|| {
            blend.add(&mut data.catalog, track, playlist);
            blend.remove(&mut data.catalog, track);
        })
    });

    c.bench_function("ask", |b| b.iter(|| blend.ask(&data.catalog)));
}

criterion_group! {
    name = benches;
    config = Criterion::default().significance_level(0.1).sample_size(500);
    targets = criterion_benchmark
}
criterion_main!(benches);
