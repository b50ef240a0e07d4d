use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

use avlbst::AvlTreeMap;

const N: usize = 100_000;

pub fn benchmarks(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    let values: Vec<i32> = (1..=N).map(|_| rng.gen()).collect();

    c.bench_function("map_insert", |b| {
        b.iter_batched(
            AvlTreeMap::new,
            |mut map| {
                for value in &values {
                    map.insert(*value, *value);
                }
                map
            },
            BatchSize::LargeInput,
        )
    });

    let map: AvlTreeMap<i32, i32> = values.iter().map(|value| (*value, *value)).collect();

    c.bench_function("map_get", |b| {
        b.iter(|| {
            for value in &values {
                black_box(map.get(value));
            }
        })
    });

    c.bench_function("map_iter", |b| {
        b.iter(|| {
            for (k, v) in &map {
                black_box((k, v));
            }
        })
    });

    c.bench_function("map_remove", |b| {
        b.iter_batched(
            || map.clone(),
            |mut map| {
                for value in &values {
                    map.remove(value);
                }
                map
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, benchmarks);
criterion_main!(benches);
