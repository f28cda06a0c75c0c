use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::Rng;
use skip_index::skiplist::Index;
use std::collections::BTreeSet;

const NUM_OF_OPERATIONS: usize = 100;

fn bench_btreeset_insert(c: &mut Criterion) {
    c.bench_function("bench btreeset insert", |b| {
        b.iter(|| {
            let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([1, 1, 1, 1]);
            let mut set = BTreeSet::new();
            for _ in 0..NUM_OF_OPERATIONS {
                set.insert(rng.next_u32());
            }
        })
    });
}

fn bench_index_insert(c: &mut Criterion) {
    c.bench_function("bench index insert", |b| {
        b.iter(|| {
            let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([1, 1, 1, 1]);
            let mut index = Index::new();
            for _ in 0..NUM_OF_OPERATIONS {
                index.insert(rng.next_u32());
            }
        })
    });
}

fn bench_index_find(c: &mut Criterion) {
    let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([1, 1, 1, 1]);
    let mut index = Index::new();
    let mut values = Vec::new();
    for _ in 0..NUM_OF_OPERATIONS {
        let key = rng.next_u32();
        index.insert(key);
        values.push(key);
    }

    c.bench_function("bench index find", move |b| {
        b.iter(|| {
            for key in &values {
                black_box(index.find(key));
            }
        })
    });
}

fn bench_index_remove(c: &mut Criterion) {
    c.bench_function("bench index remove", |b| {
        b.iter(|| {
            let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([1, 1, 1, 1]);
            let mut index = Index::new();
            let mut values = Vec::new();
            for _ in 0..NUM_OF_OPERATIONS {
                let key = rng.next_u32();
                index.insert(key);
                values.push(key);
            }
            for key in &values {
                black_box(index.remove(key));
            }
        })
    });
}

criterion_group!(
    benches,
    bench_btreeset_insert,
    bench_index_insert,
    bench_index_find,
    bench_index_remove
);
criterion_main!(benches);
