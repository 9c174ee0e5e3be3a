use divan::{Bencher, black_box};
use rand::{Rng, SeedableRng, rngs::SmallRng};
use rmq::prelude::*;

fn main() {
    divan::main();
}

const SIZES: [usize; 3] = [1 << 10, 1 << 14, 1 << 18];

const KINDS: [EngineKind; 4] = EngineKind::ALL;

fn setup_rng() -> SmallRng {
    SmallRng::seed_from_u64(42)
}

fn setup_values(len: usize) -> Vec<i64> {
    let mut rng = setup_rng();
    (0..len).map(|_| rng.random_range(-1000..1000)).collect()
}

fn random_range(rng: &mut SmallRng, len: usize) -> (usize, usize) {
    let a = rng.random_range(0..len);
    let b = rng.random_range(0..len);
    (a.min(b), a.max(b))
}

#[divan::bench(args = SIZES, consts = [0, 1, 2, 3])]
fn build<const K: usize>(b: Bencher, len: usize) {
    let values = setup_values(len);
    b.bench_local(|| KINDS[K].build(black_box(&values)).unwrap());
}

#[divan::bench(args = SIZES, consts = [0, 1, 2, 3])]
fn query<const K: usize>(b: Bencher, len: usize) {
    let engine = KINDS[K].build(&setup_values(len)).unwrap();
    let mut rng = setup_rng();
    b.with_inputs(|| random_range(&mut rng, len))
        .bench_local_values(|(l, r)| engine.query(l, r).unwrap());
}

// SparseTable does not support updates
#[divan::bench(args = SIZES, consts = [0, 1, 2])]
fn update<const K: usize>(b: Bencher, len: usize) {
    let mut engine = KINDS[K].build(&setup_values(len)).unwrap();
    let mut rng = setup_rng();
    b.with_inputs(|| (rng.random_range(0..len), rng.random_range(-1000..1000)))
        .bench_local_values(|(i, v)| engine.update(i, v).unwrap());
}
