use criterion::{criterion_group, criterion_main, Criterion};
use crypto_core::{AesRng, Block};
use rand_core::{RngCore, SeedableRng};
use std::time::Duration;

fn bench_fill_bytes(c: &mut Criterion) {
    c.bench_function("AesRng::fill_bytes(16KiB)", |b| {
        let mut rng = AesRng::from_seed(Block::from(7u128));
        let mut x = vec![0u8; 16 * 1024];
        b.iter(|| rng.fill_bytes(&mut x));
    });
}

fn bench_gen_blocks(c: &mut Criterion) {
    c.bench_function("AesRng::gen_blocks(1024)", |b| {
        let mut rng = AesRng::from_seed(Block::from(7u128));
        b.iter(|| criterion::black_box(rng.gen_blocks(1024)));
    });
}

fn bench_fork(c: &mut Criterion) {
    c.bench_function("AesRng::fork", |b| {
        let mut rng = AesRng::new();
        b.iter(|| criterion::black_box(rng.fork()));
    });
}

criterion_group! {
    name = aesrng;
    config = Criterion::default().warm_up_time(Duration::from_millis(100));
    targets = bench_fill_bytes, bench_gen_blocks, bench_fork
}
criterion_main!(aesrng);
