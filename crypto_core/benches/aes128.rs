use criterion::{criterion_group, criterion_main, Criterion};
use crypto_core::{Aes128, AesRng, Block};
use rand::Rng;
use std::time::Duration;

fn bench_key_schedule(c: &mut Criterion) {
    c.bench_function("Aes128::new", |b| {
        let mut rng = AesRng::new();
        let key = rng.gen_block();
        b.iter(|| criterion::black_box(Aes128::new(key)));
    });
}

fn bench_encrypt(c: &mut Criterion) {
    let mut rng = AesRng::new();
    let aes = Aes128::new(rng.gen_block());
    let x = rng.gen_block();
    let x8 = rng.gen::<[Block; 8]>();
    c.bench_function("Aes128::encrypt", |b| b.iter(|| criterion::black_box(aes.encrypt(x))));
    c.bench_function("Aes128::encrypt8", |b| b.iter(|| criterion::black_box(aes.encrypt8(x8))));
}

fn bench_encrypt_blocks(c: &mut Criterion) {
    c.bench_function("Aes128::encrypt_blocks(1024)", |b| {
        let mut rng = AesRng::new();
        let aes = Aes128::new(rng.gen_block());
        let mut blocks = rng.gen_blocks(1024);
        b.iter(|| aes.encrypt_blocks(&mut blocks));
    });
}

// One no-fixed-key gate: four wire keys, two tweaks each.
fn bench_para_encrypt_gate(c: &mut Criterion) {
    c.bench_function("Aes128::para_encrypt(4x2)", |b| {
        let mut rng = AesRng::new();
        let keys = rng.gen::<[Block; 4]>();
        let tweaks = rng.gen::<[[Block; 2]; 4]>();
        b.iter(|| criterion::black_box(Aes128::para_encrypt(keys, tweaks)));
    });
}

criterion_group! {
    name = aes128;
    config = Criterion::default().warm_up_time(Duration::from_millis(100));
    targets = bench_key_schedule, bench_encrypt, bench_encrypt_blocks, bench_para_encrypt_gate
}
criterion_main!(aes128);
