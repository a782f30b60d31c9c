use circuit::gate::Circuit;
use criterion::{criterion_group, criterion_main, Criterion};
use std::time::Duration;

fn bench_adder4_circuit_eval(c: &mut Criterion) {
    c.bench_function("adder4_circuit_eval", |b| {
        let circ = Circuit::load("circuit_files/scapi/adder4.txt").unwrap();
        let inputs = vec![true; circ.number_of_inputs()];
        b.iter(|| {
            let res = circ.eval(&inputs).unwrap();
            criterion::black_box(res);
        });
    });
}

fn bench_adder4_parse(c: &mut Criterion) {
    c.bench_function("adder4_parse", |b| {
        let text = std::fs::read_to_string("circuit_files/scapi/adder4.txt").unwrap();
        b.iter(|| {
            let circ = Circuit::parse(&text).unwrap();
            criterion::black_box(circ);
        });
    });
}

criterion_group! {
    name = circuit_eval;
    config = Criterion::default().warm_up_time(Duration::from_millis(100));
    targets = bench_adder4_circuit_eval, bench_adder4_parse
}
criterion_main!(circuit_eval);
