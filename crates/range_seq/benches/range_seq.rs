use criterion::{Criterion, criterion_group, criterion_main};

mod common;

fn bench(c: &mut Criterion) {
    common::bench_build(c);
    common::bench_mixed_workload(c);
}

criterion_group!(benches, bench);
criterion_main!(benches);
