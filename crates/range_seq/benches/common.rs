use std::hint::black_box;

use bench::{apply_medium_runtime_config, apply_small_runtime_config, default_rng, random_bounds};
use criterion::{BatchSize, BenchmarkId, Criterion};
use rand::Rng;
use rand::rngs::StdRng;

use range_seq::{RangeMinRangeAdd, SplaySeq};

const SIZES: [usize; 4] = [1_000, 4_000, 16_000, 64_000];
const OPS_PER_SIZE: usize = 200;
const VALUE_RANGE: std::ops::RangeInclusive<i64> = -1_000_000_000..=1_000_000_000;
const DELTA_RANGE: std::ops::RangeInclusive<i64> = -1_000..=1_000;

#[derive(Clone, Copy)]
enum Op {
    Add { lo: usize, hi: usize, delta: i64 },
    Reverse { lo: usize, hi: usize },
    Revolve { lo: usize, hi: usize, amount: i64 },
    Insert { pos: usize, value: i64 },
    Delete { pos: usize },
    Min { lo: usize, hi: usize },
}

fn random_values(rng: &mut StdRng, n: usize) -> Vec<i64> {
    (0..n).map(|_| rng.random_range(VALUE_RANGE)).collect()
}

// Op generation tracks the running length so every position stays valid when
// the ops are replayed against a fresh sequence.
fn random_ops(rng: &mut StdRng, initial_len: usize, count: usize) -> Vec<Op> {
    let mut len = initial_len;
    let mut ops = Vec::with_capacity(count);
    while ops.len() < count {
        let op = match rng.random_range(0..6) {
            0 => {
                if len == 0 {
                    continue;
                }
                let (lo, hi) = random_bounds(rng, len);
                Op::Add {
                    lo,
                    hi,
                    delta: rng.random_range(DELTA_RANGE),
                }
            }
            1 => {
                if len == 0 {
                    continue;
                }
                let (lo, hi) = random_bounds(rng, len);
                Op::Reverse { lo, hi }
            }
            2 => {
                if len == 0 {
                    continue;
                }
                let (lo, hi) = random_bounds(rng, len);
                Op::Revolve {
                    lo,
                    hi,
                    amount: rng.random_range(-1_000_i64..=1_000),
                }
            }
            3 => {
                let pos = rng.random_range(0..=len);
                len += 1;
                Op::Insert {
                    pos,
                    value: rng.random_range(VALUE_RANGE),
                }
            }
            4 => {
                if len == 0 {
                    continue;
                }
                let pos = rng.random_range(1..=len);
                len -= 1;
                Op::Delete { pos }
            }
            _ => {
                if len == 0 {
                    continue;
                }
                let (lo, hi) = random_bounds(rng, len);
                Op::Min { lo, hi }
            }
        };
        ops.push(op);
    }
    ops
}

fn run_ops(seq: &mut SplaySeq, ops: &[Op]) -> i64 {
    let mut acc = 0_i64;
    for &op in ops {
        match op {
            Op::Add { lo, hi, delta } => seq.range_add(lo, hi, delta).unwrap(),
            Op::Reverse { lo, hi } => seq.range_reverse(lo, hi).unwrap(),
            Op::Revolve { lo, hi, amount } => seq.range_rotate_right(lo, hi, amount).unwrap(),
            Op::Insert { pos, value } => seq.insert_after(pos, value).unwrap(),
            Op::Delete { pos } => {
                acc = acc.wrapping_add(seq.delete_at(pos).unwrap());
            }
            Op::Min { lo, hi } => {
                acc = acc.wrapping_add(seq.range_min(lo, hi).unwrap());
            }
        }
    }
    acc
}

pub fn bench_build(c: &mut Criterion) {
    let mut rng = default_rng();
    let mut group = c.benchmark_group("range_seq/build");
    apply_small_runtime_config(&mut group);
    for &n in &SIZES {
        let values = random_values(&mut rng, n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &values, |b, values| {
            b.iter(|| SplaySeq::<RangeMinRangeAdd>::new(black_box(values)));
        });
    }
    group.finish();
}

pub fn bench_mixed_workload(c: &mut Criterion) {
    let mut rng = default_rng();
    let mut group = c.benchmark_group("range_seq/mixed");
    apply_medium_runtime_config(&mut group);
    for &n in &SIZES {
        let values = random_values(&mut rng, n);
        let ops = random_ops(&mut rng, n, OPS_PER_SIZE);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter_batched(
                || SplaySeq::new(&values),
                |mut seq| black_box(run_ops(&mut seq, &ops)),
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}
