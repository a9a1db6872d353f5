//! Benchmarks for the packing codecs.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use kbits::{get_bitpacking, BitPacking};
use rand::Rng;

const VARIANTS: [&str; 3] = ["noncross", "cross", "overflow"];

fn workload(n: usize) -> Vec<u32> {
    let mut rng = rand::thread_rng();
    // Mostly small values with 1% outliers, so the overflow variant has
    // something to do.
    (0..n)
        .map(|i| {
            if i % 100 == 99 {
                rng.gen_range(10_000..=100_000)
            } else {
                rng.gen_range(0..=255)
            }
        })
        .collect()
}

fn bench_compress(c: &mut Criterion) {
    let mut group = c.benchmark_group("compress");

    for n in [1_000, 10_000, 100_000] {
        let data = workload(n);
        group.throughput(Throughput::Elements(n as u64));
        for name in VARIANTS {
            let mut bp = get_bitpacking(name, 0.95).unwrap();
            group.bench_with_input(BenchmarkId::new(name, n), &data, |bench, data| {
                bench.iter(|| bp.compress(black_box(data)).unwrap())
            });
        }
    }

    group.finish();
}

fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("get");

    for n in [1_000, 100_000] {
        let data = workload(n);
        let mut rng = rand::thread_rng();
        let indices: Vec<usize> = (0..1_000).map(|_| rng.gen_range(0..n)).collect();

        group.throughput(Throughput::Elements(indices.len() as u64));
        for name in VARIANTS {
            let mut bp = get_bitpacking(name, 0.95).unwrap();
            bp.compress(&data).unwrap();
            group.bench_with_input(BenchmarkId::new(name, n), &indices, |bench, indices| {
                bench.iter(|| {
                    for &i in indices {
                        black_box(bp.get(black_box(i)).unwrap());
                    }
                })
            });
        }
    }

    group.finish();
}

fn bench_decompress(c: &mut Criterion) {
    let mut group = c.benchmark_group("decompress");

    for n in [1_000, 10_000, 100_000] {
        let data = workload(n);
        group.throughput(Throughput::Elements(n as u64));
        for name in VARIANTS {
            let mut bp = get_bitpacking(name, 0.95).unwrap();
            bp.compress(&data).unwrap();
            group.bench_with_input(BenchmarkId::new(name, n), &n, |bench, _| {
                bench.iter(|| bp.decompress().unwrap())
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_compress, bench_get, bench_decompress);
criterion_main!(benches);
