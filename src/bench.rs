//! Wall-clock benchmark harness for the packing codecs.
//!
//! Times `compress`, `decompress`, and random `get` over synthetic
//! workloads and prints one JSON record per (case, operation) with median
//! and p95 nanoseconds plus the observed compression ratio. Criterion
//! covers micro-benchmarks under `benches/`; this harness backs the CLI
//! `bench` subcommand with directly parseable output.

use std::hint::black_box;
use std::time::Instant;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::error::Result;
use crate::factory;
use crate::traits::BitPacking;

const WORKLOAD_LEN: usize = 10_000;
const WARMUP: usize = 3;
const REPEATS: usize = 10;
const GET_SAMPLES: usize = 10_000;

/// One benchmark observation, printed as a JSON line.
#[derive(Debug, Serialize)]
pub struct BenchRecord {
    /// Workload name: `small`, `medium`, or `skewed`.
    pub case: &'static str,
    /// Codec variant under test.
    #[serde(rename = "impl")]
    pub implementation: String,
    /// Element count of the workload.
    pub n: usize,
    /// Effective slot width chosen by the codec.
    pub k: u32,
    /// Operation: `compress`, `get`, or `decompress`.
    pub op: &'static str,
    /// Median per-operation time in nanoseconds.
    pub median_ns: u64,
    /// 95th-percentile per-operation time in nanoseconds.
    pub p95_ns: u64,
    /// Raw bits over stored bits for the workload.
    pub ratio: f64,
}

/// Linear-interpolation percentile of unsorted samples, `p` in `[0, 1]`.
pub(crate) fn percentile(samples: &[f64], p: f64) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("timings are finite"));
    let rank = (sorted.len() - 1) as f64 * p;
    let lo = rank.floor() as usize;
    let hi = lo + 1;
    if hi >= sorted.len() {
        return sorted[sorted.len() - 1];
    }
    sorted[lo] * (hi as f64 - rank) + sorted[hi] * (rank - lo as f64)
}

fn workload(case: &'static str, rng: &mut impl Rng) -> Vec<u32> {
    match case {
        "small" => (0..WORKLOAD_LEN).map(|_| rng.gen_range(0..=255)).collect(),
        "medium" => (0..WORKLOAD_LEN)
            .map(|_| rng.gen_range(0..=65_535))
            .collect(),
        "skewed" => {
            let outliers = WORKLOAD_LEN / 100;
            let mut data: Vec<u32> = (0..WORKLOAD_LEN - outliers)
                .map(|_| rng.gen_range(0..=10))
                .collect();
            data.extend((0..outliers).map(|_| rng.gen_range(10_000..=100_000)));
            data.shuffle(rng);
            data
        }
        other => unreachable!("no workload named {other}"),
    }
}

/// Run the full benchmark matrix for one codec variant, printing a JSON
/// record per line.
pub fn run_benchmarks(name: &str, overflow_threshold: f64) -> Result<()> {
    let mut rng = rand::thread_rng();

    for case in ["small", "medium", "skewed"] {
        let data = workload(case, &mut rng);
        let mut bp = factory::get_bitpacking(name, overflow_threshold)?;
        let envelope = bp.compress(&data)?;
        let k = bp.width();
        let ratio = envelope.raw_bits() as f64 / envelope.stored_bits() as f64;

        let record = |op, median_ns: f64, p95_ns: f64| BenchRecord {
            case,
            implementation: name.to_string(),
            n: data.len(),
            k,
            op,
            median_ns: median_ns as u64,
            p95_ns: p95_ns as u64,
            ratio,
        };

        // compress
        let mut timings = Vec::with_capacity(REPEATS);
        for _ in 0..WARMUP {
            black_box(bp.compress(&data)?);
        }
        for _ in 0..REPEATS {
            let start = Instant::now();
            black_box(bp.compress(&data)?);
            timings.push(start.elapsed().as_nanos() as f64);
        }
        let rec = record("compress", percentile(&timings, 0.5), percentile(&timings, 0.95));
        println!("{}", serde_json::to_string(&rec)?);

        // get over a random index sequence, reported per operation
        let indices: Vec<usize> = (0..GET_SAMPLES)
            .map(|_| rng.gen_range(0..data.len()))
            .collect();
        for &i in indices.iter().take(100) {
            black_box(bp.get(i)?);
        }
        let mut timings = Vec::with_capacity(REPEATS);
        for _ in 0..REPEATS {
            let start = Instant::now();
            for &i in &indices {
                black_box(bp.get(i)?);
            }
            timings.push(start.elapsed().as_nanos() as f64 / indices.len() as f64);
        }
        let rec = record("get", percentile(&timings, 0.5), percentile(&timings, 0.95));
        println!("{}", serde_json::to_string(&rec)?);

        // decompress
        let mut timings = Vec::with_capacity(REPEATS);
        for _ in 0..WARMUP {
            black_box(bp.decompress()?);
        }
        for _ in 0..REPEATS {
            let start = Instant::now();
            black_box(bp.decompress()?);
            timings.push(start.elapsed().as_nanos() as f64);
        }
        let rec = record(
            "decompress",
            percentile(&timings, 0.5),
            percentile(&timings, 0.95),
        );
        println!("{}", serde_json::to_string(&rec)?);
    }

    Ok(())
}
