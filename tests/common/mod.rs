//! Shared helpers for the integration suites.

use flate2::write::GzEncoder;
use flate2::Compression;
use groupby_bench::{run_algorithm, Algorithm, ExecOptions, ResultRow, RowTable};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::io::Write;

/// Sequential baseline output, sorted by key.
pub fn reference_rows(table: &RowTable) -> Vec<ResultRow> {
    let (mut rows, _) =
        run_algorithm(Algorithm::Sequential, table, &ExecOptions::new(1)).unwrap();
    rows.sort();
    rows
}

/// Run `algorithm` and return its output sorted by key.
pub fn run_sorted(
    algorithm: Algorithm,
    table: &RowTable,
    threads: usize,
    batch_size: usize,
) -> Vec<ResultRow> {
    let mut opts = ExecOptions::new(threads);
    opts.batch_size = batch_size;
    let (mut rows, _) = run_algorithm(algorithm, table, &opts).unwrap();
    rows.sort();
    rows
}

/// Skewed workload: ~90% a single hot key with value 0, ~10% uniform keys
/// in `0..1000` with value 1. The shape behind scenario E.
pub fn skewed_rows(n: usize, seed: u64) -> Vec<(i64, i64)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            if rng.gen_range(0..10) == 0 {
                (rng.gen_range(0..1000), 1)
            } else {
                (1, 0)
            }
        })
        .collect()
}

/// Uniform workload: keys uniform in `0..groups`, values in `0..=i16::MAX`.
/// The shape behind scenario F.
pub fn uniform_rows(n: usize, groups: i64, seed: u64) -> Vec<(i64, i64)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| (rng.gen_range(0..groups), rng.gen_range(0..=i16::MAX as i64)))
        .collect()
}

/// Write gzipped content to a fresh temp file.
pub fn write_gz(content: &str) -> tempfile::NamedTempFile {
    let file = tempfile::NamedTempFile::new().unwrap();
    let mut enc = GzEncoder::new(file.reopen().unwrap(), Compression::default());
    enc.write_all(content.as_bytes()).unwrap();
    enc.finish().unwrap();
    file
}

/// Gzipped `key,val` dataset file for the given rows.
pub fn write_dataset(rows: &[(i64, i64)]) -> tempfile::NamedTempFile {
    let mut content = String::from("key,val\n");
    for (k, v) in rows {
        content.push_str(&format!("{k},{v}\n"));
    }
    write_gz(&content)
}

/// Gzipped `key,count,sum,min,max` reference file for the given output.
pub fn write_validation(rows: &[ResultRow]) -> tempfile::NamedTempFile {
    let mut content = String::from("key,count,sum,min,max\n");
    for r in rows {
        content.push_str(&format!(
            "{},{},{},{},{}\n",
            r.key, r.count, r.sum, r.min, r.max
        ));
    }
    write_gz(&content)
}

/// Every parallel algorithm (everything except the sequential baseline).
pub fn parallel_algorithms() -> Vec<Algorithm> {
    vec![
        Algorithm::TwoPhaseCentralMerge,
        Algorithm::TwoPhaseTreeMerge,
        Algorithm::TwoPhaseRadix,
        Algorithm::DuckdbishTwoPhase,
        Algorithm::LockFreeHashTable,
        Algorithm::AdaptiveAlg1,
        Algorithm::AdaptiveAlg2,
        Algorithm::AdaptiveAlg3,
    ]
}
