//! Benchmark driver
//!
//! Loads a dataset, runs the selected strategy for a number of warm-up and
//! timed trials, prints per-phase timings, and checks the final output
//! against the reference aggregates.
//!
//! The stdout lines (`>>> run=...`, `>> output has N rows`,
//! `Validation passes`) are the measured interface consumed by the
//! benchmark harness; diagnostics go through `tracing` on stderr.

use anyhow::Context;
use clap::{Arg, ArgMatches, Command};
use groupby_core::{Algorithm, BenchConfig};
use groupby_dataset::{load_dataset, load_validation, validate};
use groupby_exec::{strategy_for, ExecOptions, PhaseTimings};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Build the driver's command tree.
fn build_cli() -> Command {
    Command::new("groupby-bench")
        .about("Parallel group-by aggregation benchmark driver")
        .arg(
            Arg::new("num-threads")
                .long("num-threads")
                .help("Number of worker threads (p >= 1)")
                .required(true),
        )
        .arg(
            Arg::new("algorithm")
                .long("algorithm")
                .help("Aggregation strategy to run")
                .value_parser(Algorithm::NAMES)
                .default_value("sequential"),
        )
        .arg(
            Arg::new("dataset-file-path")
                .long("dataset-file-path")
                .help("Gzipped key,val CSV input")
                .required(true),
        )
        .arg(
            Arg::new("validation-file-path")
                .long("validation-file-path")
                .help("Gzipped key,count,sum,min,max reference CSV")
                .required(true),
        )
        .arg(
            Arg::new("num-dryruns")
                .long("num-dryruns")
                .help("Untimed warm-up runs before measurement")
                .default_value("3"),
        )
        .arg(
            Arg::new("num-trials")
                .long("num-trials")
                .help("Timed trials to run")
                .default_value("5"),
        )
        .arg(
            Arg::new("batch-size")
                .long("batch-size")
                .help("Rows per dynamic-scheduling chunk")
                .default_value("10000"),
        )
        .arg(
            Arg::new("radix-partition-cnt-ratio")
                .long("radix-partition-cnt-ratio")
                .help("Radix partitions per thread (N = p * ratio)")
                .default_value("4"),
        )
        .arg(
            Arg::new("duckdb-style-adaptation-threshold")
                .long("duckdb-style-adaptation-threshold")
                .help("Local-map entry count that triggers late repartitioning")
                .default_value("10000"),
        )
}

fn parse_usize(matches: &ArgMatches, name: &str) -> anyhow::Result<usize> {
    let text = matches
        .get_one::<String>(name)
        .with_context(|| format!("--{name} is required"))?;
    text.parse()
        .with_context(|| format!("--{name} expects a non-negative integer, got {text:?}"))
}

fn config_from_matches(matches: &ArgMatches) -> anyhow::Result<BenchConfig> {
    let algorithm: Algorithm = matches
        .get_one::<String>("algorithm")
        .map(String::as_str)
        .unwrap_or("sequential")
        .parse()?;
    let dataset: PathBuf = matches
        .get_one::<String>("dataset-file-path")
        .map(PathBuf::from)
        .context("--dataset-file-path is required")?;
    let validation: PathBuf = matches
        .get_one::<String>("validation-file-path")
        .map(PathBuf::from)
        .context("--validation-file-path is required")?;

    let mut config = BenchConfig::new(
        parse_usize(matches, "num-threads")?,
        algorithm,
        dataset,
        validation,
    );
    config.num_dryruns = parse_usize(matches, "num-dryruns")?;
    config.num_trials = parse_usize(matches, "num-trials")?;
    config.batch_size = parse_usize(matches, "batch-size")?;
    config.radix_partition_cnt_ratio = parse_usize(matches, "radix-partition-cnt-ratio")?;
    config.duckdb_style_adaptation_threshold =
        parse_usize(matches, "duckdb-style-adaptation-threshold")?;
    Ok(config)
}

fn print_timings(run: usize, timings: &PhaseTimings) {
    for (name, elapsed) in timings.iter() {
        println!(">>> run={run}, {name}={}ms", elapsed.as_millis());
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let matches = build_cli().get_matches();
    let config = config_from_matches(&matches)?;
    config.validate()?;
    info!(
        algorithm = %config.algorithm,
        num_threads = config.num_threads,
        "benchmark configured"
    );

    let table = load_dataset(&config.dataset_file_path)?;
    println!("table.n_rows = {}", table.n_rows());
    println!("table.n_cols = {}", table.n_cols());

    let strategy = strategy_for(config.algorithm);
    let opts = ExecOptions::from_config(&config);

    for dryrun in 0..config.num_dryruns {
        debug!(dryrun, "warm-up run");
        let mut timings = PhaseTimings::new();
        strategy.run(&table, &opts, &mut timings)?;
    }

    let mut last_rows = Vec::new();
    for run in 0..config.num_trials {
        let mut timings = PhaseTimings::new();
        last_rows = strategy.run(&table, &opts, &mut timings)?;
        print_timings(run, &timings);
    }
    println!(">> output has {} rows", last_rows.len());

    let reference = load_validation(&config.validation_file_path)?;
    let checked = validate(&last_rows, &reference)?;
    debug!(checked, "rows checked against reference");
    println!("Validation passes");
    Ok(())
}
