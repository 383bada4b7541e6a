//! Dataset generator front-end
//!
//! Writes a gzipped `key,val` CSV with a configurable key distribution,
//! for feeding the benchmark driver.

use anyhow::Context;
use clap::{Arg, Command};
use groupby_dataset::generator::{generate, parse_count, Distribution, GeneratorConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn build_cli() -> Command {
    Command::new("groupby-datagen")
        .about("Generate synthetic datasets for the group-by benchmark")
        .arg(
            Arg::new("output")
                .long("output")
                .help("Output path for the gzipped CSV")
                .required(true),
        )
        .arg(
            Arg::new("num-rows")
                .long("num-rows")
                .help("Rows to generate (accepts K/M/B/T suffixes)")
                .default_value("1M"),
        )
        .arg(
            Arg::new("num-groups")
                .long("num-groups")
                .help("Distinct keys (accepts K/M/B/T suffixes)")
                .default_value("1K"),
        )
        .arg(
            Arg::new("distribution")
                .long("distribution")
                .help("Key distribution")
                .value_parser(["uniform", "normal", "exponential"])
                .default_value("uniform"),
        )
        .arg(
            Arg::new("mean")
                .long("mean")
                .help("Mean for the normal distribution, in key space")
                .default_value("0.0"),
        )
        .arg(
            Arg::new("stddev")
                .long("stddev")
                .help("Standard deviation for the normal distribution")
                .default_value("1.0"),
        )
        .arg(
            Arg::new("lambda")
                .long("lambda")
                .help("Rate for the exponential distribution")
                .default_value("5.0"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .help("Fixed RNG seed for reproducible output"),
        )
}

fn arg<'a>(matches: &'a clap::ArgMatches, name: &str) -> &'a str {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .unwrap_or_default()
}

fn arg_f64(matches: &clap::ArgMatches, name: &str) -> anyhow::Result<f64> {
    arg(matches, name)
        .parse()
        .with_context(|| format!("--{name} expects a number"))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let matches = build_cli().get_matches();

    let distribution = Distribution::from_name(
        arg(&matches, "distribution"),
        arg_f64(&matches, "mean")?,
        arg_f64(&matches, "stddev")?,
        arg_f64(&matches, "lambda")?,
    )?;
    let seed = matches
        .get_one::<String>("seed")
        .map(|s| s.parse::<u64>().context("--seed expects an integer"))
        .transpose()?;

    let config = GeneratorConfig {
        output_path: PathBuf::from(arg(&matches, "output")),
        num_rows: parse_count(arg(&matches, "num-rows"))?,
        num_groups: parse_count(arg(&matches, "num-groups"))?,
        distribution,
        seed,
    };
    generate(&config)?;
    println!(
        "wrote {} rows over {} groups to {}",
        config.num_rows,
        config.num_groups,
        config.output_path.display()
    );
    Ok(())
}
