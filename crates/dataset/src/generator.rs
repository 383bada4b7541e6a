//! Synthetic dataset generation
//!
//! Writes a gzipped `key,val` CSV with keys drawn from a configurable
//! distribution over `[0, num_groups)` and values uniform in
//! `0..=i16::MAX`. Row and group counts accept K/M/B/T suffixes on the
//! command line.

use flate2::write::GzEncoder;
use flate2::Compression;
use groupby_core::{Error, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

/// Key distribution shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Distribution {
    /// Keys uniform over `[0, num_groups)`
    Uniform,
    /// Keys from a rounded normal, clamped into `[0, num_groups)`
    Normal {
        /// Centre of the distribution, in key space
        mean: f64,
        /// Spread, in key space
        stddev: f64,
    },
    /// Keys from a scaled exponential, clamped into `[0, num_groups)`
    Exponential {
        /// Rate parameter; larger concentrates mass near key 0
        lambda: f64,
    },
}

impl Distribution {
    /// Parse a `--distribution` name with its shape parameters.
    pub fn from_name(name: &str, mean: f64, stddev: f64, lambda: f64) -> Result<Self> {
        match name {
            "uniform" => Ok(Distribution::Uniform),
            "normal" => Ok(Distribution::Normal { mean, stddev }),
            "exponential" => Ok(Distribution::Exponential { lambda }),
            other => Err(Error::Config(format!(
                "unknown distribution {other:?} (expected uniform, normal, or exponential)"
            ))),
        }
    }
}

/// Generator parameters.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Where to write the gzipped CSV
    pub output_path: PathBuf,
    /// Total rows to emit
    pub num_rows: usize,
    /// Distinct-key domain size
    pub num_groups: usize,
    /// Key distribution
    pub distribution: Distribution,
    /// Fixed seed for reproducible datasets; entropy-seeded when absent
    pub seed: Option<u64>,
}

/// Parse an integer count with an optional K/M/B/T suffix, e.g. "10K".
pub fn parse_count(text: &str) -> Result<usize> {
    let text = text.trim();
    let (digits, multiplier) = match text.chars().last() {
        Some(c) if c.eq_ignore_ascii_case(&'K') => (&text[..text.len() - 1], 1_000),
        Some(c) if c.eq_ignore_ascii_case(&'M') => (&text[..text.len() - 1], 1_000_000),
        Some(c) if c.eq_ignore_ascii_case(&'B') => (&text[..text.len() - 1], 1_000_000_000),
        Some(c) if c.eq_ignore_ascii_case(&'T') => {
            (&text[..text.len() - 1], 1_000_000_000_000)
        }
        _ => (text, 1),
    };
    let base: usize = digits
        .parse()
        .map_err(|_| Error::Config(format!("invalid count {text:?}")))?;
    Ok(base * multiplier)
}

/// Draw one key in `[0, num_groups)`.
fn sample_key(rng: &mut StdRng, distribution: Distribution, num_groups: usize) -> i64 {
    let hi = num_groups as i64 - 1;
    match distribution {
        Distribution::Uniform => rng.gen_range(0..num_groups as i64),
        Distribution::Normal { mean, stddev } => {
            // Box-Muller from two uniforms; one sample per row is plenty.
            let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
            let u2: f64 = rng.gen_range(0.0..1.0);
            let z = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
            ((mean + stddev * z).round() as i64).clamp(0, hi)
        }
        Distribution::Exponential { lambda } => {
            // Inverse CDF, scaled so the bulk of the mass covers key space.
            let u: f64 = rng.gen_range(f64::EPSILON..1.0);
            let x = -u.ln() / lambda;
            ((x * num_groups as f64) as i64).clamp(0, hi)
        }
    }
}

/// Generate the dataset described by `config`.
pub fn generate(config: &GeneratorConfig) -> Result<()> {
    if config.num_groups == 0 {
        return Err(Error::Config("--num-groups must be >= 1".into()));
    }
    if config.num_groups > config.num_rows {
        return Err(Error::Config(
            "--num-groups cannot be greater than --num-rows".into(),
        ));
    }

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let file = File::create(&config.output_path)?;
    let mut writer = BufWriter::new(GzEncoder::new(file, Compression::default()));
    writer.write_all(b"key,val\n")?;

    for _ in 0..config.num_rows {
        let key = sample_key(&mut rng, config.distribution, config.num_groups);
        let value: i64 = rng.gen_range(0..=i16::MAX as i64);
        writeln!(writer, "{key},{value}")?;
    }
    writer.into_inner().map_err(|e| e.into_error())?.finish()?;

    info!(
        path = %config.output_path.display(),
        rows = config.num_rows,
        groups = config.num_groups,
        "dataset generated"
    );
    Ok(())
}
