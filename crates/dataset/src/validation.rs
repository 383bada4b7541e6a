//! Reference validation
//!
//! Loads a gzipped `key,count,sum,min,max` CSV of reference aggregates and
//! checks computed output against it. A run passes when every output row
//! whose key appears in the reference matches on all four fields; the
//! first divergence aborts with (key, field, expected, got).

use flate2::read::GzDecoder;
use groupby_agg::Accumulator;
use groupby_core::{Error, Result, ResultRow};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use xxhash_rust::xxh3::Xxh3Builder;

/// Reference aggregates keyed by group key.
pub type ReferenceMap = HashMap<i64, Accumulator, Xxh3Builder>;

fn parse_error(path: &Path, line: usize, message: impl Into<String>) -> Error {
    Error::Parse {
        path: path.display().to_string(),
        line,
        message: message.into(),
    }
}

/// Load the reference aggregates file.
pub fn load_validation(path: &Path) -> Result<ReferenceMap> {
    let file = File::open(path)?;
    let reader = BufReader::new(GzDecoder::new(file));
    let mut lines = reader.lines();

    match lines.next() {
        Some(header) => {
            let header = header?;
            if header.trim_end() != "key,count,sum,min,max" {
                return Err(parse_error(
                    path,
                    1,
                    format!("expected header \"key,count,sum,min,max\", got {header:?}"),
                ));
            }
        }
        None => return Err(parse_error(path, 1, "file is empty, missing header")),
    }

    let mut reference = ReferenceMap::default();
    for (idx, line) in lines.enumerate() {
        let line_no = idx + 2;
        let line = line?;
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split(',');
        let mut next_i64 = |name: &str| -> Result<i64> {
            fields
                .next()
                .ok_or_else(|| parse_error(path, line_no, format!("missing field {name}")))?
                .trim()
                .parse()
                .map_err(|_| parse_error(path, line_no, format!("invalid field {name}")))
        };
        let key = next_i64("key")?;
        let acc = Accumulator {
            count: next_i64("count")?,
            sum: next_i64("sum")?,
            min: next_i64("min")?,
            max: next_i64("max")?,
        };
        reference.insert(key, acc);
    }
    Ok(reference)
}

/// Check output rows against the reference. Returns the row count checked.
pub fn validate(rows: &[ResultRow], reference: &ReferenceMap) -> Result<usize> {
    let mut checked = 0;
    for row in rows {
        let Some(expected) = reference.get(&row.key) else {
            continue;
        };
        let fields: [(&'static str, i64, i64); 4] = [
            ("count", expected.count, row.count),
            ("sum", expected.sum, row.sum),
            ("min", expected.min, row.min),
            ("max", expected.max, row.max),
        ];
        for (field, want, got) in fields {
            if want != got {
                return Err(Error::Validation {
                    key: row.key,
                    field,
                    expected: want,
                    got,
                });
            }
        }
        checked += 1;
    }
    Ok(checked)
}
