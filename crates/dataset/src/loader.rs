//! Dataset loader
//!
//! Streams a gzipped `key,val` CSV into a frozen [`RowTable`]. Parsing is
//! strict: a malformed header, a short line, a non-integer cell, or the
//! reserved slot sentinel as a key all abort the run with the offending
//! line number.

use flate2::read::GzDecoder;
use groupby_core::table::{RowTable, RowTableBuilder};
use groupby_core::{Error, Result, KEY_EMPTY};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::info;

fn parse_error(path: &Path, line: usize, message: impl Into<String>) -> Error {
    Error::Parse {
        path: path.display().to_string(),
        line,
        message: message.into(),
    }
}

/// Load a gzipped `key,val` CSV into a row table.
pub fn load_dataset(path: &Path) -> Result<RowTable> {
    let file = File::open(path)?;
    let reader = BufReader::new(GzDecoder::new(file));
    let mut lines = reader.lines();

    match lines.next() {
        Some(header) => {
            let header = header?;
            if header.trim_end() != "key,val" {
                return Err(parse_error(
                    path,
                    1,
                    format!("expected header \"key,val\", got {header:?}"),
                ));
            }
        }
        None => return Err(parse_error(path, 1, "file is empty, missing header")),
    }

    let mut rows: Vec<(i64, i64)> = Vec::new();
    for (idx, line) in lines.enumerate() {
        let line_no = idx + 2;
        let line = line?;
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        let (key_text, value_text) = line
            .split_once(',')
            .ok_or_else(|| parse_error(path, line_no, "expected two comma-separated fields"))?;
        let key: i64 = key_text
            .trim()
            .parse()
            .map_err(|_| parse_error(path, line_no, format!("invalid key {key_text:?}")))?;
        if key == KEY_EMPTY {
            return Err(parse_error(
                path,
                line_no,
                "key i64::MIN is reserved and cannot appear in input data",
            ));
        }
        let value: i64 = value_text
            .trim()
            .parse()
            .map_err(|_| parse_error(path, line_no, format!("invalid value {value_text:?}")))?;
        rows.push((key, value));
    }

    let mut builder = RowTableBuilder::new(rows.len());
    for (r, (key, value)) in rows.iter().enumerate() {
        builder.set_row(r, *key, *value);
    }
    let table = builder.freeze();
    info!(
        path = %path.display(),
        n_rows = table.n_rows(),
        "dataset loaded"
    );
    Ok(table)
}
