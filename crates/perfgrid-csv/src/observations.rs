// Dweve perfgrid - Benchmark Result Selection and Comparative Charts
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Observation file reading and writing.
//!
//! Observation files are headerless CSV with positional columns:
//!
//! ```text
//! engine, query, scale_factor, latency_ms[, stall_us]
//! ```
//!
//! Benchmark drivers append to these files across campaigns, so they carry
//! many trials per (engine, query, scale factor).

use crate::error::{IngestError, Result};
use perfgrid_core::Observation;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;

/// Default maximum number of rows read from one file.
pub const DEFAULT_MAX_ROWS: usize = 1_000_000;

/// Configuration for reading result files.
///
/// # Examples
///
/// ```
/// use perfgrid_csv::IngestConfig;
///
/// let config = IngestConfig::default();
/// assert_eq!(config.max_rows, 1_000_000);
///
/// let small = IngestConfig { max_rows: 100 };
/// assert_eq!(small.max_rows, 100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestConfig {
    /// Maximum number of data rows per file. Exceeding it is an error.
    pub max_rows: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_rows: DEFAULT_MAX_ROWS,
        }
    }
}

/// Reads an observation file.
///
/// # Errors
///
/// Returns [`IngestError::Io`] when the file cannot be opened and any error
/// of [`read_observations_from_reader`].
pub fn read_observations(path: &Path, config: IngestConfig) -> Result<Vec<Observation>> {
    let file = File::open(path).map_err(|e| IngestError::io(path, e))?;
    let rows = read_observations_from_reader(file, &path.display().to_string(), config)?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "read observation file");
    Ok(rows)
}

/// Reads observations from any reader.
///
/// `source` names the input in error messages.
///
/// # Errors
///
/// - [`IngestError::WidthMismatch`] for rows without 4 or 5 columns.
/// - [`IngestError::InvalidNumber`] for unparsable latency or stall.
/// - [`IngestError::RowLimit`] when the input exceeds `config.max_rows`.
///
/// # Examples
///
/// ```
/// use perfgrid_csv::{read_observations_from_reader, IngestConfig};
///
/// let data = "duckdb, q1, 1, 120, 30\nduckdb,q1,1,95,40.4\n\nduckdb,q3,1,20\n";
/// let rows = read_observations_from_reader(data.as_bytes(), "inline", IngestConfig::default()).unwrap();
/// assert_eq!(rows.len(), 3);
/// assert_eq!(rows[1].stall_us, Some(40));
/// assert_eq!(rows[2].stall_us, None);
/// ```
pub fn read_observations_from_reader<R: Read>(
    reader: R,
    source: &str,
    config: IngestConfig,
) -> Result<Vec<Observation>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (record_idx, result) in csv_reader.records().enumerate() {
        let record = result.map_err(|e| IngestError::csv(source, e))?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(record_idx + 1);

        if record.iter().all(str::is_empty) {
            continue;
        }
        if rows.len() >= config.max_rows {
            return Err(IngestError::RowLimit {
                path: source.to_string(),
                limit: config.max_rows,
            });
        }
        if record.len() != 4 && record.len() != 5 {
            return Err(IngestError::WidthMismatch {
                path: source.to_string(),
                line,
                actual: record.len(),
            });
        }

        let latency_ms = parse_latency(&record[3]).ok_or_else(|| IngestError::InvalidNumber {
            path: source.to_string(),
            line,
            column: "latency".to_string(),
            value: record[3].to_string(),
        })?;
        let stall_us = match record.get(4) {
            Some(field) if !field.is_empty() => {
                Some(parse_stall(field).ok_or_else(|| IngestError::InvalidNumber {
                    path: source.to_string(),
                    line,
                    column: "stall".to_string(),
                    value: field.to_string(),
                })?)
            }
            _ => None,
        };

        let mut obs = Observation::new(&record[0], &record[1], &record[2], latency_ms);
        obs.stall_us = stall_us;
        rows.push(obs);
    }
    Ok(rows)
}

fn parse_latency(field: &str) -> Option<u64> {
    field.parse().ok()
}

/// Parses a stall reading, rounding fractional microseconds.
fn parse_stall(field: &str) -> Option<u64> {
    if let Ok(us) = field.parse::<u64>() {
        return Some(us);
    }
    let value: f64 = field.parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some(value.round() as u64)
}

/// Appends observations to a file in the positional format, creating it if
/// needed.
///
/// # Errors
///
/// Returns [`IngestError::Io`] or [`IngestError::Csv`] when the file cannot be
/// opened or written.
pub fn append_observations(path: &Path, observations: &[Observation]) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| IngestError::io(path, e))?;
    let target = path.display().to_string();
    write_observations(file, observations).map_err(|e| match e {
        IngestError::Csv { source, .. } => IngestError::csv(&target, source),
        IngestError::Io { message, .. } => IngestError::Io {
            path: target.clone(),
            message,
        },
        other => other,
    })
}

/// Writes observations in the positional format.
pub fn write_observations<W: Write>(writer: W, observations: &[Observation]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(writer);
    for obs in observations {
        let mut record = vec![
            obs.engine.clone(),
            obs.query.clone(),
            obs.scale_factor.to_string(),
            obs.latency_ms.to_string(),
        ];
        if let Some(stall) = obs.stall_us {
            record.push(stall.to_string());
        }
        wtr.write_record(&record)
            .map_err(|e| IngestError::csv("<output>", e))?;
    }
    wtr.flush().map_err(|e| IngestError::io("<output>", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(data: &str) -> Result<Vec<Observation>> {
        read_observations_from_reader(data.as_bytes(), "test.csv", IngestConfig::default())
    }

    #[test]
    fn test_reads_four_and_five_columns() {
        let rows = read("duckdb,q1,1,120,30\nduckdb,q3,1,42\n").unwrap();
        assert_eq!(rows[0], Observation::new("duckdb", "q1", "1", 120).with_stall_us(30));
        assert_eq!(rows[1], Observation::new("duckdb", "q3", "1", 42));
    }

    #[test]
    fn test_trims_padded_fields() {
        let rows = read("  inkfuse_rof ,  q13 , 0.1 , 7 , 1500\n").unwrap();
        assert_eq!(rows[0].engine, "inkfuse_rof");
        assert_eq!(rows[0].query, "q13");
        assert_eq!(rows[0].scale_factor.as_str(), "0.1");
    }

    #[test]
    fn test_rounds_fractional_stall() {
        let rows = read("umbra_adaptive,q1,10,3012,2500.5\numbra_adaptive,q1,10,3012,2500.4\n").unwrap();
        assert_eq!(rows[0].stall_us, Some(2501));
        assert_eq!(rows[1].stall_us, Some(2500));
    }

    #[test]
    fn test_empty_stall_is_none() {
        let rows = read("duckdb,q1,1,120,\n").unwrap();
        assert_eq!(rows[0].stall_us, None);
    }

    #[test]
    fn test_width_mismatch_reports_line() {
        let err = read("duckdb,q1,1,120,30\nduckdb,q1\n").unwrap_err();
        match err {
            IngestError::WidthMismatch { path, line, actual } => {
                assert_eq!(path, "test.csv");
                assert_eq!(line, 2);
                assert_eq!(actual, 2);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(read("a,b,c,1,2,3\n").is_err());
    }

    #[test]
    fn test_invalid_latency_is_fatal() {
        let err = read("duckdb,q1,1,12.5\n").unwrap_err();
        assert!(matches!(err, IngestError::InvalidNumber { ref column, .. } if column == "latency"));
        assert!(read("duckdb,q1,1,-3\n").is_err());
    }

    #[test]
    fn test_negative_stall_is_fatal() {
        let err = read("duckdb,q1,1,12,-1\n").unwrap_err();
        assert!(matches!(err, IngestError::InvalidNumber { ref column, .. } if column == "stall"));
        assert!(read("duckdb,q1,1,12,slow\n").is_err());
    }

    #[test]
    fn test_skips_blank_lines() {
        let rows = read("\nduckdb,q1,1,120\n\n   \nduckdb,q1,1,99\n").unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_row_limit() {
        let config = IngestConfig { max_rows: 2 };
        let data = "e,q1,1,1\ne,q1,1,2\ne,q1,1,3\n";
        let err = read_observations_from_reader(data.as_bytes(), "big.csv", config).unwrap_err();
        assert!(matches!(err, IngestError::RowLimit { limit: 2, .. }));
    }

    #[test]
    fn test_write_then_read_preserves_rows() {
        let rows = vec![
            Observation::new("umbra_adaptive", "q1", "0.1", 12).with_stall_us(3400),
            Observation::new("duckdb", "q6", "100", 2048),
        ];
        let mut buffer = Vec::new();
        write_observations(&mut buffer, &rows).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, "umbra_adaptive,q1,0.1,12,3400\nduckdb,q6,100,2048\n");
        assert_eq!(read(&text).unwrap(), rows);
    }
}
