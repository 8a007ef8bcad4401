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

//! Conversion of raw Umbra result logs into observation files.
//!
//! Umbra writes one log per (query, execution mode, scale factor), named
//! `{query}_{a|o}_res_{sf}.csv` where `a` is the adaptive and `o` the
//! optimized mode and `_` in the scale factor stands for `.`. Every line
//! reports execution and compilation time in seconds.

use crate::error::{IngestError, Result};
use crate::layout::ResultLayout;
use crate::observations::append_observations;
use perfgrid_core::{Observation, ScaleFactor};
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(q[_a-z0-9]*)_([ao])_res_([0-9._]*)\.csv$").expect("valid log name pattern")
    })
}

fn line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"execution: \(([0-9.]*).*compilation: \(([0-9.]*)")
            .expect("valid log line pattern")
    })
}

/// Umbra execution mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UmbraMode {
    Adaptive,
    Optimized,
}

impl UmbraMode {
    fn from_code(code: &str) -> Option<Self> {
        match code {
            "a" => Some(UmbraMode::Adaptive),
            "o" => Some(UmbraMode::Optimized),
            _ => None,
        }
    }

    /// Engine tag used in observation files.
    pub fn engine(self) -> &'static str {
        match self {
            UmbraMode::Adaptive => "umbra_adaptive",
            UmbraMode::Optimized => "umbra_optimized",
        }
    }
}

impl fmt::Display for UmbraMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.engine())
    }
}

/// What a log file name says about its contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UmbraLog {
    pub query: String,
    pub mode: UmbraMode,
    pub scale_factor: ScaleFactor,
}

/// Parses a log file name.
///
/// Returns `None` for names outside the convention.
///
/// # Examples
///
/// ```
/// use perfgrid_csv::umbra::{parse_log_name, UmbraMode};
///
/// let log = parse_log_name("q13_a_res_0_1.csv").unwrap();
/// assert_eq!(log.query, "q13");
/// assert_eq!(log.mode, UmbraMode::Adaptive);
/// assert_eq!(log.scale_factor.as_str(), "0.1");
///
/// assert!(parse_log_name("result_duckdb_1.csv").is_none());
/// ```
pub fn parse_log_name(name: &str) -> Option<UmbraLog> {
    let caps = name_pattern().captures(name)?;
    Some(UmbraLog {
        query: caps[1].to_string(),
        mode: UmbraMode::from_code(&caps[2])?,
        scale_factor: ScaleFactor::new(caps[3].replace('_', ".")),
    })
}

/// Extracts `(execution, compilation)` seconds from one log line.
pub fn parse_log_line(line: &str) -> Option<(f64, f64)> {
    let caps = line_pattern().captures(line)?;
    let execution: f64 = caps[1].parse().ok()?;
    let compilation: f64 = caps[2].parse().ok()?;
    Some((execution, compilation))
}

/// Converts one log into observations.
///
/// Latency is the truncated sum of execution and compilation time in
/// milliseconds; the stall is the compilation time in microseconds.
///
/// # Errors
///
/// Returns [`IngestError::UmbraLine`] for any non-blank line without both
/// timings.
pub fn convert_log(log: &UmbraLog, contents: &str, source: &str) -> Result<Vec<Observation>> {
    let mut rows = Vec::new();
    for (idx, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let (execution, compilation) =
            parse_log_line(line).ok_or_else(|| IngestError::UmbraLine {
                path: source.to_string(),
                line: idx + 1,
            })?;
        let latency_ms = (1_000.0 * (execution + compilation)).trunc() as u64;
        let stall_us = (1_000_000.0 * compilation).round() as u64;
        rows.push(
            Observation::new(log.mode.engine(), &log.query, log.scale_factor.clone(), latency_ms)
                .with_stall_us(stall_us),
        );
    }
    Ok(rows)
}

/// Outcome of importing a log directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Logs converted.
    pub logs: usize,
    /// Files skipped because their name did not match.
    pub skipped: usize,
    /// Rows appended per output file.
    pub written: BTreeMap<PathBuf, usize>,
}

/// Converts every Umbra log in `source` and appends the rows to observation
/// files in `dest`.
///
/// Logs are processed in file name order so repeated imports append rows in
/// a stable order.
///
/// # Errors
///
/// Fails on unreadable directories or files, malformed log lines, and write
/// errors. Rows of logs converted before the failure stay written.
pub fn import_dir(source: &Path, dest: &Path) -> Result<ImportSummary> {
    let entries = std::fs::read_dir(source).map_err(|e| IngestError::io(source, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| IngestError::io(source, e))?;
        if entry.path().is_file() {
            files.push(entry.path());
        }
    }
    files.sort();

    let mut summary = ImportSummary::default();
    for path in files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let Some(log) = parse_log_name(&name) else {
            tracing::debug!(file = %name, "not an Umbra log, skipping");
            summary.skipped += 1;
            continue;
        };

        let contents = std::fs::read_to_string(&path).map_err(|e| IngestError::io(&path, e))?;
        let rows = convert_log(&log, &contents, &path.display().to_string())?;
        let target = dest.join(ResultLayout::observation_file_name(
            log.mode.engine(),
            &log.scale_factor,
        ));
        append_observations(&target, &rows)?;
        tracing::debug!(log = %name, target = %target.display(), rows = rows.len(), "imported Umbra log");

        summary.logs += 1;
        *summary.written.entry(target).or_default() += rows.len();
    }
    tracing::info!(
        logs = summary.logs,
        skipped = summary.skipped,
        files = summary.written.len(),
        "imported Umbra logs"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_names() {
        let log = parse_log_name("q_bigjoin_o_res_100.csv").unwrap();
        assert_eq!(log.query, "q_bigjoin");
        assert_eq!(log.mode, UmbraMode::Optimized);
        assert_eq!(log.scale_factor, ScaleFactor::new("100"));

        assert!(parse_log_name("q1_x_res_1.csv").is_none());
        assert!(parse_log_name("Q1_a_res_1.csv").is_none());
        assert!(parse_log_name("q1_a_res_1.txt").is_none());
    }

    #[test]
    fn test_parse_log_line() {
        let line = "q1 execution: (0.0123 s) optimized, compilation: (0.0045 s)";
        let (exec, comp) = parse_log_line(line).unwrap();
        assert_eq!(exec, 0.0123);
        assert_eq!(comp, 0.0045);
        assert!(parse_log_line("execution: (0.5 s)").is_none());
        assert!(parse_log_line("execution: ( s) compilation: (0.1").is_none());
    }

    #[test]
    fn test_convert_log_truncates_latency() {
        let log = parse_log_name("q6_a_res_10.csv").unwrap();
        let contents = "execution: (1.2345) compilation: (0.0100)\n\nexecution: (0.9999) compilation: (0.0)\n";
        let rows = convert_log(&log, contents, "q6_a_res_10.csv").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].engine, "umbra_adaptive");
        assert_eq!(rows[0].latency_ms, 1244);
        assert_eq!(rows[0].stall_us, Some(10_000));
        assert_eq!(rows[1].latency_ms, 999);
        assert_eq!(rows[1].stall_us, Some(0));
    }

    #[test]
    fn test_convert_log_rejects_garbage_line() {
        let log = parse_log_name("q6_o_res_1.csv").unwrap();
        let err = convert_log(&log, "execution: (1.0) compilation: (0.1)\nsegfault\n", "log").unwrap_err();
        assert!(matches!(err, IngestError::UmbraLine { line: 2, .. }));
    }
}
