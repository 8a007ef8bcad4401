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

//! Cost report writers.

use crate::error::{IngestError, Result};
use perfgrid_core::{CostReport, Counter};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a cost report as CSV with values rounded to two decimals.
///
/// A report covering more than one scale factor gets an `sf` column after
/// `query`, keeping every (backend, query, sf) row distinguishable.
///
/// # Examples
///
/// ```
/// use perfgrid_core::{aggregate_mean, normalize, CounterSample, Counters, QueryRules, ReferenceTable};
/// use perfgrid_csv::write_cost_csv;
///
/// let counters = Counters { cycles: 600_000.0, ipc: 1.234, ..Default::default() };
/// let samples = vec![CounterSample::new("rof", "q1", "1", counters)];
/// let report = normalize(&aggregate_mean(&samples), &ReferenceTable::tpch(), &QueryRules::none()).unwrap();
///
/// let mut out = Vec::new();
/// write_cost_csv(&report, &mut out).unwrap();
/// let text = String::from_utf8(out).unwrap();
/// assert_eq!(
///     text,
///     "backend,query,cycles,instructions,l1_misses,llc_misses,branch_misses,ipc\n\
///      rof,q1,1.00,0.00,0.00,0.00,0.00,1.23\n"
/// );
/// ```
pub fn write_cost_csv<W: Write>(report: &CostReport, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    let with_sf = report.spans_scale_factors();
    let mut header = vec!["backend", "query"];
    if with_sf {
        header.push("sf");
    }
    header.extend(Counter::ALL.iter().map(|c| c.report_name()));
    wtr.write_record(&header)
        .map_err(|e| IngestError::csv("<output>", e))?;

    for row in report.rows() {
        let mut record = vec![row.backend.clone(), row.query.clone()];
        if with_sf {
            record.push(row.scale_factor.to_string());
        }
        record.extend(
            Counter::ALL
                .iter()
                .map(|&c| format!("{:.2}", row.per_tuple.get(c))),
        );
        wtr.write_record(&record)
            .map_err(|e| IngestError::csv("<output>", e))?;
    }
    wtr.flush().map_err(|e| IngestError::io("<output>", e))?;
    Ok(())
}

/// Writes a cost report as pretty-printed JSON at full precision.
///
/// Every row object carries its scale factor as `sf`.
pub fn write_cost_json<W: Write>(report: &CostReport, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}

/// Report serialization format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Json,
}

/// Writes a cost report to a file, creating parent directories.
pub fn write_cost_report(report: &CostReport, path: &Path, format: ReportFormat) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| IngestError::io(parent, e))?;
    }
    let file = File::create(path).map_err(|e| IngestError::io(path, e))?;
    match format {
        ReportFormat::Csv => write_cost_csv(report, file),
        ReportFormat::Json => write_cost_json(report, file),
    }?;
    tracing::info!(path = %path.display(), rows = report.len(), "wrote cost report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use perfgrid_core::{aggregate_mean, normalize, CounterSample, Counters, QueryRules, ReferenceTable};

    fn report() -> CostReport {
        let c = |cycles: f64| Counters {
            cycles,
            instructions: cycles * 2.0,
            ipc: 2.0,
            ..Default::default()
        };
        let samples = vec![
            CounterSample::new("rof", "q14", "1", c(1_240_000.0)),
            CounterSample::new("jit", "q14", "1", c(620_000.0)),
            CounterSample::new("hybrid", "q14", "1", c(620_000.0)),
        ];
        normalize(
            &aggregate_mean(&samples),
            &ReferenceTable::tpch(),
            &QueryRules::main_figure(),
        )
        .unwrap()
    }

    #[test]
    fn test_csv_uses_raw_query_and_two_decimals() {
        let mut out = Vec::new();
        write_cost_csv(&report().without_backend("hybrid"), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "jit,q14,1.00,2.00,0.00,0.00,0.00,2.00");
        assert_eq!(lines[2], "rof,q14,2.00,4.00,0.00,0.00,0.00,2.00");
    }

    #[test]
    fn test_json_is_an_array_of_rows() {
        let mut out = Vec::new();
        write_cost_json(&report(), &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["backend"], "hybrid");
        assert_eq!(rows[0]["query"], "q14");
        assert_eq!(rows[0]["cycles"], 1.0);
        assert_eq!(rows[0]["sf"], "1");
        assert!(rows[0].get("display_query").is_none());
    }

    fn two_scale_factor_report() -> CostReport {
        let c = |cycles: f64| Counters {
            cycles,
            ipc: 1.0,
            ..Default::default()
        };
        let samples = vec![
            CounterSample::new("rof", "q1", "1", c(600_000.0)),
            CounterSample::new("rof", "q1", "10", c(12_000_000.0)),
        ];
        normalize(&aggregate_mean(&samples), &ReferenceTable::tpch(), &QueryRules::none()).unwrap()
    }

    #[test]
    fn test_csv_adds_sf_column_for_several_scale_factors() {
        let mut out = Vec::new();
        write_cost_csv(&two_scale_factor_report(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "backend,query,sf,cycles,instructions,l1_misses,llc_misses,branch_misses,ipc",
                "rof,q1,1,1.00,0.00,0.00,0.00,0.00,1.00",
                "rof,q1,10,2.00,0.00,0.00,0.00,0.00,1.00",
            ]
        );
    }

    #[test]
    fn test_json_rows_distinguish_scale_factors() {
        let mut out = Vec::new();
        write_cost_json(&two_scale_factor_report(), &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["sf"], "1");
        assert_eq!(rows[1]["sf"], "10");
        assert_eq!(rows[1]["cycles"], 2.0);
    }
}
