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

//! Cost report command - per-tuple hardware counter costs

use super::report_issues;
use crate::error::CliError;
use perfgrid_core::{aggregate_mean, normalize, QueryRules, ReferenceTable, ScaleFactor};
use perfgrid_csv::{
    write_cost_csv, write_cost_json, write_cost_report, IngestConfig, ReportFormat, ResultLayout,
};
use std::io::{self, Write};
use std::path::PathBuf;

/// Everything the cost report needs besides the input files.
#[derive(Debug, Clone)]
pub struct CostReportOptions {
    pub scale_factors: Vec<ScaleFactor>,
    pub reference: ReferenceTable,
    pub rules: QueryRules,
    /// Backends hidden from the output.
    pub exclude_backends: Vec<String>,
    pub format: ReportFormat,
    /// Output file; stdout when absent.
    pub output: Option<PathBuf>,
}

/// Averages the counter tables of every scale factor, divides by the
/// reference work and writes the report.
///
/// # Errors
///
/// Returns `Err` if a counter table is missing or malformed, or if any
/// surviving query has no reference entry.
pub fn cost_report(
    results: &ResultLayout,
    ingest: IngestConfig,
    options: &CostReportOptions,
) -> Result<(), CliError> {
    let samples = results.load_counter_samples(&options.scale_factors, ingest)?;
    let normalized = options.rules.normalize_samples(samples);
    report_issues(&normalized.issues);

    let aggregated = aggregate_mean(&normalized.rows);
    let mut report = normalize(&aggregated, &options.reference, &options.rules)?;
    for backend in &options.exclude_backends {
        report = report.without_backend(backend);
    }

    match &options.output {
        Some(path) => write_cost_report(&report, path, options.format)?,
        None => {
            let mut out = io::stdout().lock();
            match options.format {
                ReportFormat::Csv => write_cost_csv(&report, &mut out)?,
                ReportFormat::Json => {
                    write_cost_json(&report, &mut out)?;
                    writeln!(out).map_err(|e| CliError::io_error("<stdout>", e))?;
                }
            }
        }
    }
    Ok(())
}
