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

//! CLI command definitions and argument parsing.
//!
//! Argument structures live here; the work is done by the functions in
//! [`crate::commands`], which take resolved configuration values and never
//! see clap types.

use crate::commands::{self, CostReportOptions};
use crate::error::CliError;
use clap::{Args, Subcommand, ValueEnum};
use perfgrid_core::{QueryRules, ReferenceTable, ScaleFactor};
use perfgrid_csv::{IngestConfig, ReportFormat, ResultLayout, DEFAULT_MAX_ROWS};
use std::path::PathBuf;

/// Where result files are read from.
#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    /// Directory holding `result_{engine}_{sf}.csv` files
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub data: PathBuf,

    /// Extra campaign directory for engines with a tag prefix, as PREFIX=DIR
    ///
    /// Rows from campaign files are added to the rows of the primary
    /// directory. `inkfuse=DATA/res_inkfuse` is always registered.
    #[arg(long = "campaign", value_name = "PREFIX=DIR")]
    pub campaigns: Vec<String>,

    /// Maximum number of rows per input file
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_ROWS)]
    pub max_rows: usize,
}

impl DataArgs {
    /// Builds the file layout, including extra campaigns.
    pub fn layout(&self) -> Result<ResultLayout, CliError> {
        let mut layout = ResultLayout::with_inkfuse_campaign(&self.data);
        for campaign in &self.campaigns {
            let (prefix, dir) = campaign.split_once('=').ok_or_else(|| {
                CliError::InvalidInput(format!(
                    "campaign '{}' is not of the form PREFIX=DIR",
                    campaign
                ))
            })?;
            if prefix.is_empty() || dir.is_empty() {
                return Err(CliError::InvalidInput(format!(
                    "campaign '{}' has an empty prefix or directory",
                    campaign
                )));
            }
            layout = layout.with_campaign(prefix, dir);
        }
        Ok(layout)
    }

    pub fn ingest_config(&self) -> IngestConfig {
        IngestConfig {
            max_rows: self.max_rows,
        }
    }
}

/// Cost report serialization.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Two-decimal CSV
    Csv,
    /// Pretty JSON at full precision
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Csv => ReportFormat::Csv,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}

/// Top-level CLI commands.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use perfgrid_cli::cli::Commands;
///
/// #[derive(Parser)]
/// struct Cli {
///     #[command(subcommand)]
///     command: Commands,
/// }
/// ```
#[derive(Subcommand)]
pub enum Commands {
    /// Render a comparative latency figure
    ///
    /// Selects the fastest trial of every (engine, query, scale factor)
    /// group and draws stacked bars of compilation stall and execution time,
    /// one panel per scale factor.
    Plot {
        /// Built-in figure (main, split)
        #[arg(short, long, conflicts_with = "config")]
        preset: Option<String>,

        /// YAML figure configuration
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// YAML query rules replacing the figure's rules
        #[arg(long, value_name = "FILE")]
        rules: Option<PathBuf>,

        #[command(flatten)]
        data: DataArgs,

        /// Output directory
        #[arg(short, long, value_name = "DIR", default_value = "plots")]
        out: PathBuf,

        /// Fail when the data has missing or unexpected groups
        #[arg(long)]
        strict: bool,
    },

    /// Render relative throughput against a baseline engine
    Throughput {
        /// Built-in figure (engines)
        #[arg(short, long, conflicts_with = "config")]
        preset: Option<String>,

        /// YAML throughput configuration
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// YAML query rules replacing the figure's rules
        #[arg(long, value_name = "FILE")]
        rules: Option<PathBuf>,

        #[command(flatten)]
        data: DataArgs,

        /// Output directory
        #[arg(short, long, value_name = "DIR", default_value = "plots")]
        out: PathBuf,

        /// Fail when the data has missing or unusable groups
        #[arg(long)]
        strict: bool,
    },

    /// Per-tuple hardware counter costs
    ///
    /// Averages the counter tables of the given scale factors and divides
    /// every extensive counter by scale factor times reference tuples.
    CostReport {
        /// Directory holding the counter tables
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        data: PathBuf,

        /// Scale factors to read, comma separated
        #[arg(
            short,
            long = "scale-factors",
            value_name = "SF",
            value_delimiter = ',',
            default_value = "1"
        )]
        scale_factors: Vec<String>,

        /// YAML map of query to tuples at scale factor 1
        #[arg(long, value_name = "FILE")]
        reference: Option<PathBuf>,

        /// YAML query rules (default: drop probe queries)
        #[arg(long, value_name = "FILE")]
        rules: Option<PathBuf>,

        /// Backend to hide, repeatable
        #[arg(long = "exclude-backend", value_name = "TAG", default_value = "hybrid")]
        exclude_backends: Vec<String>,

        /// Show every backend
        #[arg(long, conflicts_with = "exclude_backends")]
        all_backends: bool,

        /// Counter table file name prefix
        #[arg(long, value_name = "PREFIX")]
        counter_prefix: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Maximum number of rows per input file
        #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_ROWS)]
        max_rows: usize,
    },

    /// Convert raw Umbra logs into observation files
    ///
    /// Reads every `{query}_{a|o}_res_{sf}.csv` log in SOURCE and appends
    /// one row per line to `result_umbra_{mode}_{sf}.csv` in DEST.
    ImportUmbra {
        /// Directory of raw Umbra logs
        #[arg(value_name = "SOURCE")]
        source: PathBuf,

        /// Directory of observation files
        #[arg(value_name = "DEST", default_value = ".")]
        dest: PathBuf,
    },
}

impl Commands {
    /// Execute the command.
    ///
    /// # Errors
    ///
    /// Returns `Err` if configuration cannot be resolved, input files are
    /// missing or malformed, or output cannot be written.
    pub fn execute(self) -> Result<(), CliError> {
        match self {
            Commands::Plot {
                preset,
                config,
                rules,
                data,
                out,
                strict,
            } => {
                let figure =
                    commands::resolve_figure(preset.as_deref(), config.as_deref(), rules.as_deref())?;
                commands::plot(&figure, &data.layout()?, data.ingest_config(), &out, strict)
            }
            Commands::Throughput {
                preset,
                config,
                rules,
                data,
                out,
                strict,
            } => {
                let figure = commands::resolve_throughput(
                    preset.as_deref(),
                    config.as_deref(),
                    rules.as_deref(),
                )?;
                commands::throughput(&figure, &data.layout()?, data.ingest_config(), &out, strict)
            }
            Commands::CostReport {
                data,
                scale_factors,
                reference,
                rules,
                exclude_backends,
                all_backends,
                counter_prefix,
                format,
                output,
                max_rows,
            } => {
                let mut layout = ResultLayout::new(data);
                if let Some(prefix) = counter_prefix {
                    layout = layout.with_counter_prefix(prefix);
                }
                let options = CostReportOptions {
                    scale_factors: scale_factors.iter().map(|s| ScaleFactor::new(s.as_str())).collect(),
                    reference: match reference {
                        Some(path) => commands::load_yaml::<ReferenceTable>(&path)?,
                        None => ReferenceTable::tpch(),
                    },
                    rules: match rules {
                        Some(path) => commands::load_yaml::<QueryRules>(&path)?,
                        None => QueryRules::main_figure(),
                    },
                    exclude_backends: if all_backends {
                        Vec::new()
                    } else {
                        exclude_backends
                    },
                    format: format.into(),
                    output,
                };
                commands::cost_report(&layout, IngestConfig { max_rows }, &options)
            }
            Commands::ImportUmbra { source, dest } => commands::import_umbra(&source, &dest),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_args(campaigns: &[&str]) -> DataArgs {
        DataArgs {
            data: PathBuf::from("results"),
            campaigns: campaigns.iter().map(|c| c.to_string()).collect(),
            max_rows: 10,
        }
    }

    #[test]
    fn test_default_layout_has_inkfuse_campaign() {
        let layout = data_args(&[]).layout().unwrap();
        let dirs: Vec<_> = layout
            .campaigns_for("inkfuse_rof")
            .map(|c| c.dir.clone())
            .collect();
        assert_eq!(dirs, vec![PathBuf::from("results").join("res_inkfuse")]);
        assert_eq!(layout.campaigns_for("duckdb").count(), 0);
    }

    #[test]
    fn test_campaign_argument_is_parsed() {
        let layout = data_args(&["duckdb=rerun"]).layout().unwrap();
        let dirs: Vec<_> = layout
            .campaigns_for("duckdb")
            .map(|c| c.dir.clone())
            .collect();
        assert_eq!(dirs, vec![PathBuf::from("rerun")]);
        assert_eq!(data_args(&[]).ingest_config().max_rows, 10);
    }

    #[test]
    fn test_malformed_campaign_is_rejected() {
        assert!(matches!(
            data_args(&["duckdb"]).layout(),
            Err(CliError::InvalidInput(_))
        ));
        assert!(data_args(&["=dir"]).layout().is_err());
    }
}
