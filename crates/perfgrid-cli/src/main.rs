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

//! perfgrid Command Line Interface

use clap::Parser;
use perfgrid_cli::cli::Commands;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// perfgrid - benchmark result selection and comparative charts
///
/// Reads repeated benchmark trials, keeps the fastest trial of every
/// (engine, query, scale factor) group and renders comparison figures or
/// per-tuple cost reports.
///
/// # Examples
///
/// ```bash
/// # Four-panel latency figure from results in the current directory
/// perfgrid plot --preset main
///
/// # Same engines with Q18 in overflow panels and torn axes
/// perfgrid plot --preset split --data results --out plots
///
/// # Per-tuple counter costs at SF 1 as JSON
/// perfgrid cost-report --scale-factors 1 --format json
///
/// # Turn raw Umbra logs into result files
/// perfgrid import-umbra umbra_logs results
/// ```
#[derive(Parser)]
#[command(name = "perfgrid")]
#[command(author, version, about = "perfgrid - benchmark result selection and comparative charts", long_about = None)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Logs to stderr; `RUST_LOG` directives are kept and the perfgrid crates
/// log at `info`, or `debug` with `--verbose`.
fn init_logging(verbose: bool) {
    let directive = if verbose {
        "perfgrid=debug"
    } else {
        "perfgrid=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(directive.parse().expect("valid log directive")),
        )
        .with_writer(std::io::stderr)
        .init();
}
