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

//! perfgrid CLI library for command-line parsing and execution.
//!
//! # Commands
//!
//! - **plot**: comparative latency figure from per-trial result files
//!   (presets `main` and `split`, or a YAML configuration)
//! - **throughput**: relative throughput of engines against a baseline
//!   engine (preset `engines`)
//! - **cost-report**: per-tuple hardware counter costs as CSV or JSON
//! - **import-umbra**: conversion of raw Umbra logs into result files
//!
//! # Examples
//!
//! ```no_run
//! use perfgrid_cli::commands::{figure_preset, plot};
//! use perfgrid_csv::{IngestConfig, ResultLayout};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), perfgrid_cli::error::CliError> {
//! let figure = figure_preset("split")?;
//! let results = ResultLayout::with_inkfuse_campaign("results");
//! plot(&figure, &results, IngestConfig::default(), Path::new("plots"), false)?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod commands;
pub mod error;
