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

//! Benchmark result ingestion and report writing.
//!
//! - [`read_observations`] parses headerless per-trial result files.
//! - [`read_counter_samples`] parses header-bearing perf-counter tables.
//! - [`ResultLayout`] locates files by naming convention and unions rows of
//!   supplementary campaign directories.
//! - [`write_cost_csv`] and [`write_cost_json`] serialize cost reports.
//! - [`umbra`] converts raw Umbra logs into observation files.
//!
//! # Examples
//!
//! ```
//! use perfgrid_core::{select_all, QueryRules, ScaleFactor};
//! use perfgrid_csv::{read_observations_from_reader, IngestConfig};
//!
//! let data = "duckdb,q13,1,120,30\nduckdb,q13,1,95,40\nduckdb,l_count,1,1,0\n";
//! let raw = read_observations_from_reader(data.as_bytes(), "inline", IngestConfig::default()).unwrap();
//! let rows = QueryRules::main_figure().normalize_observations(raw).rows;
//!
//! let index = select_all(&rows);
//! let best = index.get("duckdb", "q87", &ScaleFactor::new("1")).unwrap();
//! assert_eq!(best.stall_us(), Some(40));
//! ```

mod counters;
mod error;
mod layout;
mod observations;
mod report;
pub mod umbra;

pub use counters::{read_counter_samples, read_counter_samples_from_reader};
pub use error::{IngestError, Result};
pub use layout::{Campaign, ResultLayout};
pub use observations::{
    append_observations, read_observations, read_observations_from_reader, write_observations,
    IngestConfig, DEFAULT_MAX_ROWS,
};
pub use report::{write_cost_csv, write_cost_json, write_cost_report, ReportFormat};
