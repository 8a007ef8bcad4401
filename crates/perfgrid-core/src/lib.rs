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

//! Core data model and reductions for benchmark result reports.
//!
//! This crate turns repeated benchmark trials into the numbers that reports
//! show. It performs no I/O; see `perfgrid-csv` for ingestion and
//! `perfgrid-chart` for layout.
//!
//! # Pipeline
//!
//! 1. [`QueryRules`] drop probe queries and remap ids into display order.
//! 2. [`select_all`] keeps the single fastest trial of every
//!    (engine, query, scale factor) group, whole row intact.
//! 3. [`check_cardinality`] reports missing or surplus groups as
//!    [`DataIssue`]s.
//! 4. [`aggregate_mean`] and [`normalize`] produce per-tuple counter costs
//!    against a [`ReferenceTable`].
//!
//! # Examples
//!
//! ```
//! use perfgrid_core::{select_all, Observation, QueryRules, ScaleFactor};
//!
//! let rules = QueryRules::main_figure();
//! let raw = vec![
//!     Observation::new("duckdb", "q13", "1", 120).with_stall_us(30),
//!     Observation::new("duckdb", "q13", "1", 95).with_stall_us(40),
//!     Observation::new("duckdb", "l_count", "1", 1),
//! ];
//! let rows = rules.normalize_observations(raw).rows;
//! let index = select_all(&rows);
//!
//! let best = index.get("duckdb", "q87", &ScaleFactor::new("1")).unwrap();
//! assert_eq!((best.latency_ms(), best.stall_us()), (95, Some(40)));
//! assert_eq!(index.len(), 1);
//! ```

pub mod error;
pub mod ids;
pub mod issue;
pub mod model;
pub mod normalize;
pub mod select;

pub use error::{CoreError, Result};
pub use ids::{NormalizedRows, QueryRules};
pub use issue::DataIssue;
pub use model::{Counter, CounterSample, Counters, GroupKey, Observation, ScaleFactor};
pub use normalize::{aggregate_mean, normalize, AggregatedCounters, CostReport, CostRow, ReferenceTable};
pub use select::{check_cardinality, select, select_all, Selection, SelectionIndex};
