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

//! Non-fatal data problems surfaced to the operator.

use crate::model::ScaleFactor;
use std::fmt;

/// A data-integrity condition that does not stop report generation.
///
/// Partial runs are common while benchmarking iteratively, so missing or
/// surplus groups are reported and the report is produced from whatever
/// data is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataIssue {
    /// No trial exists for a partition the report expects.
    Missing {
        engine: String,
        query: String,
        scale_factor: ScaleFactor,
    },
    /// An (engine, scale factor) pair has the wrong number of query groups.
    Cardinality {
        engine: String,
        scale_factor: ScaleFactor,
        expected: usize,
        actual: usize,
    },
    /// A query group exists that the report configuration does not know.
    UnknownQuery {
        engine: String,
        query: String,
        scale_factor: ScaleFactor,
    },
    /// A raw identifier equals the display identifier of a remapped query.
    ///
    /// Such rows are dropped instead of being merged into the remapped group.
    IdCollision {
        engine: String,
        query: String,
        scale_factor: ScaleFactor,
    },
    /// Execution time (latency minus stall) is zero or negative.
    NonPositiveExecution {
        engine: String,
        query: String,
        scale_factor: ScaleFactor,
    },
}

impl fmt::Display for DataIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataIssue::Missing {
                engine,
                query,
                scale_factor,
            } => write!(f, "missing {} {} at sf {}", engine, query, scale_factor),
            DataIssue::Cardinality {
                engine,
                scale_factor,
                expected,
                actual,
            } => write!(
                f,
                "{} at sf {} has {} query groups, expected {}",
                engine, scale_factor, actual, expected
            ),
            DataIssue::UnknownQuery {
                engine,
                query,
                scale_factor,
            } => write!(
                f,
                "unknown query {} for {} at sf {}",
                query, engine, scale_factor
            ),
            DataIssue::IdCollision {
                engine,
                query,
                scale_factor,
            } => write!(
                f,
                "raw query id {} for {} at sf {} collides with a remapped id",
                query, engine, scale_factor
            ),
            DataIssue::NonPositiveExecution {
                engine,
                query,
                scale_factor,
            } => write!(
                f,
                "non-positive execution time for {} {} at sf {}",
                engine, query, scale_factor
            ),
        }
    }
}
