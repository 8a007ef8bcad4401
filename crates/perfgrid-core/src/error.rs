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

//! Error types for selection and normalization.

use thiserror::Error;

/// Errors raised by the core pipeline.
///
/// Every variant is fatal for the report being generated. Conditions that
/// should only be surfaced to the operator (missing partitions, unexpected
/// group counts) are [`DataIssue`](crate::DataIssue)s instead.
///
/// # Examples
///
/// ```
/// use perfgrid_core::CoreError;
///
/// let err = CoreError::MissingReference {
///     query: "q99".to_string(),
/// };
/// assert_eq!(
///     err.to_string(),
///     "No reference tuple count for query 'q99'"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// A query in the aggregated data has no entry in the reference table.
    #[error("No reference tuple count for query '{query}'")]
    MissingReference {
        /// Raw query identifier that failed the lookup.
        query: String,
    },

    /// A scale factor label could not be used as a numeric divisor.
    #[error("Invalid scale factor '{label}': {reason}")]
    InvalidScaleFactor {
        /// The offending label.
        label: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A reference table entry is unusable as a denominator.
    #[error("Invalid reference entry for query '{query}': {reason}")]
    InvalidReference {
        /// Query identifier of the entry.
        query: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A set of identifier rules is not total or not idempotent.
    #[error("Invalid query rules: {0}")]
    InvalidRules(String),
}

/// Convenience type alias for `Result` with `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;
