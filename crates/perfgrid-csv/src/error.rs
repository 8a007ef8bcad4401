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

//! Error types for result ingestion and report writing.

use perfgrid_core::CoreError;
use thiserror::Error;

/// Ingestion error types.
///
/// Every variant carries the path of the file being processed, so a failed
/// report names the exact input that broke it. Malformed rows are never
/// skipped: one bad row fails the whole report.
///
/// # Examples
///
/// ```
/// use perfgrid_csv::IngestError;
///
/// let err = IngestError::WidthMismatch {
///     path: "result_duckdb_1.csv".to_string(),
///     line: 3,
///     actual: 2,
/// };
/// assert_eq!(
///     err.to_string(),
///     "result_duckdb_1.csv:3: expected 4 or 5 columns, got 2"
/// );
/// ```
#[derive(Debug, Error)]
pub enum IngestError {
    /// An observation row has the wrong number of columns.
    #[error("{path}:{line}: expected 4 or 5 columns, got {actual}")]
    WidthMismatch {
        /// File the row was read from.
        path: String,
        /// Line number of the row (1-based).
        line: usize,
        /// Number of columns found.
        actual: usize,
    },

    /// A numeric column holds something that is not a valid number.
    ///
    /// # Examples
    ///
    /// ```
    /// use perfgrid_csv::IngestError;
    ///
    /// let err = IngestError::InvalidNumber {
    ///     path: "result_duckdb_1.csv".to_string(),
    ///     line: 7,
    ///     column: "latency".to_string(),
    ///     value: "fast".to_string(),
    /// };
    /// assert!(err.to_string().contains("invalid latency value 'fast'"));
    /// ```
    #[error("{path}:{line}: invalid {column} value '{value}'")]
    InvalidNumber {
        /// File the row was read from.
        path: String,
        /// Line number of the row (1-based).
        line: usize,
        /// Column name.
        column: String,
        /// Offending field value.
        value: String,
    },

    /// A header-bearing table lacks a required column.
    #[error("{path}: missing required column '{column}'")]
    MissingColumn {
        /// File the table was read from.
        path: String,
        /// Name of the missing column.
        column: String,
    },

    /// The input has more rows than the configured limit.
    #[error("{path}: row count exceeds maximum {limit}")]
    RowLimit {
        /// File being read.
        path: String,
        /// Configured maximum.
        limit: usize,
    },

    /// A file could not be opened, created or written.
    ///
    /// # Examples
    ///
    /// ```
    /// use perfgrid_csv::IngestError;
    ///
    /// let err = IngestError::Io {
    ///     path: "result_umbra_adaptive_10.csv".to_string(),
    ///     message: "No such file or directory".to_string(),
    /// };
    /// assert!(err.to_string().starts_with("I/O error on 'result_umbra_adaptive_10.csv'"));
    /// ```
    #[error("I/O error on '{path}': {message}")]
    Io {
        /// Path involved in the failed operation.
        path: String,
        /// Underlying error message.
        message: String,
    },

    /// Error from the underlying CSV library.
    #[error("CSV error in '{path}': {source}")]
    Csv {
        /// File being read or written.
        path: String,
        /// Library error.
        #[source]
        source: csv::Error,
    },

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A line of an Umbra result log lacks execution or compilation time.
    #[error("{path}:{line}: unrecognized Umbra log line")]
    UmbraLine {
        /// Log file.
        path: String,
        /// Line number (1-based).
        line: usize,
    },

    /// Error raised by the core pipeline.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl IngestError {
    pub(crate) fn io(path: impl AsRef<std::path::Path>, err: std::io::Error) -> Self {
        IngestError::Io {
            path: path.as_ref().display().to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn csv(path: &str, source: csv::Error) -> Self {
        IngestError::Csv {
            path: path.to_string(),
            source,
        }
    }
}

/// Convenience type alias for `Result` with `IngestError`.
pub type Result<T> = std::result::Result<T, IngestError>;
