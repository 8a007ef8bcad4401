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

//! Error types for chart layout and rendering.

use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;

/// Chart error types.
///
/// # Examples
///
/// ```
/// use perfgrid_chart::ChartError;
///
/// let err = ChartError::InvalidConfig("no engines configured".to_string());
/// assert_eq!(err.to_string(), "Invalid figure configuration: no engines configured");
/// ```
#[derive(Debug, Error)]
pub enum ChartError {
    /// The figure configuration is inconsistent.
    #[error("Invalid figure configuration: {0}")]
    InvalidConfig(String),

    /// The drawing backend failed.
    #[error("Render error: {0}")]
    Render(String),

    /// The output location could not be prepared.
    #[error("I/O error on '{path}': {message}")]
    Io {
        /// Path involved.
        path: String,
        /// Underlying error message.
        message: String,
    },
}

impl<E> From<DrawingAreaErrorKind<E>> for ChartError
where
    E: std::error::Error + Send + Sync,
{
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        ChartError::Render(err.to_string())
    }
}

/// Convenience type alias for `Result` with `ChartError`.
pub type Result<T> = std::result::Result<T, ChartError>;
