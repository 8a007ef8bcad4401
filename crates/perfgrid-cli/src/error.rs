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

//! Structured error types for the perfgrid CLI.
//!
//! Every command returns `Result<(), CliError>`; `main` prints the error and
//! exits with a failure status.

use perfgrid_chart::ChartError;
use perfgrid_core::CoreError;
use perfgrid_csv::IngestError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for perfgrid CLI operations.
#[derive(Error, Debug)]
pub enum CliError {
    /// Reading result files or writing reports failed.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// Laying out or rendering a figure failed.
    #[error(transparent)]
    Chart(#[from] ChartError),

    /// Selection or normalization failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A YAML configuration file could not be parsed.
    #[error("Invalid configuration '{path}': {message}")]
    Config {
        /// The configuration file
        path: PathBuf,
        /// The parser message
        message: String,
    },

    /// No preset with this name exists.
    #[error("Unknown preset '{name}' (available: {available})")]
    UnknownPreset {
        /// The requested name
        name: String,
        /// Comma-separated preset names
        available: String,
    },

    /// I/O operation failed outside the library crates.
    #[error("I/O error for '{path}': {message}")]
    Io {
        /// The file path that caused the error
        path: PathBuf,
        /// The error message
        message: String,
    },

    /// Invalid argument value.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// `--strict` was given and the data had problems.
    #[error("{count} data issue(s) found")]
    DataIssues {
        /// Number of reported issues
        count: usize,
    },
}

impl CliError {
    /// Create an I/O error with file path context.
    pub fn io_error(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Create an unknown preset error listing the valid names.
    pub fn unknown_preset(name: &str, available: &[&str]) -> Self {
        Self::UnknownPreset {
            name: name.to_string(),
            available: available.join(", "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_preset_lists_names() {
        let err = CliError::unknown_preset("fancy", &["main", "split"]);
        assert_eq!(
            err.to_string(),
            "Unknown preset 'fancy' (available: main, split)"
        );
    }

    #[test]
    fn test_core_error_is_transparent() {
        let err: CliError = CoreError::MissingReference {
            query: "q19".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "No reference tuple count for query 'q19'");
    }

    #[test]
    fn test_io_error_names_path() {
        let err = CliError::io_error(
            "plots/main.svg",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("plots/main.svg"));
    }
}
