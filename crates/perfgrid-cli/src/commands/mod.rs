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

//! CLI command implementations

mod cost_report;
mod import_umbra;
mod plot;
mod throughput;

pub use cost_report::{cost_report, CostReportOptions};
pub use import_umbra::import_umbra;
pub use plot::plot;
pub use throughput::throughput;

use crate::error::CliError;
use perfgrid_chart::{FigureConfig, ThroughputConfig};
use perfgrid_core::{DataIssue, QueryRules};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Names accepted by `plot --preset`.
pub const FIGURE_PRESETS: &[&str] = &["main", "split"];

/// Names accepted by `throughput --preset`.
pub const THROUGHPUT_PRESETS: &[&str] = &["engines"];

/// Reads and deserializes a YAML file.
///
/// # Errors
///
/// Returns [`CliError::Io`] if the file cannot be read and
/// [`CliError::Config`] if it does not deserialize into `T`.
pub fn load_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let text = fs::read_to_string(path).map_err(|e| CliError::io_error(path, e))?;
    serde_yaml::from_str(&text).map_err(|e| CliError::Config {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Built-in figure configuration by name.
pub fn figure_preset(name: &str) -> Result<FigureConfig, CliError> {
    match name {
        "main" => Ok(FigureConfig::main()),
        "split" => Ok(FigureConfig::split()),
        other => Err(CliError::unknown_preset(other, FIGURE_PRESETS)),
    }
}

/// Built-in throughput configuration by name.
pub fn throughput_preset(name: &str) -> Result<ThroughputConfig, CliError> {
    match name {
        "engines" => Ok(ThroughputConfig::engines()),
        other => Err(CliError::unknown_preset(other, THROUGHPUT_PRESETS)),
    }
}

/// Resolves a figure from a config file or a preset, then applies a rules
/// file on top.
pub fn resolve_figure(
    preset: Option<&str>,
    config: Option<&Path>,
    rules: Option<&Path>,
) -> Result<FigureConfig, CliError> {
    let mut figure = match config {
        Some(path) => load_yaml(path)?,
        None => figure_preset(preset.unwrap_or("main"))?,
    };
    if let Some(path) = rules {
        figure.rules = load_yaml::<QueryRules>(path)?;
    }
    Ok(figure)
}

/// Resolves a throughput figure the same way as [`resolve_figure`].
pub fn resolve_throughput(
    preset: Option<&str>,
    config: Option<&Path>,
    rules: Option<&Path>,
) -> Result<ThroughputConfig, CliError> {
    let mut figure = match config {
        Some(path) => load_yaml(path)?,
        None => throughput_preset(preset.unwrap_or("engines"))?,
    };
    if let Some(path) = rules {
        figure.rules = load_yaml::<QueryRules>(path)?;
    }
    Ok(figure)
}

fn report_issues(issues: &[DataIssue]) {
    for issue in issues {
        tracing::warn!("{}", issue);
    }
}

fn check_strict(strict: bool, count: usize) -> Result<(), CliError> {
    if strict && count > 0 {
        Err(CliError::DataIssues { count })
    } else {
        Ok(())
    }
}
