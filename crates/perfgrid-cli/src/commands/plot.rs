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

//! Plot command - renders a comparative latency figure

use super::{check_strict, report_issues};
use crate::error::CliError;
use perfgrid_chart::{layout_figure, render_figure, FigureConfig};
use perfgrid_core::select_all;
use perfgrid_csv::{IngestConfig, ResultLayout};
use std::path::Path;

/// Loads the figure's result files, selects the fastest trial per group and
/// writes `{out}/{figure.name}.svg`.
///
/// Data issues are logged and do not fail the command unless `strict` is
/// set; the figure is written either way.
///
/// # Errors
///
/// Returns `Err` if the configuration is invalid, a primary result file is
/// missing or malformed, or the SVG cannot be written.
pub fn plot(
    figure: &FigureConfig,
    results: &ResultLayout,
    ingest: IngestConfig,
    out: &Path,
    strict: bool,
) -> Result<(), CliError> {
    figure.validate()?;

    let raw = results.load_observations(&figure.engine_tags(), &figure.scale_factors(), ingest)?;
    let normalized = figure.rules.normalize_observations(raw);
    report_issues(&normalized.issues);

    let index = select_all(&normalized.rows);
    tracing::debug!(
        groups = index.len(),
        excluded = normalized.excluded,
        "selected fastest trials"
    );

    let layout = layout_figure(figure, &index)?;
    let path = render_figure(&layout, out)?;
    println!("{}", path.display());

    check_strict(strict, normalized.issues.len() + layout.issues.len())
}
