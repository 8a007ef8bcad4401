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

//! Throughput command - renders relative throughput against a baseline engine

use super::{check_strict, report_issues};
use crate::error::CliError;
use perfgrid_chart::{layout_throughput, render_throughput, ThroughputConfig};
use perfgrid_core::select_all;
use perfgrid_csv::{IngestConfig, ResultLayout};
use std::path::Path;

/// Renders `{out}/{figure.name}.svg`.
///
/// The baseline engine's results are loaded even when it is not drawn.
pub fn throughput(
    figure: &ThroughputConfig,
    results: &ResultLayout,
    ingest: IngestConfig,
    out: &Path,
    strict: bool,
) -> Result<(), CliError> {
    figure.validate()?;

    let mut engines = figure.engine_tags();
    if !engines.contains(&figure.baseline) {
        engines.push(figure.baseline.clone());
    }
    let raw = results.load_observations(
        &engines,
        std::slice::from_ref(&figure.scale_factor),
        ingest,
    )?;
    let normalized = figure.rules.normalize_observations(raw);
    report_issues(&normalized.issues);

    let layout = layout_throughput(figure, &select_all(&normalized.rows))?;
    let path = render_throughput(&layout, out)?;
    println!("{}", path.display());

    check_strict(strict, normalized.issues.len() + layout.issues.len())
}
