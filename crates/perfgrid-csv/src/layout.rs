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

//! On-disk naming convention of result files.
//!
//! A benchmark campaign writes one observation file per (engine, scale
//! factor) into a directory. Later campaigns for a subset of engines can live
//! in their own directories; their rows are unioned with the primary ones.

use crate::counters::read_counter_samples;
use crate::error::{IngestError, Result};
use crate::observations::{read_observations, IngestConfig};
use perfgrid_core::{CounterSample, Observation, ScaleFactor};
use std::path::{Path, PathBuf};

/// A supplementary campaign directory for engines sharing a tag prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Campaign {
    pub engine_prefix: String,
    pub dir: PathBuf,
}

/// Locates observation files and counter tables.
///
/// # Examples
///
/// ```
/// use perfgrid_csv::ResultLayout;
/// use perfgrid_core::ScaleFactor;
/// use std::path::Path;
///
/// let layout = ResultLayout::new("runs").with_campaign("inkfuse", "runs/res_inkfuse");
/// assert_eq!(
///     layout.observation_path("duckdb", &ScaleFactor::new("10")),
///     Path::new("runs/result_duckdb_10.csv")
/// );
/// assert_eq!(layout.campaigns_for("inkfuse_rof").count(), 1);
/// assert_eq!(layout.campaigns_for("duckdb").count(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultLayout {
    primary: PathBuf,
    campaigns: Vec<Campaign>,
    counter_prefix: String,
}

impl ResultLayout {
    /// Layout rooted at `primary`, without supplementary campaigns.
    pub fn new(primary: impl Into<PathBuf>) -> Self {
        Self {
            primary: primary.into(),
            campaigns: Vec::new(),
            counter_prefix: "inkfuse_bench_perf_result".to_string(),
        }
    }

    /// Layout with the `res_inkfuse/` campaign directory registered for all
    /// `inkfuse*` engines.
    pub fn with_inkfuse_campaign(primary: impl Into<PathBuf>) -> Self {
        let primary = primary.into();
        let extra = primary.join("res_inkfuse");
        Self::new(primary).with_campaign("inkfuse", extra)
    }

    /// Registers a supplementary campaign directory.
    pub fn with_campaign(mut self, engine_prefix: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        self.campaigns.push(Campaign {
            engine_prefix: engine_prefix.into(),
            dir: dir.into(),
        });
        self
    }

    /// Overrides the counter table file name prefix.
    pub fn with_counter_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.counter_prefix = prefix.into();
        self
    }

    pub fn primary(&self) -> &Path {
        &self.primary
    }

    /// Campaigns whose prefix matches `engine`.
    pub fn campaigns_for<'a>(&'a self, engine: &'a str) -> impl Iterator<Item = &'a Campaign> + 'a {
        self.campaigns
            .iter()
            .filter(move |c| engine.starts_with(&c.engine_prefix))
    }

    /// File name of an observation file.
    pub fn observation_file_name(engine: &str, scale_factor: &ScaleFactor) -> String {
        format!("result_{}_{}.csv", engine, scale_factor)
    }

    /// Path of the primary observation file.
    pub fn observation_path(&self, engine: &str, scale_factor: &ScaleFactor) -> PathBuf {
        self.primary
            .join(Self::observation_file_name(engine, scale_factor))
    }

    /// Path of a counter table.
    pub fn counter_path(&self, scale_factor: &ScaleFactor) -> PathBuf {
        self.primary
            .join(format!("{}_{}.csv", self.counter_prefix, scale_factor))
    }

    /// Loads every observation for the given engines and scale factors.
    ///
    /// Rows of supplementary campaigns are appended after the primary rows of
    /// the same file, so the input order used for tie-breaking is primary
    /// first.
    ///
    /// # Errors
    ///
    /// A missing or malformed primary file fails the load. Missing campaign
    /// files are logged and skipped; malformed ones fail the load.
    pub fn load_observations(
        &self,
        engines: &[String],
        scale_factors: &[ScaleFactor],
        config: IngestConfig,
    ) -> Result<Vec<Observation>> {
        let mut rows = Vec::new();
        for engine in engines {
            for sf in scale_factors {
                rows.extend(read_observations(&self.observation_path(engine, sf), config)?);
                for campaign in self.campaigns_for(engine) {
                    let path = campaign
                        .dir
                        .join(Self::observation_file_name(engine, sf));
                    if !path.is_file() {
                        tracing::warn!(
                            path = %path.display(),
                            "campaign file not found, skipping"
                        );
                        continue;
                    }
                    rows.extend(read_observations(&path, config)?);
                }
            }
        }
        tracing::debug!(rows = rows.len(), "loaded observations");
        Ok(rows)
    }

    /// Loads counter samples for the given scale factors.
    ///
    /// # Errors
    ///
    /// Any missing or malformed counter table fails the load.
    pub fn load_counter_samples(
        &self,
        scale_factors: &[ScaleFactor],
        config: IngestConfig,
    ) -> Result<Vec<CounterSample>> {
        let mut rows = Vec::new();
        for sf in scale_factors {
            let path = self.counter_path(sf);
            if !path.is_file() {
                return Err(IngestError::Io {
                    path: path.display().to_string(),
                    message: "counter table not found".to_string(),
                });
            }
            rows.extend(read_counter_samples(&path, config)?);
        }
        Ok(rows)
    }
}
