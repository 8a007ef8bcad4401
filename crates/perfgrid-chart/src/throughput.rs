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

//! Relative throughput layout.
//!
//! Compares execution time (latency without the compilation stall) of each
//! engine against a baseline engine at one scale factor. A value of 1.2
//! means 20% more throughput than the baseline.

use crate::config::ThroughputConfig;
use crate::error::Result;
use crate::layout::LegendEntry;
use perfgrid_core::{DataIssue, SelectionIndex};

/// One engine's relative throughput on one query.
#[derive(Debug, Clone, PartialEq)]
pub struct ThroughputBar {
    pub engine: String,
    pub color: String,
    pub x: f64,
    pub width: f64,
    /// `baseline_exec / engine_exec`.
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThroughputGroup {
    pub query: String,
    pub label: String,
    pub x: f64,
    pub bars: Vec<ThroughputBar>,
}

/// Complete geometry of a throughput figure.
#[derive(Debug, Clone, PartialEq)]
pub struct ThroughputLayout {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub groups: Vec<ThroughputGroup>,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    pub reference_line: f64,
    pub legend: Vec<LegendEntry>,
    pub issues: Vec<DataIssue>,
}

/// Lays out relative throughput bars.
///
/// A missing baseline or engine selection drops the bar with a
/// [`DataIssue::Missing`]; a non-positive execution time drops it with a
/// [`DataIssue::NonPositiveExecution`].
///
/// # Examples
///
/// ```
/// use perfgrid_chart::{layout_throughput, ThroughputConfig};
/// use perfgrid_core::{select_all, Observation};
///
/// let data = vec![
///     Observation::new("inkfuse_interpreted", "q1", "100", 1_200).with_stall_us(0),
///     Observation::new("inkfuse_rof", "q1", "100", 1_100).with_stall_us(100_000),
/// ];
/// let layout = layout_throughput(&ThroughputConfig::engines(), &select_all(&data)).unwrap();
/// let q1 = &layout.groups[0];
/// let rof = q1.bars.iter().find(|b| b.engine == "inkfuse_rof").unwrap();
/// assert_eq!(rof.value, 1.2);
/// ```
pub fn layout_throughput(
    config: &ThroughputConfig,
    index: &SelectionIndex,
) -> Result<ThroughputLayout> {
    config.validate()?;
    let sf = &config.scale_factor;
    let queries = config.display_queries();
    let count = config.engines.len() as f64;
    let bar_width = config.group_width / count;

    let mut issues = Vec::new();
    let mut groups = Vec::with_capacity(queries.len());
    for (slot, query) in queries.iter().enumerate() {
        let x = slot as f64 * config.slot_spacing;
        let baseline = index
            .require(&config.baseline, query, sf, &mut issues)
            .map(|s| s.trial.execution_ms());

        let mut bars = Vec::new();
        for (k, engine) in config.engines.iter().enumerate() {
            let Some(selection) = index.require(&engine.tag, query, sf, &mut issues) else {
                continue;
            };
            let Some(baseline) = baseline else {
                continue;
            };
            let exec = selection.trial.execution_ms();
            if exec <= 0.0 || baseline <= 0.0 {
                issues.push(DataIssue::NonPositiveExecution {
                    engine: if exec <= 0.0 {
                        engine.tag.clone()
                    } else {
                        config.baseline.clone()
                    },
                    query: query.clone(),
                    scale_factor: sf.clone(),
                });
                continue;
            }
            bars.push(ThroughputBar {
                engine: engine.tag.clone(),
                color: engine.color.clone(),
                x: x + (k as f64 - (count - 1.0) / 2.0) * bar_width,
                width: bar_width,
                value: baseline / exec,
            });
        }
        groups.push(ThroughputGroup {
            query: query.clone(),
            label: config.rules.label(query),
            x,
            bars,
        });
    }

    issues.dedup();
    for issue in &issues {
        tracing::warn!(figure = %config.name, "{}", issue);
    }

    let half_slot = config.slot_spacing / 2.0;
    Ok(ThroughputLayout {
        name: config.name.clone(),
        width: config.width,
        height: config.height,
        x_range: (
            -half_slot,
            (groups.len().max(1) - 1) as f64 * config.slot_spacing + half_slot,
        ),
        groups,
        y_range: config.y_range,
        reference_line: config.reference_line,
        legend: config
            .engines
            .iter()
            .map(|e| LegendEntry {
                label: e.label.clone(),
                color: e.color.clone(),
                hatched: false,
            })
            .collect(),
        issues,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use perfgrid_core::{select_all, Observation, ScaleFactor};

    fn data() -> Vec<Observation> {
        vec![
            Observation::new("inkfuse_interpreted", "q1", "100", 1_000).with_stall_us(0),
            Observation::new("inkfuse_fused", "q1", "100", 900).with_stall_us(400_000),
            Observation::new("inkfuse_rof", "q1", "100", 800).with_stall_us(0),
            Observation::new("inkfuse_hybrid", "q1", "100", 500),
        ]
    }

    #[test]
    fn test_throughput_is_baseline_over_engine() {
        let layout = layout_throughput(&ThroughputConfig::engines(), &select_all(&data())).unwrap();
        let group = &layout.groups[0];
        assert_eq!(group.query, "q1");
        let values: Vec<(&str, f64)> = group
            .bars
            .iter()
            .map(|b| (b.engine.as_str(), b.value))
            .collect();
        assert_eq!(
            values,
            vec![
                ("inkfuse_fused", 2.0),
                ("inkfuse_rof", 1.25),
                ("inkfuse_interpreted", 1.0),
                ("inkfuse_hybrid", 2.0),
            ]
        );
    }

    #[test]
    fn test_missing_baseline_drops_group_bars() {
        let rows: Vec<Observation> = data()
            .into_iter()
            .filter(|o| o.engine != "inkfuse_interpreted")
            .collect();
        let layout = layout_throughput(&ThroughputConfig::engines(), &select_all(&rows)).unwrap();
        assert!(layout.groups[0].bars.is_empty());
        assert!(layout.issues.contains(&DataIssue::Missing {
            engine: "inkfuse_interpreted".to_string(),
            query: "q1".to_string(),
            scale_factor: ScaleFactor::new("100"),
        }));
    }

    #[test]
    fn test_non_positive_execution_is_skipped() {
        let mut rows = data();
        rows.push(Observation::new("inkfuse_rof", "q1", "100", 10).with_stall_us(20_000));
        let layout = layout_throughput(&ThroughputConfig::engines(), &select_all(&rows)).unwrap();
        assert!(layout.groups[0].bars.iter().all(|b| b.engine != "inkfuse_rof"));
        assert!(layout
            .issues
            .iter()
            .any(|i| matches!(i, DataIssue::NonPositiveExecution { engine, .. } if engine == "inkfuse_rof")));
    }

    #[test]
    fn test_preset_groups_follow_display_order() {
        let layout =
            layout_throughput(&ThroughputConfig::engines(), &SelectionIndex::default()).unwrap();
        let labels: Vec<&str> = layout.groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["Q1", "Q3", "Q4", "Q5", "Q6", "Q13", "Q14", "Q19"]);
        assert_eq!(layout.y_range, (0.6, 1.5));
        assert_eq!(layout.reference_line, 1.0);
    }
}
