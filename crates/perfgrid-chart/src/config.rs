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

//! Figure configuration.
//!
//! Every figure is described by plain data: engines with their legend label
//! and color, the queries to show, one regime row per magnitude of scale
//! factors, and the geometry constants. Configurations are built from the
//! presets below or deserialized from YAML, and passed by reference into the
//! layout engine.

use crate::axis::BrokenAxis;
use crate::error::{ChartError, Result};
use perfgrid_core::{QueryRules, ScaleFactor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One engine series: tag in the data, legend label, hex color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStyle {
    pub tag: String,
    pub label: String,
    pub color: String,
}

impl EngineStyle {
    pub fn new(tag: &str, label: &str, color: &str) -> Self {
        Self {
            tag: tag.to_string(),
            label: label.to_string(),
            color: color.to_string(),
        }
    }

    /// Parses the `#rrggbb` color.
    ///
    /// # Examples
    ///
    /// ```
    /// use perfgrid_chart::EngineStyle;
    ///
    /// let style = EngineStyle::new("duckdb", "DuckDB", "#04718a");
    /// assert_eq!(style.rgb().unwrap(), (0x04, 0x71, 0x8a));
    /// ```
    pub fn rgb(&self) -> Result<(u8, u8, u8)> {
        parse_hex_color(&self.color).ok_or_else(|| {
            ChartError::InvalidConfig(format!(
                "engine '{}' has invalid color '{}'",
                self.tag, self.color
            ))
        })
    }
}

pub(crate) fn parse_hex_color(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// How a regime row chooses its display unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitPolicy {
    Milliseconds,
    Seconds,
    /// Seconds when the largest latency of a scale factor's panels exceeds
    /// one second.
    Auto,
}

/// A torn value axis for one scale factor, in display units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tear {
    pub scale_factor: ScaleFactor,
    pub lower: f64,
    pub upper: f64,
    pub max: f64,
    /// Projected height of the torn band; a tenth of `lower` when absent.
    #[serde(default)]
    pub gap: Option<f64>,
}

impl Tear {
    pub fn new(scale_factor: &str, lower: f64, upper: f64, max: f64) -> Self {
        Self {
            scale_factor: ScaleFactor::new(scale_factor),
            lower,
            upper,
            max,
            gap: None,
        }
    }

    pub fn axis(&self) -> Result<BrokenAxis> {
        BrokenAxis::new(
            self.lower,
            self.upper,
            self.max,
            self.gap.unwrap_or(self.lower / 10.0),
        )
    }
}

/// A row of panels sharing a magnitude.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeRow {
    pub scale_factors: Vec<ScaleFactor>,
    pub unit: UnitPolicy,
    #[serde(default)]
    pub tears: Vec<Tear>,
    #[serde(default = "default_ratio")]
    pub height_ratio: f64,
}

impl RegimeRow {
    pub fn new(scale_factors: &[&str], unit: UnitPolicy, height_ratio: f64) -> Self {
        Self {
            scale_factors: scale_factors.iter().map(|sf| ScaleFactor::new(*sf)).collect(),
            unit,
            tears: Vec::new(),
            height_ratio,
        }
    }

    pub fn with_tear(mut self, tear: Tear) -> Self {
        self.tears.push(tear);
        self
    }

    /// Tear configured for a scale factor of this row.
    pub fn tear_for(&self, scale_factor: &ScaleFactor) -> Option<&Tear> {
        self.tears.iter().find(|t| &t.scale_factor == scale_factor)
    }
}

/// A query drawn in its own narrow panel next to every main panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierSpec {
    /// Raw query id.
    pub query: String,
    #[serde(default = "default_ratio")]
    pub width_ratio: f64,
}

fn default_ratio() -> f64 {
    1.0
}

fn default_slot_spacing() -> f64 {
    1.5
}

fn default_group_width() -> f64 {
    1.26
}

fn default_floor_ms() -> f64 {
    1.5
}

fn default_hatch_spacing() -> u32 {
    8
}

fn default_stall_label() -> String {
    "Compilation Latency".to_string()
}

fn default_main_width_ratio() -> f64 {
    5.0
}

fn default_spacer_ratio() -> f64 {
    0.9
}

fn default_width() -> u32 {
    2200
}

fn default_height() -> u32 {
    750
}

/// Complete description of one comparative latency figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureConfig {
    /// Output file stem.
    pub name: String,
    pub engines: Vec<EngineStyle>,
    /// Raw query ids of the main panels.
    pub queries: Vec<String>,
    #[serde(default)]
    pub rules: QueryRules,
    pub rows: Vec<RegimeRow>,
    #[serde(default)]
    pub outlier: Option<OutlierSpec>,
    #[serde(default = "default_slot_spacing")]
    pub slot_spacing: f64,
    #[serde(default = "default_group_width")]
    pub group_width: f64,
    /// Smallest drawn latency, in milliseconds.
    #[serde(default = "default_floor_ms")]
    pub floor_ms: f64,
    /// Distance between hatch lines, in pixels.
    #[serde(default = "default_hatch_spacing")]
    pub hatch_spacing: u32,
    #[serde(default = "default_stall_label")]
    pub stall_label: String,
    #[serde(default = "default_main_width_ratio")]
    pub main_width_ratio: f64,
    /// Blank column between panel pairs when an outlier panel is present.
    #[serde(default = "default_spacer_ratio")]
    pub spacer_ratio: f64,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

/// Engines of the cross-system comparison, in legend order.
fn system_engines() -> Vec<EngineStyle> {
    vec![
        EngineStyle::new("duckdb", "DuckDB", "#04718a"),
        EngineStyle::new("umbra_optimized", "Umbra (LLVM)", "#c5d31f"),
        EngineStyle::new("umbra_adaptive", "Umbra (Hybrid)", "#8d9511"),
        EngineStyle::new("inkfuse_fused", "Inkfuse (Compiling)", "#daa6f5"),
        EngineStyle::new("inkfuse_rof", "Ink (ROF)", "#b056d0"),
        EngineStyle::new("inkfuse_interpreted", "Ink (Vectorized)", "#782993"),
        EngineStyle::new("inkfuse_hybrid", "Ink (Hybrid)", "#531c66"),
    ]
}

fn tpch_queries() -> Vec<String> {
    ["q1", "q3", "q4", "q5", "q6", "q13", "q14", "q19"]
        .iter()
        .map(|q| q.to_string())
        .collect()
}

impl FigureConfig {
    /// Four panels: SF 0.1 and 1 in milliseconds, SF 10 and 100 in seconds.
    pub fn main() -> Self {
        Self {
            name: "main".to_string(),
            engines: system_engines(),
            queries: tpch_queries(),
            rules: QueryRules::main_figure(),
            rows: vec![
                RegimeRow::new(&["0.1", "1"], UnitPolicy::Milliseconds, 3.0),
                RegimeRow::new(&["10", "100"], UnitPolicy::Seconds, 3.0),
            ],
            outlier: None,
            slot_spacing: default_slot_spacing(),
            group_width: default_group_width(),
            floor_ms: default_floor_ms(),
            hatch_spacing: default_hatch_spacing(),
            stall_label: default_stall_label(),
            main_width_ratio: default_main_width_ratio(),
            spacer_ratio: default_spacer_ratio(),
            width: 2200,
            height: 750,
        }
    }

    /// The four-panel figure with Q18 in overflow panels and torn axes on
    /// the large scale factors.
    pub fn split() -> Self {
        Self {
            name: "main_split_y".to_string(),
            rules: QueryRules::split_figure(),
            rows: vec![
                RegimeRow::new(&["0.1", "1"], UnitPolicy::Milliseconds, 4.0),
                RegimeRow::new(&["10", "100"], UnitPolicy::Seconds, 6.0)
                    .with_tear(Tear::new("10", 0.25, 1.0, 1.5))
                    .with_tear(Tear::new("100", 2.5, 3.0, 35.0)),
            ],
            outlier: Some(OutlierSpec {
                query: "q18".to_string(),
                width_ratio: 1.0,
            }),
            height: 900,
            ..Self::main()
        }
    }

    /// Engine tags in declaration order.
    pub fn engine_tags(&self) -> Vec<String> {
        self.engines.iter().map(|e| e.tag.clone()).collect()
    }

    /// All scale factors of all rows, in row order.
    pub fn scale_factors(&self) -> Vec<ScaleFactor> {
        self.rows
            .iter()
            .flat_map(|r| r.scale_factors.iter().cloned())
            .collect()
    }

    /// Display ids of the main panel queries, in slot order.
    pub fn main_queries(&self) -> Vec<String> {
        let outlier = self.outlier_query();
        let mut ids: Vec<String> = self
            .queries
            .iter()
            .filter_map(|q| self.rules.normalize_id(q))
            .filter(|q| Some(*q) != outlier.as_deref())
            .map(str::to_string)
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Display id of the outlier query.
    pub fn outlier_query(&self) -> Option<String> {
        self.outlier
            .as_ref()
            .and_then(|o| self.rules.normalize_id(&o.query))
            .map(str::to_string)
    }

    /// Every display id the figure expects to find in the data.
    pub fn expected_queries(&self) -> Vec<String> {
        let mut ids = self.main_queries();
        ids.extend(self.outlier_query());
        ids
    }

    /// Checks the configuration for internal consistency.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(ChartError::InvalidConfig(msg));

        if self.name.trim().is_empty() {
            return invalid("figure name is empty".to_string());
        }
        if self.engines.is_empty() {
            return invalid("no engines configured".to_string());
        }
        let mut tags = BTreeSet::new();
        for engine in &self.engines {
            engine.rgb()?;
            if !tags.insert(engine.tag.as_str()) {
                return invalid(format!("engine '{}' is listed twice", engine.tag));
            }
        }
        self.rules
            .validate()
            .map_err(|e| ChartError::InvalidConfig(e.to_string()))?;
        if self.main_queries().is_empty() {
            return invalid("no queries left after applying the query rules".to_string());
        }
        for query in &self.queries {
            if self.rules.is_excluded(query) {
                return invalid(format!("query '{}' is excluded by the query rules", query));
            }
        }
        if let Some(outlier) = &self.outlier {
            if self.outlier_query().is_none() {
                return invalid(format!(
                    "outlier query '{}' is excluded by the query rules",
                    outlier.query
                ));
            }
            if !(outlier.width_ratio > 0.0) {
                return invalid("outlier width ratio must be positive".to_string());
            }
        }
        if self.rows.is_empty() {
            return invalid("no regime rows configured".to_string());
        }
        for row in &self.rows {
            if row.scale_factors.is_empty() {
                return invalid("regime row without scale factors".to_string());
            }
            if !(row.height_ratio > 0.0) {
                return invalid("row height ratio must be positive".to_string());
            }
            if row.unit == UnitPolicy::Auto && !row.tears.is_empty() {
                return invalid("tear bounds need a fixed unit, not auto".to_string());
            }
            for tear in &row.tears {
                if !row.scale_factors.contains(&tear.scale_factor) {
                    return invalid(format!(
                        "tear for scale factor {} outside its row",
                        tear.scale_factor
                    ));
                }
                tear.axis()?;
            }
        }
        if !(self.slot_spacing > 0.0) || !(self.group_width > 0.0) {
            return invalid("slot spacing and group width must be positive".to_string());
        }
        if self.group_width > self.slot_spacing {
            return invalid(format!(
                "group width {} exceeds slot spacing {}",
                self.group_width, self.slot_spacing
            ));
        }
        if !(self.floor_ms >= 0.0) {
            return invalid("floor must not be negative".to_string());
        }
        if self.hatch_spacing == 0 || self.width == 0 || self.height == 0 {
            return invalid("hatch spacing and canvas size must be positive".to_string());
        }
        if !(self.main_width_ratio > 0.0) || self.spacer_ratio < 0.0 {
            return invalid("panel width ratios must be positive".to_string());
        }
        Ok(())
    }
}

fn default_y_range() -> (f64, f64) {
    (0.6, 1.5)
}

fn default_reference_line() -> f64 {
    1.0
}

fn default_throughput_group_width() -> f64 {
    0.8
}

fn default_throughput_height() -> u32 {
    500
}

fn default_throughput_width() -> u32 {
    1100
}

/// Description of a relative-throughput figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThroughputConfig {
    pub name: String,
    pub engines: Vec<EngineStyle>,
    /// Raw query ids.
    pub queries: Vec<String>,
    #[serde(default)]
    pub rules: QueryRules,
    pub scale_factor: ScaleFactor,
    /// Engine whose execution time is the denominator.
    pub baseline: String,
    #[serde(default = "default_y_range")]
    pub y_range: (f64, f64),
    #[serde(default = "default_reference_line")]
    pub reference_line: f64,
    #[serde(default = "default_slot_spacing")]
    pub slot_spacing: f64,
    #[serde(default = "default_throughput_group_width")]
    pub group_width: f64,
    #[serde(default = "default_throughput_width")]
    pub width: u32,
    #[serde(default = "default_throughput_height")]
    pub height: u32,
}

impl ThroughputConfig {
    /// Execution modes of one engine at SF 100, against vectorized
    /// interpretation.
    pub fn engines() -> Self {
        Self {
            name: "main_inkfuse".to_string(),
            engines: vec![
                EngineStyle::new("inkfuse_fused", "Compiling", "#daa6f5"),
                EngineStyle::new("inkfuse_rof", "ROF", "#b056d0"),
                EngineStyle::new("inkfuse_interpreted", "Vectorized", "#782993"),
                EngineStyle::new("inkfuse_hybrid", "Hybrid", "#531c66"),
            ],
            queries: tpch_queries(),
            rules: QueryRules::engine_figure(),
            scale_factor: ScaleFactor::new("100"),
            baseline: "inkfuse_interpreted".to_string(),
            y_range: default_y_range(),
            reference_line: default_reference_line(),
            slot_spacing: default_slot_spacing(),
            group_width: default_throughput_group_width(),
            width: default_throughput_width(),
            height: default_throughput_height(),
        }
    }

    pub fn engine_tags(&self) -> Vec<String> {
        self.engines.iter().map(|e| e.tag.clone()).collect()
    }

    /// Display ids in slot order.
    pub fn display_queries(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .queries
            .iter()
            .filter_map(|q| self.rules.normalize_id(q))
            .map(str::to_string)
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(ChartError::InvalidConfig(msg));
        if self.engines.is_empty() {
            return invalid("no engines configured".to_string());
        }
        for engine in &self.engines {
            engine.rgb()?;
        }
        if self.display_queries().is_empty() {
            return invalid("no queries left after applying the query rules".to_string());
        }
        self.scale_factor
            .factor()
            .map_err(|e| ChartError::InvalidConfig(e.to_string()))?;
        let (low, high) = self.y_range;
        if !(low < high) {
            return invalid(format!("empty y range {}..{}", low, high));
        }
        if !(self.slot_spacing > 0.0) || !(self.group_width > 0.0) {
            return invalid("slot spacing and group width must be positive".to_string());
        }
        if self.width == 0 || self.height == 0 {
            return invalid("canvas size must be positive".to_string());
        }
        Ok(())
    }
}
