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

//! Comparative layout engine.
//!
//! Turns selected results and a [`FigureConfig`] into pure geometry: a grid
//! of panels, each holding bar groups at fixed slots, each bar split into a
//! hatched stall segment and a solid running segment. Nothing here draws;
//! [`render`](crate::render) consumes the layout.

use crate::axis::BrokenAxis;
use crate::config::{FigureConfig, RegimeRow, UnitPolicy};
use crate::error::Result;
use perfgrid_core::{check_cardinality, DataIssue, ScaleFactor, Selection, SelectionIndex};
use std::fmt;

/// Unit shown on a panel's value axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayUnit {
    Milliseconds,
    Seconds,
}

impl DisplayUnit {
    /// Converts a latency in milliseconds.
    pub fn latency(self, ms: f64) -> f64 {
        match self {
            DisplayUnit::Milliseconds => ms,
            DisplayUnit::Seconds => ms / 1_000.0,
        }
    }

    /// Converts a stall in microseconds.
    pub fn stall(self, us: u64) -> f64 {
        match self {
            DisplayUnit::Milliseconds => us as f64 / 1_000.0,
            DisplayUnit::Seconds => us as f64 / 1_000_000.0,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            DisplayUnit::Milliseconds => "ms",
            DisplayUnit::Seconds => "s",
        }
    }

    /// Axis caption, e.g. `Latency [ms]`.
    pub fn axis_label(self) -> String {
        format!("Latency [{}]", self.suffix())
    }

    fn resolve(policy: UnitPolicy, max_latency_ms: u64) -> Self {
        match policy {
            UnitPolicy::Milliseconds => DisplayUnit::Milliseconds,
            UnitPolicy::Seconds => DisplayUnit::Seconds,
            UnitPolicy::Auto if max_latency_ms > 1_000 => DisplayUnit::Seconds,
            UnitPolicy::Auto => DisplayUnit::Milliseconds,
        }
    }
}

impl fmt::Display for DisplayUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// A vertical span of a bar, in display units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub bottom: f64,
    pub top: f64,
    pub hatched: bool,
}

impl Segment {
    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }
}

/// One engine's bar in a group.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub engine: String,
    pub color: String,
    /// Center on the x axis.
    pub x: f64,
    pub width: f64,
    /// Selected latency in display units, never clamped.
    pub value: f64,
    /// Stall of the same trial in display units.
    pub stall: f64,
    /// Height actually drawn: `value` raised to the visibility floor.
    pub drawn: f64,
    /// Stall segment first, then the running segment.
    pub segments: Vec<Segment>,
    /// The bar exceeds a torn axis and is cut at its top.
    pub overflow: bool,
}

/// Bars of all engines for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct BarGroup {
    /// Display id.
    pub query: String,
    /// Axis label, e.g. `Q13`.
    pub label: String,
    /// Slot center.
    pub x: f64,
    pub bars: Vec<Bar>,
}

/// Whether a panel holds the regular queries or the outlier query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKind {
    Main,
    Overflow,
}

/// One chart region.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelLayout {
    pub row: usize,
    pub column: usize,
    pub kind: PanelKind,
    pub scale_factor: ScaleFactor,
    pub unit: DisplayUnit,
    pub axis: Option<BrokenAxis>,
    pub groups: Vec<BarGroup>,
    /// Visible x range.
    pub x_range: (f64, f64),
    /// Top of the value axis in display units.
    pub y_max: f64,
    pub title: Option<String>,
    pub y_axis_right: bool,
}

impl PanelLayout {
    /// Position of a value on this panel's axis.
    pub fn project(&self, value: f64) -> f64 {
        match &self.axis {
            Some(axis) => axis.project(value),
            None => value.min(self.y_max),
        }
    }

    /// Projected top of the value axis.
    pub fn y_top(&self) -> f64 {
        match &self.axis {
            Some(axis) => axis.top(),
            None => self.y_max,
        }
    }

    pub fn bars(&self) -> impl Iterator<Item = &Bar> {
        self.groups.iter().flat_map(|g| g.bars.iter())
    }
}

/// One legend entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    pub label: String,
    pub color: String,
    pub hatched: bool,
}

/// Complete geometry of a figure.
#[derive(Debug, Clone, PartialEq)]
pub struct FigureLayout {
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Relative column widths; spacer columns hold no panel.
    pub column_widths: Vec<f64>,
    pub row_heights: Vec<f64>,
    pub panels: Vec<PanelLayout>,
    pub legend: Vec<LegendEntry>,
    pub hatch_spacing: u32,
    /// Non-fatal data problems found while laying out.
    pub issues: Vec<DataIssue>,
}

impl FigureLayout {
    pub fn panel(&self, row: usize, column: usize) -> Option<&PanelLayout> {
        self.panels
            .iter()
            .find(|p| p.row == row && p.column == column)
    }
}

/// Relative y headroom above the tallest bar of an untorn panel.
const HEADROOM: f64 = 1.1;

/// Lays out a latency figure from selected results.
///
/// Missing selections leave a gap in their group and are reported as
/// [`DataIssue::Missing`]; query groups the figure does not know are reported
/// and ignored.
///
/// # Errors
///
/// Returns [`ChartError::InvalidConfig`](crate::ChartError::InvalidConfig)
/// when the configuration does not validate.
pub fn layout_figure(config: &FigureConfig, index: &SelectionIndex) -> Result<FigureLayout> {
    config.validate()?;

    let main_queries = config.main_queries();
    let outlier = config.outlier_query();
    let columns_per_sf = if outlier.is_some() { 2 } else { 1 };

    let mut issues = check_cardinality(
        index,
        &config.engine_tags(),
        &config.scale_factors(),
        &config.expected_queries(),
    );

    let mut panels = Vec::new();
    for (row_idx, row) in config.rows.iter().enumerate() {
        for (sf_idx, sf) in row.scale_factors.iter().enumerate() {
            // Main panel, optional overflow panel, spacer.
            let column = sf_idx * (columns_per_sf + usize::from(outlier.is_some()));
            // Main and overflow panels of one scale factor share a unit.
            let unit = shared_unit(config, index, row, sf, main_queries.iter().chain(&outlier));
            panels.push(layout_panel(
                config,
                index,
                row,
                PanelSpec {
                    row: row_idx,
                    column,
                    kind: PanelKind::Main,
                    scale_factor: sf,
                    unit,
                    queries: &main_queries,
                },
                &mut issues,
            ));
            if let Some(outlier) = &outlier {
                panels.push(layout_panel(
                    config,
                    index,
                    row,
                    PanelSpec {
                        row: row_idx,
                        column: column + 1,
                        kind: PanelKind::Overflow,
                        scale_factor: sf,
                        unit,
                        queries: std::slice::from_ref(outlier),
                    },
                    &mut issues,
                ));
            }
        }
    }

    for issue in &issues {
        tracing::warn!(figure = %config.name, "{}", issue);
    }

    let legend = legend_entries(config, panels.first());
    Ok(FigureLayout {
        name: config.name.clone(),
        width: config.width,
        height: config.height,
        column_widths: column_widths(config),
        row_heights: config.rows.iter().map(|r| r.height_ratio).collect(),
        panels,
        legend,
        hatch_spacing: config.hatch_spacing,
        issues,
    })
}

fn column_widths(config: &FigureConfig) -> Vec<f64> {
    let per_row = config
        .rows
        .iter()
        .map(|r| r.scale_factors.len())
        .max()
        .unwrap_or(0);
    let mut widths = Vec::new();
    for sf_idx in 0..per_row {
        widths.push(config.main_width_ratio);
        if let Some(outlier) = &config.outlier {
            widths.push(outlier.width_ratio);
            if sf_idx + 1 < per_row {
                widths.push(config.spacer_ratio);
            }
        }
    }
    widths
}

struct PanelSpec<'a> {
    row: usize,
    column: usize,
    kind: PanelKind,
    scale_factor: &'a ScaleFactor,
    unit: DisplayUnit,
    queries: &'a [String],
}

fn shared_unit<'a>(
    config: &FigureConfig,
    index: &SelectionIndex,
    row: &RegimeRow,
    sf: &ScaleFactor,
    queries: impl Iterator<Item = &'a String>,
) -> DisplayUnit {
    let max_latency_ms = queries
        .flat_map(move |query| {
            config
                .engines
                .iter()
                .filter_map(move |e| index.get(&e.tag, query, sf))
        })
        .map(|s| s.latency_ms())
        .max()
        .unwrap_or(0);
    DisplayUnit::resolve(row.unit, max_latency_ms)
}

fn layout_panel(
    config: &FigureConfig,
    index: &SelectionIndex,
    row: &RegimeRow,
    panel: PanelSpec<'_>,
    issues: &mut Vec<DataIssue>,
) -> PanelLayout {
    let sf = panel.scale_factor;
    let engines = &config.engines;

    let mut slots: Vec<(String, Vec<Option<&Selection>>)> = Vec::with_capacity(panel.queries.len());
    for query in panel.queries {
        let selections = engines
            .iter()
            .map(|e| index.require(&e.tag, query, sf, issues))
            .collect();
        slots.push((query.clone(), selections));
    }
    let unit = panel.unit;
    let axis = row.tear_for(sf).and_then(|t| t.axis().ok());
    let floor = unit.latency(config.floor_ms);

    let count = engines.len() as f64;
    let bar_width = config.group_width / count;
    let mut groups = Vec::with_capacity(slots.len());
    for (slot, (query, selections)) in slots.into_iter().enumerate() {
        let x = slot as f64 * config.slot_spacing;
        let bars = engines
            .iter()
            .zip(selections)
            .enumerate()
            .filter_map(|(k, (engine, selection))| {
                let selection = selection?;
                let center = x + (k as f64 - (count - 1.0) / 2.0) * bar_width;
                Some(build_bar(
                    &engine.tag,
                    &engine.color,
                    center,
                    bar_width,
                    selection,
                    unit,
                    floor,
                    axis.as_ref(),
                ))
            })
            .collect();
        groups.push(BarGroup {
            label: config.rules.label(&query),
            query,
            x,
            bars,
        });
    }

    let half_slot = config.slot_spacing / 2.0;
    let x_range = (
        -half_slot,
        (groups.len().max(1) - 1) as f64 * config.slot_spacing + half_slot,
    );
    let tallest = groups
        .iter()
        .flat_map(|g| g.bars.iter())
        .map(|b| b.drawn)
        .fold(floor, f64::max);
    let y_max = match &axis {
        Some(axis) => axis.max(),
        None => tallest * HEADROOM,
    };

    PanelLayout {
        row: panel.row,
        column: panel.column,
        kind: panel.kind,
        scale_factor: sf.clone(),
        unit,
        axis,
        groups,
        x_range,
        y_max,
        title: match panel.kind {
            PanelKind::Main => Some(format!("TPC-H Scale Factor {}", sf)),
            PanelKind::Overflow => None,
        },
        y_axis_right: panel.kind == PanelKind::Overflow,
    }
}

#[allow(clippy::too_many_arguments)]
fn build_bar(
    engine: &str,
    color: &str,
    x: f64,
    width: f64,
    selection: &Selection,
    unit: DisplayUnit,
    floor: f64,
    axis: Option<&BrokenAxis>,
) -> Bar {
    let value = unit.latency(selection.latency_ms() as f64);
    let stall = selection.stall_us().map(|us| unit.stall(us)).unwrap_or(0.0);
    let drawn = value.max(floor);
    let stall_top = stall.min(drawn);
    Bar {
        engine: engine.to_string(),
        color: color.to_string(),
        x,
        width,
        value,
        stall,
        drawn,
        segments: vec![
            Segment {
                bottom: 0.0,
                top: stall_top,
                hatched: true,
            },
            Segment {
                bottom: stall_top,
                top: drawn,
                hatched: false,
            },
        ],
        overflow: axis.map_or(false, |a| a.clips(drawn)),
    }
}

fn legend_entries(config: &FigureConfig, first: Option<&PanelLayout>) -> Vec<LegendEntry> {
    let mut entries: Vec<LegendEntry> = config
        .engines
        .iter()
        .filter(|e| first.map_or(false, |p| p.bars().any(|b| b.engine == e.tag)))
        .map(|e| LegendEntry {
            label: e.label.clone(),
            color: e.color.clone(),
            hatched: false,
        })
        .collect();
    entries.push(LegendEntry {
        label: config.stall_label.clone(),
        color: "#ffffff".to_string(),
        hatched: true,
    });
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EngineStyle, OutlierSpec, Tear};
    use perfgrid_core::{select_all, Observation, QueryRules};

    fn config() -> FigureConfig {
        FigureConfig {
            name: "test".to_string(),
            engines: vec![
                EngineStyle::new("a", "A", "#000000"),
                EngineStyle::new("b", "B", "#ffffff"),
                EngineStyle::new("c", "C", "#ff0000"),
            ],
            queries: vec!["q1".to_string(), "q3".to_string()],
            rules: QueryRules::none(),
            rows: vec![RegimeRow::new(&["1"], UnitPolicy::Milliseconds, 1.0)],
            ..FigureConfig::main()
        }
    }

    fn full_data() -> Vec<Observation> {
        let mut rows = Vec::new();
        for engine in ["a", "b", "c"] {
            for query in ["q1", "q3"] {
                rows.push(Observation::new(engine, query, "1", 100).with_stall_us(20_000));
            }
        }
        rows
    }

    #[test]
    fn test_bar_geometry() {
        let layout = layout_figure(&config(), &select_all(&full_data())).unwrap();
        let panel = &layout.panels[0];
        assert_eq!(panel.groups.len(), 2);
        assert_eq!(panel.groups[1].x, 1.5);

        let width = 1.26 / 3.0;
        let xs: Vec<f64> = panel.groups[1].bars.iter().map(|b| b.x).collect();
        for (x, expected) in xs.iter().zip([1.5 - width, 1.5, 1.5 + width]) {
            assert!((x - expected).abs() < 1e-12);
        }
        let engines: Vec<&str> = panel.groups[0].bars.iter().map(|b| b.engine.as_str()).collect();
        assert_eq!(engines, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_segments_stack_stall_below_running() {
        let layout = layout_figure(&config(), &select_all(&full_data())).unwrap();
        let bar = &layout.panels[0].groups[0].bars[0];
        assert_eq!(bar.segments[0], Segment { bottom: 0.0, top: 20.0, hatched: true });
        assert_eq!(bar.segments[1], Segment { bottom: 20.0, top: 100.0, hatched: false });
    }

    #[test]
    fn test_floor_clamp_does_not_touch_value() {
        let mut data = full_data();
        data.push(Observation::new("a", "q1", "1", 0));
        let layout = layout_figure(&config(), &select_all(&data)).unwrap();
        let bar = &layout.panels[0].groups[0].bars[0];
        assert_eq!(bar.value, 0.0);
        assert_eq!(bar.drawn, 1.5);
        assert_eq!(bar.stall, 0.0);
        assert_eq!(bar.segments[1].top, 1.5);
    }

    #[test]
    fn test_missing_selection_leaves_gap_and_issue() {
        let data: Vec<Observation> = full_data()
            .into_iter()
            .filter(|o| !(o.engine == "b" && o.query == "q3"))
            .collect();
        let layout = layout_figure(&config(), &select_all(&data)).unwrap();
        let group = &layout.panels[0].groups[1];
        assert_eq!(group.bars.len(), 2);
        // Remaining bars keep their slots.
        assert!((group.bars[1].x - (1.5 + 1.26 / 3.0)).abs() < 1e-12);
        assert!(layout.issues.contains(&DataIssue::Missing {
            engine: "b".to_string(),
            query: "q3".to_string(),
            scale_factor: ScaleFactor::new("1"),
        }));
    }

    #[test]
    fn test_unknown_query_is_reported_not_drawn() {
        let mut data = full_data();
        data.push(Observation::new("a", "q_bigjoin", "1", 5));
        let layout = layout_figure(&config(), &select_all(&data)).unwrap();
        assert!(layout
            .issues
            .iter()
            .any(|i| matches!(i, DataIssue::UnknownQuery { query, .. } if query == "q_bigjoin")));
        assert!(layout.panels[0].groups.iter().all(|g| g.query != "q_bigjoin"));
    }

    #[test]
    fn test_seconds_unit_converts_latency_and_stall() {
        let mut cfg = config();
        cfg.rows[0].unit = UnitPolicy::Seconds;
        let data = vec![Observation::new("a", "q1", "1", 2_500).with_stall_us(500_000)];
        let layout = layout_figure(&cfg, &select_all(&data)).unwrap();
        let panel = &layout.panels[0];
        assert_eq!(panel.unit, DisplayUnit::Seconds);
        let bar = &panel.groups[0].bars[0];
        assert_eq!(bar.value, 2.5);
        assert_eq!(bar.stall, 0.5);
    }

    #[test]
    fn test_auto_unit_switches_above_one_second() {
        let mut cfg = config();
        cfg.rows[0].unit = UnitPolicy::Auto;
        let fast = vec![Observation::new("a", "q1", "1", 1_000)];
        let slow = vec![Observation::new("a", "q1", "1", 1_001)];
        let unit = |data: &[Observation]| layout_figure(&cfg, &select_all(data)).unwrap().panels[0].unit;
        assert_eq!(unit(&fast), DisplayUnit::Milliseconds);
        assert_eq!(unit(&slow), DisplayUnit::Seconds);
    }

    #[test]
    fn test_auto_unit_is_shared_with_overflow_panel() {
        let mut cfg = config();
        cfg.rows[0].unit = UnitPolicy::Auto;
        cfg.outlier = Some(OutlierSpec {
            query: "q18".to_string(),
            width_ratio: 1.0,
        });
        let mut data = full_data();
        data.push(Observation::new("a", "q18", "1", 5_000));
        let layout = layout_figure(&cfg, &select_all(&data)).unwrap();

        assert_eq!(layout.panels.len(), 2);
        assert_eq!(layout.panels[0].kind, PanelKind::Main);
        assert_eq!(layout.panels[1].kind, PanelKind::Overflow);
        for panel in &layout.panels {
            assert_eq!(panel.unit, DisplayUnit::Seconds);
        }
        assert_eq!(layout.panels[0].groups[0].bars[0].value, 0.1);
        assert_eq!(layout.panels[1].groups[0].bars[0].value, 5.0);
    }

    #[test]
    fn test_torn_axis_flags_overflow() {
        let mut cfg = config();
        cfg.rows[0].unit = UnitPolicy::Seconds;
        cfg.rows[0] = cfg.rows[0].clone().with_tear(Tear::new("1", 0.25, 1.0, 1.5));
        let data = vec![
            Observation::new("a", "q1", "1", 100),
            Observation::new("b", "q1", "1", 4_000),
        ];
        let layout = layout_figure(&cfg, &select_all(&data)).unwrap();
        let panel = &layout.panels[0];
        let bars = &panel.groups[0].bars;
        assert!(!bars[0].overflow);
        assert!(bars[1].overflow);
        assert_eq!(bars[1].value, 4.0);
        assert_eq!(panel.y_max, 1.5);
        assert_eq!(panel.project(bars[1].drawn), panel.y_top());
    }

    #[test]
    fn test_legend_has_stall_entry_last() {
        let layout = layout_figure(&config(), &select_all(&full_data())).unwrap();
        let labels: Vec<&str> = layout.legend.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "B", "C", "Compilation Latency"]);
        assert!(layout.legend[3].hatched);
    }

    #[test]
    fn test_split_preset_grid() {
        let cfg = FigureConfig::split();
        let layout = layout_figure(&cfg, &SelectionIndex::default()).unwrap();
        assert_eq!(layout.column_widths, vec![5.0, 1.0, 0.9, 5.0, 1.0]);
        assert_eq!(layout.row_heights, vec![4.0, 6.0]);
        assert_eq!(layout.panels.len(), 8);

        let overflow = layout.panel(0, 4).unwrap();
        assert_eq!(overflow.kind, PanelKind::Overflow);
        assert!(overflow.y_axis_right);
        assert_eq!(overflow.groups.len(), 1);
        assert_eq!(overflow.groups[0].label, "Q18");

        let main = layout.panel(1, 3).unwrap();
        assert_eq!(main.scale_factor, ScaleFactor::new("100"));
        assert!(main.axis.is_some());
        assert!(layout.panel(0, 2).is_none());
    }

    #[test]
    fn test_one_unit_per_panel() {
        let cfg = FigureConfig::main();
        let layout = layout_figure(&cfg, &SelectionIndex::default()).unwrap();
        for panel in &layout.panels {
            let expected = if panel.row == 0 {
                DisplayUnit::Milliseconds
            } else {
                DisplayUnit::Seconds
            };
            assert_eq!(panel.unit, expected);
        }
    }
}
