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

//! SVG rendering of computed layouts with `plotters`.
//!
//! The layout carries every position and height; this module only maps it
//! onto drawing areas. Grid cells come from splitting the canvas by the
//! layout's width and height ratios, the legend sits in a strip above the
//! grid.

use crate::config::parse_hex_color;
use crate::error::{ChartError, Result};
use crate::hatch::{hatch_lines, PixelRect};
use crate::layout::{FigureLayout, LegendEntry, PanelLayout};
use crate::throughput::ThroughputLayout;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::{Path, PathBuf};

type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;

const FONT: &str = "sans-serif";
const LEGEND_HEIGHT: u32 = 48;
const SWATCH: i32 = 18;
const TICK_LABELS: usize = 6;

/// Renders a latency figure to `{out_dir}/{name}.svg`.
///
/// The output directory is created when absent.
pub fn render_figure(layout: &FigureLayout, out_dir: &Path) -> Result<PathBuf> {
    let path = prepare_output(out_dir, &layout.name)?;
    {
        let root = SVGBackend::new(&path, (layout.width, layout.height)).into_drawing_area();
        root.fill(&WHITE)?;
        let (legend_area, grid_area) = root.split_vertically(LEGEND_HEIGHT);
        draw_legend(&legend_area, &layout.legend, layout.hatch_spacing)?;

        let (width, height) = grid_area.dim_in_pixel();
        let xs = breakpoints(&layout.column_widths, width);
        let ys = breakpoints(&layout.row_heights, height);
        let cells = grid_area.split_by_breakpoints(&xs, &ys);
        let columns = layout.column_widths.len();
        for panel in &layout.panels {
            let cell = cells
                .get(panel.row * columns + panel.column)
                .ok_or_else(|| {
                    ChartError::Render(format!(
                        "panel at row {} column {} is outside the grid",
                        panel.row, panel.column
                    ))
                })?;
            draw_panel(&root, cell, panel, layout.hatch_spacing)?;
        }
        root.present()?;
    }
    tracing::info!(path = %path.display(), panels = layout.panels.len(), "wrote figure");
    Ok(path)
}

/// Renders a relative throughput figure to `{out_dir}/{name}.svg`.
pub fn render_throughput(layout: &ThroughputLayout, out_dir: &Path) -> Result<PathBuf> {
    let path = prepare_output(out_dir, &layout.name)?;
    {
        let root = SVGBackend::new(&path, (layout.width, layout.height)).into_drawing_area();
        root.fill(&WHITE)?;
        let (legend_area, plot_area) = root.split_vertically(LEGEND_HEIGHT);
        draw_legend(&legend_area, &layout.legend, 6)?;

        let (x_min, x_max) = layout.x_range;
        let (y_min, y_max) = layout.y_range;
        let mut chart = ChartBuilder::on(&plot_area)
            .margin(8)
            .x_label_area_size(28)
            .y_label_area_size(56)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_label_formatter(&|_| String::new())
            .y_labels(10)
            .y_label_formatter(&|v| format!("{:.1}", v))
            .y_desc("Relative Throughput")
            .label_style((FONT, 14))
            .draw()?;

        for group in &layout.groups {
            for bar in &group.bars {
                if bar.value <= y_min {
                    continue;
                }
                let color = rgb(&bar.color)?;
                let corners = [
                    (bar.x - bar.width / 2.0, y_min),
                    (bar.x + bar.width / 2.0, bar.value.min(y_max)),
                ];
                chart.draw_series(std::iter::once(Rectangle::new(corners, color.filled())))?;
                chart.draw_series(std::iter::once(Rectangle::new(
                    corners,
                    BLACK.stroke_width(1),
                )))?;
            }
            let anchor = chart.backend_coord(&(group.x, y_min));
            root.draw(&Text::new(
                group.label.clone(),
                (anchor.0, anchor.1 + 6),
                label_style(14, HPos::Center, VPos::Top),
            ))?;
        }

        // Dashed reference line.
        let dash = (x_max - x_min) / 80.0;
        let mut x = x_min;
        while x < x_max {
            chart.draw_series(std::iter::once(PathElement::new(
                vec![
                    (x, layout.reference_line),
                    ((x + dash).min(x_max), layout.reference_line),
                ],
                BLACK.stroke_width(2),
            )))?;
            x += 2.0 * dash;
        }
        root.present()?;
    }
    tracing::info!(path = %path.display(), groups = layout.groups.len(), "wrote figure");
    Ok(path)
}

fn prepare_output(out_dir: &Path, name: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(out_dir).map_err(|e| ChartError::Io {
        path: out_dir.display().to_string(),
        message: e.to_string(),
    })?;
    Ok(out_dir.join(format!("{}.svg", name)))
}

/// Pixel offsets between cells for relative sizes.
fn breakpoints(ratios: &[f64], total: u32) -> Vec<i32> {
    let sum: f64 = ratios.iter().sum();
    if sum <= 0.0 {
        return Vec::new();
    }
    let mut acc = 0.0;
    ratios
        .iter()
        .take(ratios.len().saturating_sub(1))
        .map(|r| {
            acc += r;
            (acc / sum * total as f64).round() as i32
        })
        .collect()
}

fn rgb(color: &str) -> Result<RGBColor> {
    parse_hex_color(color)
        .map(|(r, g, b)| RGBColor(r, g, b))
        .ok_or_else(|| ChartError::InvalidConfig(format!("invalid color '{}'", color)))
}

fn label_style(size: u32, h: HPos, v: VPos) -> TextStyle<'static> {
    TextStyle::from((FONT, size).into_font()).pos(Pos::new(h, v))
}

fn format_tick(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else if value.abs() >= 10.0 {
        format!("{:.0}", value)
    } else if value.abs() >= 1.0 {
        format!("{:.1}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn draw_panel(root: &Area<'_>, cell: &Area<'_>, panel: &PanelLayout, hatch_spacing: u32) -> Result<()> {
    let mut builder = ChartBuilder::on(cell);
    builder.margin(8).x_label_area_size(28);
    if panel.y_axis_right {
        builder.right_y_label_area_size(48);
    } else {
        builder.y_label_area_size(64);
    }
    if let Some(title) = &panel.title {
        builder.caption(title.as_str(), (FONT, 18));
    }
    let (x_min, x_max) = panel.x_range;
    let mut chart = builder.build_cartesian_2d(x_min..x_max, 0f64..panel.y_top())?;

    let axis = panel.axis;
    let tick = move |v: &f64| format_tick(axis.map_or(*v, |a| a.unproject(*v)));
    let y_desc = if panel.y_axis_right {
        String::new()
    } else {
        panel.unit.axis_label()
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|_| String::new())
        .y_labels(TICK_LABELS)
        .y_label_formatter(&tick)
        .y_desc(y_desc)
        .label_style((FONT, 14))
        .draw()?;

    for bar in panel.bars() {
        let color = rgb(&bar.color)?;
        let (x0, x1) = (bar.x - bar.width / 2.0, bar.x + bar.width / 2.0);
        for segment in bar.segments.iter().filter(|s| s.height() > 0.0) {
            let corners = [
                (x0, panel.project(segment.bottom)),
                (x1, panel.project(segment.top)),
            ];
            chart.draw_series(std::iter::once(Rectangle::new(corners, color.filled())))?;
            chart.draw_series(std::iter::once(Rectangle::new(
                corners,
                BLACK.stroke_width(1),
            )))?;
            if segment.hatched {
                let rect = PixelRect::from_corners(
                    chart.backend_coord(&corners[0]),
                    chart.backend_coord(&corners[1]),
                );
                for (from, to) in hatch_lines(rect, hatch_spacing) {
                    root.draw(&PathElement::new(vec![from, to], BLACK))?;
                }
            }
        }
        if bar.overflow {
            let anchor = chart.backend_coord(&(bar.x, panel.y_top()));
            root.draw(&Text::new(
                format!("{:.1}", bar.value),
                (anchor.0, anchor.1 + 4),
                label_style(12, HPos::Center, VPos::Top),
            ))?;
        }
    }

    if let Some(axis) = &panel.axis {
        // Blank the torn band and mark the break on the value axis.
        chart.draw_series(std::iter::once(Rectangle::new(
            [(x_min, axis.gap_start()), (x_max, axis.gap_end())],
            WHITE.filled(),
        )))?;
        let edge_x = if panel.y_axis_right { x_max } else { x_min };
        for position in [axis.gap_start(), axis.gap_end()] {
            let (px, py) = chart.backend_coord(&(edge_x, position));
            root.draw(&PathElement::new(
                vec![(px - 6, py + 3), (px + 6, py - 3)],
                BLACK.stroke_width(1),
            ))?;
        }
    }

    for group in &panel.groups {
        let anchor = chart.backend_coord(&(group.x, 0.0));
        root.draw(&Text::new(
            group.label.clone(),
            (anchor.0, anchor.1 + 6),
            label_style(14, HPos::Center, VPos::Top),
        ))?;
    }
    Ok(())
}

fn draw_legend(area: &Area<'_>, entries: &[LegendEntry], hatch_spacing: u32) -> Result<()> {
    let (width, height) = area.dim_in_pixel();
    let widths: Vec<i32> = entries
        .iter()
        .map(|e| SWATCH + 8 + 8 * e.label.chars().count() as i32 + 24)
        .collect();
    let total: i32 = widths.iter().sum();
    let mut x = (width as i32 - total).max(0) / 2;
    let y = (height as i32 - SWATCH) / 2;

    for (entry, entry_width) in entries.iter().zip(widths) {
        let swatch = [(x, y), (x + SWATCH, y + SWATCH)];
        area.draw(&Rectangle::new(swatch, rgb(&entry.color)?.filled()))?;
        area.draw(&Rectangle::new(swatch, BLACK.stroke_width(1)))?;
        if entry.hatched {
            let rect = PixelRect::from_corners(swatch[0], swatch[1]);
            for (from, to) in hatch_lines(rect, (hatch_spacing / 2).max(2)) {
                area.draw(&PathElement::new(vec![from, to], BLACK))?;
            }
        }
        area.draw(&Text::new(
            entry.label.clone(),
            (x + SWATCH + 8, y + SWATCH / 2),
            label_style(15, HPos::Left, VPos::Center),
        ))?;
        x += entry_width;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakpoints_follow_ratios() {
        assert_eq!(breakpoints(&[5.0, 1.0, 0.9, 5.0, 1.0], 1290), vec![500, 600, 690, 1190]);
        assert_eq!(breakpoints(&[3.0, 3.0], 600), vec![300]);
        assert!(breakpoints(&[1.0], 100).is_empty());
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(0.0), "0");
        assert_eq!(format_tick(0.25), "0.25");
        assert_eq!(format_tick(2.5), "2.5");
        assert_eq!(format_tick(35.0), "35");
    }

    #[test]
    fn test_rgb_rejects_bad_color() {
        assert_eq!(rgb("#531c66").unwrap(), RGBColor(0x53, 0x1c, 0x66));
        assert!(rgb("purple").is_err());
    }
}
