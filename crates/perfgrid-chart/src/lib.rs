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

//! Comparative bar charts for benchmark latencies.
//!
//! A figure is a grid of panels: one row per scale-factor regime, one
//! column per scale factor, and an optional narrow overflow panel per
//! column for a query whose latency dwarfs the rest. Each bar stacks the
//! execution part of a latency under a hatched compilation stall.
//!
//! Rendering is split in two steps. [`layout_figure`] turns a
//! [`FigureConfig`] and a [`SelectionIndex`](perfgrid_core::SelectionIndex)
//! into a [`FigureLayout`] holding every bar position and height; this is
//! pure and fully testable. [`render_figure`] then draws the layout to SVG.
//!
//! # Examples
//!
//! ```
//! use perfgrid_chart::{layout_figure, FigureConfig};
//! use perfgrid_core::{select_all, Observation};
//!
//! let data = vec![
//!     Observation::new("inkfuse_fused", "q1", "0.1", 40).with_stall_us(30_000),
//!     Observation::new("inkfuse_fused", "q1", "0.1", 38).with_stall_us(31_000),
//! ];
//! let layout = layout_figure(&FigureConfig::main(), &select_all(&data)).unwrap();
//! let panel = layout.panel(0, 0).unwrap();
//! let bar = panel.bars().find(|b| b.engine == "inkfuse_fused").unwrap();
//! assert_eq!(bar.value, 38.0);
//! assert!(!layout.issues.is_empty());
//! ```

mod axis;
mod config;
mod error;
pub mod hatch;
mod layout;
mod render;
mod throughput;

pub use axis::BrokenAxis;
pub use config::{
    EngineStyle, FigureConfig, OutlierSpec, RegimeRow, Tear, ThroughputConfig, UnitPolicy,
};
pub use error::{ChartError, Result};
pub use layout::{
    layout_figure, Bar, BarGroup, DisplayUnit, FigureLayout, LegendEntry, PanelKind,
    PanelLayout, Segment,
};
pub use render::{render_figure, render_throughput};
pub use throughput::{layout_throughput, ThroughputBar, ThroughputGroup, ThroughputLayout};
