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

//! Broken (torn) value axis.
//!
//! One outlier bar can flatten every other bar of a panel. A broken axis
//! keeps small values at full resolution, squeezes an uninteresting value
//! band into a narrow gap and continues above it, so both the common case
//! and the outlier stay readable in a single panel.

use crate::error::{ChartError, Result};

/// Monotonic piecewise-linear projection of values onto a torn axis.
///
/// ```text
/// value:     0 ──── lower ═══ upper ──────── max
/// projected: 0 ──── lower ─ lower+gap ─── lower+gap+(max-upper)
/// ```
///
/// Values above `max` are clipped to the top of the axis.
///
/// # Examples
///
/// ```
/// use perfgrid_chart::BrokenAxis;
///
/// let axis = BrokenAxis::new(2.5, 3.0, 35.0, 0.25).unwrap();
/// assert_eq!(axis.project(1.0), 1.0);
/// assert_eq!(axis.project(10.0), 9.75);
/// assert_eq!(axis.unproject(axis.project(10.0)), 10.0);
/// assert!(axis.clips(40.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrokenAxis {
    lower: f64,
    upper: f64,
    max: f64,
    gap: f64,
}

impl BrokenAxis {
    /// Creates an axis torn between `lower` and `upper`.
    ///
    /// # Errors
    ///
    /// Requires `0 < lower < upper < max` and `0 < gap < upper - lower`.
    pub fn new(lower: f64, upper: f64, max: f64, gap: f64) -> Result<Self> {
        let finite = [lower, upper, max, gap].iter().all(|v| v.is_finite());
        if !finite || lower <= 0.0 || lower >= upper || upper >= max {
            return Err(ChartError::InvalidConfig(format!(
                "broken axis needs 0 < lower < upper < max, got {} / {} / {}",
                lower, upper, max
            )));
        }
        if gap <= 0.0 || gap >= upper - lower {
            return Err(ChartError::InvalidConfig(format!(
                "broken axis gap {} must be positive and smaller than the torn band {}",
                gap,
                upper - lower
            )));
        }
        Ok(Self {
            lower,
            upper,
            max,
            gap,
        })
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Projected position of the lower edge of the tear.
    pub fn gap_start(&self) -> f64 {
        self.lower
    }

    /// Projected position of the upper edge of the tear.
    pub fn gap_end(&self) -> f64 {
        self.lower + self.gap
    }

    /// Projected height of the whole axis.
    pub fn top(&self) -> f64 {
        self.project(self.max)
    }

    /// Whether a value lies above the visible range.
    pub fn clips(&self, value: f64) -> bool {
        value > self.max
    }

    /// Maps a value to its position on the axis.
    pub fn project(&self, value: f64) -> f64 {
        let value = value.min(self.max);
        if value <= self.lower {
            value
        } else if value < self.upper {
            self.lower + self.gap * (value - self.lower) / (self.upper - self.lower)
        } else {
            self.lower + self.gap + (value - self.upper)
        }
    }

    /// Maps an axis position back to the value shown there.
    pub fn unproject(&self, position: f64) -> f64 {
        if position <= self.gap_start() {
            position
        } else if position < self.gap_end() {
            self.lower + (position - self.lower) * (self.upper - self.lower) / self.gap
        } else {
            position - self.gap + self.upper - self.lower
        }
    }
}
