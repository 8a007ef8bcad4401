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

//! Diagonal hatch geometry.
//!
//! plotters has no hatched fill, so stall segments are filled solid and then
//! covered with `///` lines computed here in backend pixel space.

/// A pixel-space rectangle given by two opposite corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl PixelRect {
    /// Normalizes two arbitrary corners.
    pub fn from_corners(a: (i32, i32), b: (i32, i32)) -> Self {
        Self {
            left: a.0.min(b.0),
            top: a.1.min(b.1),
            right: a.0.max(b.0),
            bottom: a.1.max(b.1),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }
}

/// Lines rising to the right (`x + y = c` with y pointing down), `spacing`
/// pixels apart along the x axis, clipped to `rect`.
///
/// # Examples
///
/// ```
/// use perfgrid_chart::hatch::{hatch_lines, PixelRect};
///
/// let rect = PixelRect::from_corners((0, 0), (10, 10));
/// let lines = hatch_lines(rect, 5);
/// assert_eq!(lines.len(), 3);
/// assert_eq!(lines[1], ((0, 10), (10, 0)));
/// ```
pub fn hatch_lines(rect: PixelRect, spacing: u32) -> Vec<((i32, i32), (i32, i32))> {
    if rect.is_empty() || spacing == 0 {
        return Vec::new();
    }
    let step = spacing as i32;
    let first = rect.left + rect.top;
    let last = rect.right + rect.bottom;

    let mut lines = Vec::new();
    // Start one step in so no line degenerates to the top-left corner.
    let mut c = first + step;
    while c < last {
        let x_start = rect.left.max(c - rect.bottom);
        let x_end = rect.right.min(c - rect.top);
        if x_start < x_end {
            lines.push(((x_start, c - x_start), (x_end, c - x_end)));
        }
        c += step;
    }
    lines
}
