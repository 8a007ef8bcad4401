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

//! Observation data model.
//!
//! An [`Observation`] is one timed trial of one query on one engine at one
//! scale factor. Observations are never mutated after ingestion; the
//! identifier rules produce new rows instead of editing old ones.

use crate::error::{CoreError, Result};
use std::fmt;

/// Dataset size label such as `"0.1"` or `"100"`.
///
/// Scale factors are grouping keys, so they compare as labels: `"1"` and
/// `"1.0"` are different partitions. [`ScaleFactor::factor`] parses the label
/// only where a numeric multiplier is required.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ScaleFactor(String);

impl ScaleFactor {
    /// Creates a scale factor label, trimming surrounding whitespace.
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        let trimmed = label.trim();
        if trimmed.len() == label.len() {
            ScaleFactor(label)
        } else {
            ScaleFactor(trimmed.to_string())
        }
    }

    /// Returns the label as written in the input.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the label into a strictly positive multiplier.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidScaleFactor`] when the label is not a
    /// finite number greater than zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use perfgrid_core::ScaleFactor;
    ///
    /// assert_eq!(ScaleFactor::new("0.1").factor().unwrap(), 0.1);
    /// assert!(ScaleFactor::new("0").factor().is_err());
    /// ```
    pub fn factor(&self) -> Result<f64> {
        let value: f64 = self.0.parse().map_err(|_| CoreError::InvalidScaleFactor {
            label: self.0.clone(),
            reason: "not a number".to_string(),
        })?;
        if !value.is_finite() || value <= 0.0 {
            return Err(CoreError::InvalidScaleFactor {
                label: self.0.clone(),
                reason: "must be a positive finite number".to_string(),
            });
        }
        Ok(value)
    }
}

impl fmt::Display for ScaleFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ScaleFactor {
    fn from(label: &str) -> Self {
        ScaleFactor::new(label)
    }
}

/// Named hardware-counter columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Counter {
    Cycles,
    Instructions,
    L1Misses,
    LlcMisses,
    BranchMisses,
    Ipc,
}

impl Counter {
    /// All counters in report column order.
    pub const ALL: [Counter; 6] = [
        Counter::Cycles,
        Counter::Instructions,
        Counter::L1Misses,
        Counter::LlcMisses,
        Counter::BranchMisses,
        Counter::Ipc,
    ];

    /// Column name used in cost reports.
    pub fn report_name(self) -> &'static str {
        match self {
            Counter::Cycles => "cycles",
            Counter::Instructions => "instructions",
            Counter::L1Misses => "l1_misses",
            Counter::LlcMisses => "llc_misses",
            Counter::BranchMisses => "branch_misses",
            Counter::Ipc => "ipc",
        }
    }

    /// Column name used by the perf-counter input tables.
    pub fn input_name(self) -> &'static str {
        match self {
            Counter::Cycles => "cycles",
            Counter::Instructions => "instructions",
            Counter::L1Misses => "L1-misses",
            Counter::LlcMisses => "LLC-misses",
            Counter::BranchMisses => "branch-misses",
            Counter::Ipc => "IPC",
        }
    }

    /// Whether the counter grows with the amount of work done.
    ///
    /// Extensive counters are divided by the reference work during
    /// normalization; IPC is already a ratio and is reported as is.
    pub fn is_extensive(self) -> bool {
        !matches!(self, Counter::Ipc)
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.report_name())
    }
}

/// One set of hardware-counter readings.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Counters {
    pub cycles: f64,
    pub instructions: f64,
    pub l1_misses: f64,
    pub llc_misses: f64,
    pub branch_misses: f64,
    pub ipc: f64,
}

impl Counters {
    /// Reads one counter by name.
    pub fn get(&self, counter: Counter) -> f64 {
        match counter {
            Counter::Cycles => self.cycles,
            Counter::Instructions => self.instructions,
            Counter::L1Misses => self.l1_misses,
            Counter::LlcMisses => self.llc_misses,
            Counter::BranchMisses => self.branch_misses,
            Counter::Ipc => self.ipc,
        }
    }

    /// Returns a mutable reference to one counter.
    pub fn get_mut(&mut self, counter: Counter) -> &mut f64 {
        match counter {
            Counter::Cycles => &mut self.cycles,
            Counter::Instructions => &mut self.instructions,
            Counter::L1Misses => &mut self.l1_misses,
            Counter::LlcMisses => &mut self.llc_misses,
            Counter::BranchMisses => &mut self.branch_misses,
            Counter::Ipc => &mut self.ipc,
        }
    }

    /// Applies `f` to every counter.
    pub fn map(&self, mut f: impl FnMut(Counter, f64) -> f64) -> Counters {
        let mut out = Counters::default();
        for counter in Counter::ALL {
            *out.get_mut(counter) = f(counter, self.get(counter));
        }
        out
    }
}

/// Partition key shared by all trials of one (engine, query, scale factor).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    pub engine: String,
    pub query: String,
    pub scale_factor: ScaleFactor,
}

impl GroupKey {
    pub fn new(
        engine: impl Into<String>,
        query: impl Into<String>,
        scale_factor: impl Into<ScaleFactor>,
    ) -> Self {
        Self {
            engine: engine.into(),
            query: query.into(),
            scale_factor: scale_factor.into(),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/sf{}", self.engine, self.query, self.scale_factor)
    }
}

/// One measured trial.
///
/// Latency is total wall-clock time in milliseconds. Stall is the part of
/// that latency spent compiling, in microseconds.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Observation {
    pub engine: String,
    pub query: String,
    pub scale_factor: ScaleFactor,
    pub latency_ms: u64,
    pub stall_us: Option<u64>,
    pub counters: Option<Counters>,
}

impl Observation {
    /// Creates an observation without stall or counter readings.
    ///
    /// # Examples
    ///
    /// ```
    /// use perfgrid_core::Observation;
    ///
    /// let obs = Observation::new("duckdb", "q1", "1", 120).with_stall_us(30);
    /// assert_eq!(obs.latency_ms, 120);
    /// assert_eq!(obs.stall_us, Some(30));
    /// ```
    pub fn new(
        engine: impl Into<String>,
        query: impl Into<String>,
        scale_factor: impl Into<ScaleFactor>,
        latency_ms: u64,
    ) -> Self {
        Self {
            engine: engine.into(),
            query: query.into(),
            scale_factor: scale_factor.into(),
            latency_ms,
            stall_us: None,
            counters: None,
        }
    }

    pub fn with_stall_us(mut self, stall_us: u64) -> Self {
        self.stall_us = Some(stall_us);
        self
    }

    pub fn with_counters(mut self, counters: Counters) -> Self {
        self.counters = Some(counters);
        self
    }

    /// Partition key of this trial.
    pub fn key(&self) -> GroupKey {
        GroupKey {
            engine: self.engine.clone(),
            query: self.query.clone(),
            scale_factor: self.scale_factor.clone(),
        }
    }

    /// Whether this trial belongs to the given partition.
    pub fn matches(&self, engine: &str, query: &str, scale_factor: &ScaleFactor) -> bool {
        self.engine == engine && self.query == query && &self.scale_factor == scale_factor
    }

    /// Execution time in milliseconds: latency without the compilation stall.
    ///
    /// Saturates at zero when a stall reading exceeds the total.
    pub fn execution_ms(&self) -> f64 {
        let stall_ms = self.stall_us.unwrap_or(0) as f64 / 1_000.0;
        (self.latency_ms as f64 - stall_ms).max(0.0)
    }
}

/// One row of a perf-counter table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CounterSample {
    pub backend: String,
    pub query: String,
    pub scale_factor: ScaleFactor,
    pub counters: Counters,
}

impl CounterSample {
    pub fn new(
        backend: impl Into<String>,
        query: impl Into<String>,
        scale_factor: impl Into<ScaleFactor>,
        counters: Counters,
    ) -> Self {
        Self {
            backend: backend.into(),
            query: query.into(),
            scale_factor: scale_factor.into(),
            counters,
        }
    }

    pub fn key(&self) -> GroupKey {
        GroupKey {
            engine: self.backend.clone(),
            query: self.query.clone(),
            scale_factor: self.scale_factor.clone(),
        }
    }
}
