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

//! Per-tuple cost normalization of hardware counters.
//!
//! Counter readings are averaged over all trials of a group, then divided by
//! the amount of relational work the query performs at that scale factor.
//! The result is comparable across scale factors and across engines.

use crate::error::{CoreError, Result};
use crate::ids::QueryRules;
use crate::model::{Counter, CounterSample, Counters, GroupKey, ScaleFactor};
use std::collections::{BTreeMap, BTreeSet};

/// Estimated tuples of work per query at scale factor 1.
///
/// Entries are literal configuration versioned with the report logic. A
/// missing entry never defaults to anything; see [`normalize`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "BTreeMap<String, u64>", into = "BTreeMap<String, u64>")
)]
pub struct ReferenceTable {
    tuples: BTreeMap<String, u64>,
}

impl ReferenceTable {
    /// Builds a table, rejecting zero tuple counts.
    ///
    /// # Examples
    ///
    /// ```
    /// use perfgrid_core::ReferenceTable;
    ///
    /// let table = ReferenceTable::new([("q1", 600_000)]).unwrap();
    /// assert_eq!(table.get("q1"), Some(600_000));
    /// assert!(ReferenceTable::new([("q1", 0)]).is_err());
    /// ```
    pub fn new<I, K>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, u64)>,
        K: Into<String>,
    {
        let mut tuples = BTreeMap::new();
        for (query, count) in entries {
            let query = query.into();
            if count == 0 {
                return Err(CoreError::InvalidReference {
                    query,
                    reason: "tuple count must be positive".to_string(),
                });
            }
            tuples.insert(query, count);
        }
        Ok(Self { tuples })
    }

    /// TPC-H work estimates at SF 1.
    ///
    /// The work constants the InkFuse microbenchmark analysis divides by.
    /// They are scaled by the scale factor exactly once in [`normalize`].
    pub fn tpch() -> Self {
        let tuples = [
            ("q1", 600_000),
            ("q3", 800_000),
            ("q4", 750_000),
            ("q6", 600_000),
            ("q14", 620_000),
        ]
        .into_iter()
        .map(|(q, n)| (q.to_string(), n))
        .collect();
        Self { tuples }
    }

    pub fn get(&self, query: &str) -> Option<u64> {
        self.tuples.get(query).copied()
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }
}

impl TryFrom<BTreeMap<String, u64>> for ReferenceTable {
    type Error = CoreError;

    fn try_from(map: BTreeMap<String, u64>) -> Result<Self> {
        ReferenceTable::new(map)
    }
}

impl From<ReferenceTable> for BTreeMap<String, u64> {
    fn from(table: ReferenceTable) -> Self {
        table.tuples
    }
}

/// Mean counter values of one (backend, query, scale factor) group.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedCounters {
    pub key: GroupKey,
    pub mean: Counters,
    pub trials: usize,
}

/// Averages every counter over all trials of each group.
///
/// Unlike latency selection this keeps every trial: counter stability over
/// repeated runs is what the cost report looks at.
pub fn aggregate_mean(samples: &[CounterSample]) -> Vec<AggregatedCounters> {
    let mut sums: BTreeMap<GroupKey, (Counters, usize)> = BTreeMap::new();
    for sample in samples {
        let (sum, count) = sums.entry(sample.key()).or_default();
        for counter in Counter::ALL {
            *sum.get_mut(counter) += sample.counters.get(counter);
        }
        *count += 1;
    }

    sums.into_iter()
        .map(|(key, (sum, trials))| AggregatedCounters {
            key,
            mean: sum.map(|_, v| v / trials as f64),
            trials,
        })
        .collect()
}

/// One normalized row of the cost report.
///
/// Values keep full precision; writers round for display.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CostRow {
    pub backend: String,
    /// Workload query id (not the display id).
    pub query: String,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub display_query: String,
    #[cfg_attr(feature = "serde", serde(rename = "sf"))]
    pub scale_factor: ScaleFactor,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub per_tuple: Counters,
}

/// Normalized cost rows sorted by query display order, then backend.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CostReport {
    rows: Vec<CostRow>,
}

impl CostReport {
    pub fn rows(&self) -> &[CostRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct scale factors covered by the report.
    pub fn scale_factors(&self) -> BTreeSet<&ScaleFactor> {
        self.rows.iter().map(|r| &r.scale_factor).collect()
    }

    /// True when rows of one (backend, query) pair can repeat per scale
    /// factor, so writers have to carry the scale factor.
    pub fn spans_scale_factors(&self) -> bool {
        self.scale_factors().len() > 1
    }

    /// Hides one backend from the report.
    ///
    /// This is a display filter; the source data is untouched and other
    /// reports built from it still see the backend.
    pub fn without_backend(&self, backend: &str) -> CostReport {
        CostReport {
            rows: self
                .rows
                .iter()
                .filter(|r| r.backend != backend)
                .cloned()
                .collect(),
        }
    }
}

/// Divides aggregated counters by the reference work of each group.
///
/// Group query ids are display ids; the reference lookup uses
/// [`QueryRules::raw_id`]. Extensive counters become per-tuple values,
/// `value / (scale_factor * reference_tuples)`. IPC is a ratio already and is
/// passed through.
///
/// # Errors
///
/// - [`CoreError::MissingReference`] if any group's query has no reference
///   entry. The whole report fails; no partial output is produced.
/// - [`CoreError::InvalidScaleFactor`] if a scale factor is not a positive
///   number.
///
/// # Examples
///
/// ```
/// use perfgrid_core::{
///     aggregate_mean, normalize, CounterSample, Counters, QueryRules, ReferenceTable,
/// };
///
/// let counters = Counters { cycles: 1_200.0, ..Default::default() };
/// let samples = vec![CounterSample::new("rof", "q1", "1", counters)];
/// let reference = ReferenceTable::new([("q1", 100)]).unwrap();
///
/// let report = normalize(&aggregate_mean(&samples), &reference, &QueryRules::none()).unwrap();
/// assert_eq!(report.rows()[0].per_tuple.cycles, 12.0);
///
/// let missing = ReferenceTable::new([("q3", 100)]).unwrap();
/// assert!(normalize(&aggregate_mean(&samples), &missing, &QueryRules::none()).is_err());
/// ```
pub fn normalize(
    aggregated: &[AggregatedCounters],
    reference: &ReferenceTable,
    rules: &QueryRules,
) -> Result<CostReport> {
    let mut rows = Vec::with_capacity(aggregated.len());
    for group in aggregated {
        let raw = rules.raw_id(&group.key.query);
        let tuples = reference
            .get(raw)
            .ok_or_else(|| CoreError::MissingReference {
                query: raw.to_string(),
            })?;
        let work = group.key.scale_factor.factor()? * tuples as f64;
        rows.push(CostRow {
            backend: group.key.engine.clone(),
            query: raw.to_string(),
            display_query: group.key.query.clone(),
            scale_factor: group.key.scale_factor.clone(),
            per_tuple: group.mean.map(|counter, value| {
                if counter.is_extensive() {
                    value / work
                } else {
                    value
                }
            }),
        });
    }

    rows.sort_by(|a, b| {
        a.display_query
            .cmp(&b.display_query)
            .then_with(|| a.backend.cmp(&b.backend))
            .then_with(|| a.scale_factor.cmp(&b.scale_factor))
    });
    tracing::debug!(rows = rows.len(), "normalized cost rows");
    Ok(CostReport { rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counters(cycles: f64, ipc: f64) -> Counters {
        Counters {
            cycles,
            instructions: cycles * 2.0,
            l1_misses: 4.0,
            llc_misses: 2.0,
            branch_misses: 1.0,
            ipc,
        }
    }

    #[test]
    fn test_reference_rejects_zero() {
        let err = ReferenceTable::new([("q1", 0)]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidReference { .. }));
    }

    #[test]
    fn test_tpch_table() {
        let table = ReferenceTable::tpch();
        assert_eq!(table.len(), 5);
        assert_eq!(table.get("q1"), Some(600_000));
        assert_eq!(table.get("q14"), Some(620_000));
        assert_eq!(table.get("q5"), None);
    }

    #[test]
    fn test_aggregate_mean_averages_every_counter() {
        let samples = vec![
            CounterSample::new("rof", "q1", "1", counters(100.0, 1.0)),
            CounterSample::new("rof", "q1", "1", counters(300.0, 3.0)),
            CounterSample::new("jit", "q1", "1", counters(50.0, 2.0)),
        ];
        let agg = aggregate_mean(&samples);
        assert_eq!(agg.len(), 2);
        let rof = agg.iter().find(|a| a.key.engine == "rof").unwrap();
        assert_eq!(rof.trials, 2);
        assert_eq!(rof.mean.cycles, 200.0);
        assert_eq!(rof.mean.instructions, 400.0);
        assert_eq!(rof.mean.ipc, 2.0);
    }

    #[test]
    fn test_normalize_divides_by_scale_and_tuples() {
        let samples = vec![CounterSample::new("rof", "q1", "10", counters(5_000.0, 1.5))];
        let reference = ReferenceTable::new([("q1", 50)]).unwrap();
        let report = normalize(&aggregate_mean(&samples), &reference, &QueryRules::none()).unwrap();
        let row = &report.rows()[0];
        assert_eq!(row.per_tuple.cycles, 10.0);
        assert_eq!(row.per_tuple.instructions, 20.0);
        assert_eq!(row.per_tuple.ipc, 1.5);
    }

    #[test]
    fn test_normalize_fails_on_missing_reference() {
        let samples = vec![
            CounterSample::new("rof", "q1", "1", counters(1.0, 1.0)),
            CounterSample::new("rof", "q99", "1", counters(1.0, 1.0)),
        ];
        let reference = ReferenceTable::new([("q1", 10)]).unwrap();
        let err = normalize(&aggregate_mean(&samples), &reference, &QueryRules::none()).unwrap_err();
        assert_eq!(
            err,
            CoreError::MissingReference {
                query: "q99".to_string()
            }
        );
    }

    #[test]
    fn test_normalize_joins_through_raw_id() {
        let rules = QueryRules::main_figure();
        let samples = rules
            .normalize_samples(vec![CounterSample::new("rof", "q14", "1", counters(620.0, 1.0))])
            .rows;
        assert_eq!(samples[0].query, "q88");
        let report = normalize(&aggregate_mean(&samples), &ReferenceTable::tpch(), &rules).unwrap();
        assert_eq!(report.rows()[0].query, "q14");
        assert_eq!(report.rows()[0].per_tuple.cycles, 620.0 / 620_000.0);
    }

    #[test]
    fn test_tpch_scales_once_by_scale_factor() {
        let samples = vec![
            CounterSample::new("rof", "q1", "1", counters(600_000.0, 1.0)),
            CounterSample::new("rof", "q1", "10", counters(6_000_000.0, 1.0)),
        ];
        let report = normalize(&aggregate_mean(&samples), &ReferenceTable::tpch(), &QueryRules::none())
            .unwrap();
        assert_eq!(report.rows()[0].per_tuple.cycles, 1.0);
        assert_eq!(report.rows()[1].per_tuple.cycles, 1.0);
    }

    #[test]
    fn test_normalize_rejects_bad_scale_factor() {
        let samples = vec![CounterSample::new("rof", "q1", "zero", counters(1.0, 1.0))];
        let err = normalize(&aggregate_mean(&samples), &ReferenceTable::tpch(), &QueryRules::none())
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidScaleFactor { .. }));
    }

    #[test]
    fn test_rows_sorted_by_query_then_backend() {
        let rules = QueryRules::main_figure();
        let samples = rules
            .normalize_samples(vec![
                CounterSample::new("vectorized", "q14", "1", counters(1.0, 1.0)),
                CounterSample::new("jit", "q3", "1", counters(1.0, 1.0)),
                CounterSample::new("compiled", "q3", "1", counters(1.0, 1.0)),
                CounterSample::new("jit", "q1", "1", counters(1.0, 1.0)),
            ])
            .rows;
        let report = normalize(&aggregate_mean(&samples), &ReferenceTable::tpch(), &rules).unwrap();
        let order: Vec<(&str, &str)> = report
            .rows()
            .iter()
            .map(|r| (r.query.as_str(), r.backend.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("q1", "jit"),
                ("q3", "compiled"),
                ("q3", "jit"),
                ("q14", "vectorized"),
            ]
        );
    }

    #[test]
    fn test_without_backend_is_a_view() {
        let samples = vec![
            CounterSample::new("hybrid", "q1", "1", counters(1.0, 1.0)),
            CounterSample::new("rof", "q1", "1", counters(1.0, 1.0)),
        ];
        let report = normalize(&aggregate_mean(&samples), &ReferenceTable::tpch(), &QueryRules::none())
            .unwrap();
        let filtered = report.without_backend("hybrid");
        assert_eq!(filtered.len(), 1);
        assert_eq!(report.len(), 2);
        assert!(!report.spans_scale_factors());
    }

    #[test]
    fn test_report_tracks_scale_factors() {
        let samples = vec![
            CounterSample::new("rof", "q1", "1", counters(1.0, 1.0)),
            CounterSample::new("rof", "q1", "10", counters(1.0, 1.0)),
        ];
        let report = normalize(&aggregate_mean(&samples), &ReferenceTable::tpch(), &QueryRules::none())
            .unwrap();
        assert!(report.spans_scale_factors());
        let labels: Vec<&str> = report.scale_factors().iter().map(|sf| sf.as_str()).collect();
        assert_eq!(labels, vec!["1", "10"]);
    }
}
