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

//! Best-trial selection.
//!
//! Each (engine, query, scale factor) partition is reduced to the one trial
//! with the lowest total latency. The reduction keeps the whole row, so the
//! stall time and counters reported next to that latency were measured in
//! the same run. Picking the minimum of every column independently would
//! describe a trial that never happened.
//!
//! Ties on latency resolve to the first row in input order.

use crate::issue::DataIssue;
use crate::model::{GroupKey, Observation, ScaleFactor};
use std::collections::{BTreeMap, BTreeSet};

/// The representative trial of one partition.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// The chosen row, copied verbatim.
    pub trial: Observation,
    /// Number of trials in the partition.
    pub trials: usize,
}

impl Selection {
    pub fn latency_ms(&self) -> u64 {
        self.trial.latency_ms
    }

    pub fn stall_us(&self) -> Option<u64> {
        self.trial.stall_us
    }
}

/// Selects the minimum-latency trial of one partition.
///
/// Returns `None` when no trial matches. The caller decides whether an empty
/// partition is a [`DataIssue::Missing`].
///
/// # Examples
///
/// ```
/// use perfgrid_core::{select, Observation, ScaleFactor};
///
/// let trials = vec![
///     Observation::new("E", "q1", "1", 120).with_stall_us(30),
///     Observation::new("E", "q1", "1", 95).with_stall_us(40),
/// ];
/// let best = select(&trials, "E", "q1", &ScaleFactor::new("1")).unwrap();
/// assert_eq!(best.latency_ms(), 95);
/// assert_eq!(best.stall_us(), Some(40));
/// ```
pub fn select(
    observations: &[Observation],
    engine: &str,
    query: &str,
    scale_factor: &ScaleFactor,
) -> Option<Selection> {
    let mut best: Option<&Observation> = None;
    let mut trials = 0;
    for obs in observations
        .iter()
        .filter(|o| o.matches(engine, query, scale_factor))
    {
        trials += 1;
        if best.map_or(true, |b| obs.latency_ms < b.latency_ms) {
            best = Some(obs);
        }
    }
    best.map(|trial| Selection {
        trial: trial.clone(),
        trials,
    })
}

/// Selects the minimum-latency trial of every partition in one pass.
pub fn select_all(observations: &[Observation]) -> SelectionIndex {
    let mut best: BTreeMap<GroupKey, (usize, usize)> = BTreeMap::new();
    for (idx, obs) in observations.iter().enumerate() {
        best.entry(obs.key())
            .and_modify(|(best_idx, trials)| {
                *trials += 1;
                if obs.latency_ms < observations[*best_idx].latency_ms {
                    *best_idx = idx;
                }
            })
            .or_insert((idx, 1));
    }

    let selections = best
        .into_iter()
        .map(|(key, (idx, trials))| {
            (
                key,
                Selection {
                    trial: observations[idx].clone(),
                    trials,
                },
            )
        })
        .collect();
    SelectionIndex { selections }
}

/// Selected results keyed by partition.
#[derive(Debug, Clone, Default)]
pub struct SelectionIndex {
    selections: BTreeMap<GroupKey, Selection>,
}

impl SelectionIndex {
    pub fn get(&self, engine: &str, query: &str, scale_factor: &ScaleFactor) -> Option<&Selection> {
        self.selections
            .get(&GroupKey::new(engine, query, scale_factor.clone()))
    }

    /// Like [`get`](Self::get), but reports an empty partition.
    pub fn require(
        &self,
        engine: &str,
        query: &str,
        scale_factor: &ScaleFactor,
        issues: &mut Vec<DataIssue>,
    ) -> Option<&Selection> {
        let found = self.get(engine, query, scale_factor);
        if found.is_none() {
            issues.push(DataIssue::Missing {
                engine: engine.to_string(),
                query: query.to_string(),
                scale_factor: scale_factor.clone(),
            });
        }
        found
    }

    /// Query groups present for one engine and scale factor, in display order.
    pub fn queries_for(&self, engine: &str, scale_factor: &ScaleFactor) -> Vec<&str> {
        self.selections
            .keys()
            .filter(|k| k.engine == engine && &k.scale_factor == scale_factor)
            .map(|k| k.query.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GroupKey, &Selection)> {
        self.selections.iter()
    }

    pub fn len(&self) -> usize {
        self.selections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }
}

/// Compares the selected groups with what a report expects.
///
/// For every (engine, scale factor) pair the number of query groups must
/// equal `expected_queries.len()`. Groups for queries outside the expected
/// set are reported as unknown. Nothing here is fatal.
pub fn check_cardinality(
    index: &SelectionIndex,
    engines: &[String],
    scale_factors: &[ScaleFactor],
    expected_queries: &[String],
) -> Vec<DataIssue> {
    let expected: BTreeSet<&str> = expected_queries.iter().map(String::as_str).collect();
    let mut issues = Vec::new();
    for engine in engines {
        for sf in scale_factors {
            let present = index.queries_for(engine, sf);
            if present.len() != expected.len() {
                issues.push(DataIssue::Cardinality {
                    engine: engine.clone(),
                    scale_factor: sf.clone(),
                    expected: expected.len(),
                    actual: present.len(),
                });
            }
            for query in present {
                if !expected.contains(query) {
                    issues.push(DataIssue::UnknownQuery {
                        engine: engine.clone(),
                        query: query.to_string(),
                        scale_factor: sf.clone(),
                    });
                }
            }
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Counters;

    fn sf(label: &str) -> ScaleFactor {
        ScaleFactor::new(label)
    }

    #[test]
    fn test_keeps_stall_of_fastest_trial() {
        let trials = vec![
            Observation::new("E", "q1", "1", 120).with_stall_us(30),
            Observation::new("E", "q1", "1", 95).with_stall_us(40),
        ];
        let best = select(&trials, "E", "q1", &sf("1")).unwrap();
        assert_eq!(best.trial, trials[1]);
        assert_eq!(best.trials, 2);
    }

    #[test]
    fn test_keeps_counters_of_fastest_trial() {
        let slow = Counters {
            cycles: 10.0,
            ..Default::default()
        };
        let fast = Counters {
            cycles: 99.0,
            ..Default::default()
        };
        let trials = vec![
            Observation::new("E", "q1", "1", 50).with_counters(slow),
            Observation::new("E", "q1", "1", 40).with_counters(fast),
        ];
        let index = select_all(&trials);
        let best = index.get("E", "q1", &sf("1")).unwrap();
        assert_eq!(best.trial.counters, Some(fast));
    }

    #[test]
    fn test_tie_picks_first_in_input_order() {
        let trials = vec![
            Observation::new("E", "q1", "1", 80).with_stall_us(1),
            Observation::new("E", "q1", "1", 80).with_stall_us(2),
            Observation::new("E", "q1", "1", 80).with_stall_us(3),
        ];
        assert_eq!(select(&trials, "E", "q1", &sf("1")).unwrap().stall_us(), Some(1));
        assert_eq!(
            select_all(&trials).get("E", "q1", &sf("1")).unwrap().stall_us(),
            Some(1)
        );
    }

    #[test]
    fn test_partitions_do_not_mix() {
        let trials = vec![
            Observation::new("A", "q1", "1", 10),
            Observation::new("B", "q1", "1", 5),
            Observation::new("A", "q1", "10", 1),
            Observation::new("A", "q3", "1", 2),
        ];
        let index = select_all(&trials);
        assert_eq!(index.len(), 4);
        assert_eq!(index.get("A", "q1", &sf("1")).unwrap().latency_ms(), 10);
    }

    #[test]
    fn test_empty_partition_is_none() {
        let trials = vec![Observation::new("A", "q1", "1", 10)];
        assert!(select(&trials, "A", "q3", &sf("1")).is_none());
        assert!(select(&[], "A", "q1", &sf("1")).is_none());
    }

    #[test]
    fn test_require_reports_missing() {
        let index = select_all(&[Observation::new("A", "q1", "1", 10)]);
        let mut issues = Vec::new();
        assert!(index.require("A", "q1", &sf("1"), &mut issues).is_some());
        assert!(index.require("A", "q3", &sf("1"), &mut issues).is_none());
        assert_eq!(
            issues,
            vec![DataIssue::Missing {
                engine: "A".to_string(),
                query: "q3".to_string(),
                scale_factor: sf("1"),
            }]
        );
    }

    #[test]
    fn test_check_cardinality() {
        let trials = vec![
            Observation::new("A", "q1", "1", 10),
            Observation::new("A", "q3", "1", 10),
            Observation::new("B", "q1", "1", 10),
            Observation::new("B", "q_extra", "1", 10),
        ];
        let index = select_all(&trials);
        let issues = check_cardinality(
            &index,
            &["A".to_string(), "B".to_string()],
            &[sf("1")],
            &["q1".to_string(), "q3".to_string()],
        );
        assert_eq!(
            issues,
            vec![DataIssue::UnknownQuery {
                engine: "B".to_string(),
                query: "q_extra".to_string(),
                scale_factor: sf("1"),
            }]
        );

        let short = check_cardinality(&index, &["A".to_string()], &[sf("10")], &["q1".to_string()]);
        assert!(matches!(
            short[0],
            DataIssue::Cardinality {
                expected: 1,
                actual: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_queries_for_is_sorted() {
        let trials = vec![
            Observation::new("A", "q99", "1", 1),
            Observation::new("A", "q1", "1", 1),
            Observation::new("A", "q87", "1", 1),
        ];
        let index = select_all(&trials);
        assert_eq!(index.queries_for("A", &sf("1")), vec!["q1", "q87", "q99"]);
    }
}
