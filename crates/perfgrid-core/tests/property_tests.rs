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

//! Property-based tests for selection and identifier normalization.
//!
//! - Selection: the selected latency is the group minimum and every other
//!   field belongs to one input row with that latency.
//! - Ties: the first minimal row in input order wins, in both entry points.
//! - Normalization: every kept id is a fixed point of `normalize_id`.

use perfgrid_core::{select, select_all, Observation, QueryRules, ScaleFactor};
use proptest::prelude::*;

// ===== Generators =====

fn engine() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["duckdb", "umbra", "inkfuse_rof"]).prop_map(str::to_string)
}

fn query() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "q1", "q3", "q13", "q14", "q18", "q19", "l_count", "l_point", "q87", "q_bigjoin",
    ])
    .prop_map(str::to_string)
}

fn scale_factor() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["0.1", "1", "10"]).prop_map(str::to_string)
}

fn observation() -> impl Strategy<Value = Observation> {
    (
        engine(),
        query(),
        scale_factor(),
        0u64..200,
        prop::option::of(0u64..100_000),
    )
        .prop_map(|(engine, query, sf, latency, stall)| {
            let mut obs = Observation::new(engine, query, sf.as_str(), latency);
            obs.stall_us = stall;
            obs
        })
}

fn rules() -> impl Strategy<Value = QueryRules> {
    prop::sample::select(vec![
        QueryRules::none(),
        QueryRules::main_figure(),
        QueryRules::split_figure(),
        QueryRules::engine_figure(),
    ])
}

proptest! {
    #[test]
    fn prop_selection_is_a_real_minimal_row(rows in prop::collection::vec(observation(), 1..60)) {
        let index = select_all(&rows);
        for (key, selection) in index.iter() {
            let group: Vec<&Observation> = rows.iter().filter(|o| &o.key() == key).collect();
            let min = group.iter().map(|o| o.latency_ms).min().unwrap();

            prop_assert_eq!(selection.latency_ms(), min);
            prop_assert_eq!(selection.trials, group.len());
            // The whole selected row exists verbatim in the input.
            prop_assert!(group.iter().any(|o| **o == selection.trial));
            // It is the first row with the minimal latency.
            let first = group.iter().find(|o| o.latency_ms == min).unwrap();
            prop_assert_eq!(&selection.trial, *first);
        }
    }

    #[test]
    fn prop_select_matches_select_all(rows in prop::collection::vec(observation(), 0..60)) {
        let index = select_all(&rows);
        for engine in ["duckdb", "umbra", "inkfuse_rof"] {
            for query in ["q1", "q3", "q13", "q87"] {
                for sf in ["0.1", "1", "10"] {
                    let sf = ScaleFactor::new(sf);
                    let single = select(&rows, engine, query, &sf);
                    let batch = index.get(engine, query, &sf).cloned();
                    prop_assert_eq!(single, batch);
                }
            }
        }
    }

    #[test]
    fn prop_normalized_rows_are_fixed_points(
        rows in prop::collection::vec(observation(), 0..40),
        rules in rules(),
    ) {
        let out = rules.normalize_observations(rows);
        for row in &out.rows {
            prop_assert_eq!(rules.normalize_id(&row.query), Some(row.query.as_str()));
        }
    }

    #[test]
    fn prop_normalize_id_is_idempotent(id in query(), rules in rules()) {
        if let Some(display) = rules.normalize_id(&id) {
            prop_assert_eq!(rules.normalize_id(display), Some(display));
        }
    }

    #[test]
    fn prop_excluded_ids_never_survive(
        rows in prop::collection::vec(observation(), 0..40),
        rules in rules(),
    ) {
        let out = rules.normalize_observations(rows.clone());
        prop_assert!(out.rows.iter().all(|o| !rules.is_excluded(&o.query)));
        prop_assert_eq!(
            out.rows.len() + out.excluded,
            rows.len() - rows.iter().filter(|o| {
                rules.remaps().all(|(from, _)| from != o.query)
                    && rules.remaps().any(|(_, to)| to == o.query)
            }).count()
        );
    }
}

#[test]
fn test_fastest_trial_keeps_its_own_stall() {
    let rows = vec![
        Observation::new("E", "q1", "1", 120).with_stall_us(30),
        Observation::new("E", "q1", "1", 95).with_stall_us(40),
    ];
    let index = select_all(&rows);
    let best = index.get("E", "q1", &ScaleFactor::new("1")).unwrap();
    assert_eq!(best.latency_ms(), 95);
    assert_eq!(best.stall_us(), Some(40));
}

#[test]
fn test_l_count_absent_downstream() {
    let rules = QueryRules::main_figure();
    let rows = rules
        .normalize_observations(vec![
            Observation::new("E", "l_count", "1", 1),
            Observation::new("E", "q1", "1", 10),
        ])
        .rows;
    let index = select_all(&rows);
    assert!(index.iter().all(|(key, _)| key.query != "l_count"));
    assert_eq!(index.len(), 1);
}
