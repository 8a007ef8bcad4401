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

//! Query identifier normalization.
//!
//! Benchmark drivers emit auxiliary probe queries next to the real workload
//! and name queries so that a plain string sort puts `q13` before `q3`. The
//! [`QueryRules`] in this module drop the probes and rename selected queries
//! into display identifiers (`q13` becomes `q87`) so that sorting by display
//! id yields the intended left-to-right order.
//!
//! Both the chart and cost-report paths go through the same rules, and
//! [`QueryRules::raw_id`] recovers the workload name wherever a join against
//! workload constants is needed.

use crate::error::{CoreError, Result};
use crate::issue::DataIssue;
use crate::model::{CounterSample, Observation};
use std::collections::{BTreeMap, BTreeSet};

/// Denylist and display remapping for query identifiers.
///
/// A valid rule set is total and idempotent:
///
/// - every identifier is either excluded, remapped, or passed through;
/// - normalizing an already-normalized identifier returns it unchanged.
///
/// # Examples
///
/// ```
/// use perfgrid_core::QueryRules;
///
/// let rules = QueryRules::new(["l_count"], [("q13", "q87")]).unwrap();
/// assert_eq!(rules.normalize_id("q13"), Some("q87"));
/// assert_eq!(rules.normalize_id("q87"), Some("q87"));
/// assert_eq!(rules.normalize_id("q1"), Some("q1"));
/// assert_eq!(rules.normalize_id("l_count"), None);
/// assert_eq!(rules.label("q87"), "Q13");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "RulesDef", into = "RulesDef")
)]
pub struct QueryRules {
    excluded: BTreeSet<String>,
    remap: BTreeMap<String, String>,
}

/// Serialized shape of [`QueryRules`]; validated on the way in.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
struct RulesDef {
    #[cfg_attr(feature = "serde", serde(default))]
    exclude: Vec<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    remap: BTreeMap<String, String>,
}

impl TryFrom<RulesDef> for QueryRules {
    type Error = CoreError;

    fn try_from(def: RulesDef) -> Result<Self> {
        QueryRules::new(def.exclude, def.remap)
    }
}

impl From<QueryRules> for RulesDef {
    fn from(rules: QueryRules) -> Self {
        RulesDef {
            exclude: rules.excluded.into_iter().collect(),
            remap: rules.remap,
        }
    }
}

/// Result of normalizing raw rows.
#[derive(Debug, Clone, Default)]
pub struct NormalizedRows<T> {
    /// Surviving rows, remapped, in input order.
    pub rows: Vec<T>,
    /// Number of rows removed by the denylist.
    pub excluded: usize,
    /// Rows removed because their raw id collides with a display id.
    pub issues: Vec<DataIssue>,
}

impl QueryRules {
    /// Builds and validates a rule set.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidRules`] if a remap target is also a remap
    /// source or excluded, if an excluded id is also remapped, or if two
    /// sources share a target.
    pub fn new<E, S, R, A, B>(excluded: E, remap: R) -> Result<Self>
    where
        E: IntoIterator<Item = S>,
        S: Into<String>,
        R: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        let excluded: BTreeSet<String> = excluded.into_iter().map(Into::into).collect();
        let mut map = BTreeMap::new();
        let mut targets = BTreeSet::new();
        for (from, to) in remap {
            let (from, to) = (from.into(), to.into());
            if !targets.insert(to.clone()) {
                return Err(CoreError::InvalidRules(format!(
                    "more than one query is remapped to '{}'",
                    to
                )));
            }
            if map.insert(from.clone(), to).is_some() {
                return Err(CoreError::InvalidRules(format!(
                    "'{}' is remapped twice",
                    from
                )));
            }
        }
        let rules = QueryRules {
            excluded,
            remap: map,
        };
        rules.validate()?;
        Ok(rules)
    }

    /// Rules that pass every identifier through.
    pub fn none() -> Self {
        QueryRules::default()
    }

    /// Rules of the four-panel latency figure.
    pub fn main_figure() -> Self {
        Self::preset(
            &["l_count", "l_point", "q_bigjoin", "q18"],
            &[("q13", "q87"), ("q14", "q88"), ("q19", "q99")],
        )
    }

    /// Rules of the figure with a separate overflow panel for Q18.
    pub fn split_figure() -> Self {
        Self::preset(
            &["l_count", "l_point"],
            &[("q13", "q87"), ("q14", "q88"), ("q18", "q98"), ("q19", "q99")],
        )
    }

    /// Rules of the single-engine execution-mode comparison.
    pub fn engine_figure() -> Self {
        Self::preset(
            &["l_count", "l_point", "q_bigjoin"],
            &[("q13", "q87"), ("q14", "q88"), ("q18", "q98"), ("q19", "q99")],
        )
    }

    fn preset(excluded: &[&str], remap: &[(&str, &str)]) -> Self {
        QueryRules {
            excluded: excluded.iter().map(|s| s.to_string()).collect(),
            remap: remap
                .iter()
                .map(|(a, b)| (a.to_string(), b.to_string()))
                .collect(),
        }
    }

    /// Checks totality and idempotence of the rule set.
    pub fn validate(&self) -> Result<()> {
        for (from, to) in &self.remap {
            if self.excluded.contains(from) {
                return Err(CoreError::InvalidRules(format!(
                    "'{}' is both excluded and remapped",
                    from
                )));
            }
            if self.excluded.contains(to) {
                return Err(CoreError::InvalidRules(format!(
                    "remap target '{}' is excluded",
                    to
                )));
            }
            if from != to && self.remap.contains_key(to) {
                return Err(CoreError::InvalidRules(format!(
                    "remap target '{}' is itself remapped",
                    to
                )));
            }
        }
        Ok(())
    }

    /// Excluded identifiers.
    pub fn excluded(&self) -> impl Iterator<Item = &str> {
        self.excluded.iter().map(String::as_str)
    }

    /// Remap pairs `(raw, display)`.
    pub fn remaps(&self) -> impl Iterator<Item = (&str, &str)> {
        self.remap.iter().map(|(a, b)| (a.as_str(), b.as_str()))
    }

    pub fn is_excluded(&self, id: &str) -> bool {
        self.excluded.contains(id)
    }

    /// Maps a raw identifier to its display identifier.
    ///
    /// Returns `None` for excluded identifiers.
    pub fn normalize_id<'a>(&'a self, id: &'a str) -> Option<&'a str> {
        if self.excluded.contains(id) {
            return None;
        }
        Some(self.remap.get(id).map(String::as_str).unwrap_or(id))
    }

    /// Maps a display identifier back to the workload's identifier.
    pub fn raw_id<'a>(&'a self, display: &'a str) -> &'a str {
        self.remap
            .iter()
            .find(|(_, to)| to.as_str() == display)
            .map(|(from, _)| from.as_str())
            .unwrap_or(display)
    }

    /// Human label for a display identifier (`q87` becomes `Q13`).
    pub fn label(&self, display: &str) -> String {
        let raw = self.raw_id(display);
        match raw.strip_prefix('q') {
            Some(rest) if !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()) => {
                format!("Q{}", rest)
            }
            _ => raw.to_string(),
        }
    }

    /// Whether a raw identifier would land in a remapped query's bucket.
    fn collides(&self, raw: &str) -> bool {
        !self.remap.contains_key(raw) && self.remap.values().any(|to| to == raw)
    }

    /// Normalizes freshly ingested observations.
    ///
    /// Raw rows whose id already equals a display id (a real `q87` next to a
    /// remapped `q13`) are dropped and reported rather than merged.
    pub fn normalize_observations(
        &self,
        observations: Vec<Observation>,
    ) -> NormalizedRows<Observation> {
        let mut out = NormalizedRows {
            rows: Vec::with_capacity(observations.len()),
            excluded: 0,
            issues: Vec::new(),
        };
        for mut obs in observations {
            if self.collides(&obs.query) {
                push_collision(&mut out.issues, &obs.engine, &obs.query, &obs.scale_factor);
                continue;
            }
            match self.normalize_id(&obs.query).map(str::to_string) {
                Some(display) => {
                    obs.query = display;
                    out.rows.push(obs);
                }
                None => out.excluded += 1,
            }
        }
        tracing::debug!(
            kept = out.rows.len(),
            excluded = out.excluded,
            collisions = out.issues.len(),
            "normalized query identifiers"
        );
        out
    }

    /// Normalizes freshly ingested counter samples.
    pub fn normalize_samples(&self, samples: Vec<CounterSample>) -> NormalizedRows<CounterSample> {
        let mut out = NormalizedRows {
            rows: Vec::with_capacity(samples.len()),
            excluded: 0,
            issues: Vec::new(),
        };
        for mut sample in samples {
            if self.collides(&sample.query) {
                push_collision(
                    &mut out.issues,
                    &sample.backend,
                    &sample.query,
                    &sample.scale_factor,
                );
                continue;
            }
            match self.normalize_id(&sample.query).map(str::to_string) {
                Some(display) => {
                    sample.query = display;
                    out.rows.push(sample);
                }
                None => out.excluded += 1,
            }
        }
        out
    }
}

fn push_collision(
    issues: &mut Vec<DataIssue>,
    engine: &str,
    query: &str,
    scale_factor: &crate::model::ScaleFactor,
) {
    let issue = DataIssue::IdCollision {
        engine: engine.to_string(),
        query: query.to_string(),
        scale_factor: scale_factor.clone(),
    };
    if !issues.contains(&issue) {
        issues.push(issue);
    }
}
