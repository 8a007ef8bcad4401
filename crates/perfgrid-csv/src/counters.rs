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

//! Hardware-counter table reading.
//!
//! Counter tables carry a header row and are located by column name, so
//! extra columns and any column order are accepted.

use crate::error::{IngestError, Result};
use crate::observations::IngestConfig;
use perfgrid_core::{Counter, CounterSample, Counters};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const BACKEND: &str = "backend";
const QUERY: &str = "query";
const SCALE_FACTOR: &str = "sf";

/// Reads a counter table file.
pub fn read_counter_samples(path: &Path, config: IngestConfig) -> Result<Vec<CounterSample>> {
    let file = File::open(path).map_err(|e| IngestError::io(path, e))?;
    let rows = read_counter_samples_from_reader(file, &path.display().to_string(), config)?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "read counter table");
    Ok(rows)
}

/// Reads counter samples from any reader.
///
/// Required columns are `backend`, `query`, `sf` and one column per
/// [`Counter::input_name`].
///
/// # Errors
///
/// - [`IngestError::MissingColumn`] when a required column is absent.
/// - [`IngestError::InvalidNumber`] when a counter value is not a number.
/// - [`IngestError::Csv`] for rows whose width differs from the header.
///
/// # Examples
///
/// ```
/// use perfgrid_csv::{read_counter_samples_from_reader, IngestConfig};
///
/// let data = "backend,query,sf,cycles,instructions,L1-misses,LLC-misses,branch-misses,IPC\n\
///             rof, q1,1,600,900,12,3,4,1.5\n";
/// let rows = read_counter_samples_from_reader(data.as_bytes(), "perf.csv", IngestConfig::default()).unwrap();
/// assert_eq!(rows[0].query, "q1");
/// assert_eq!(rows[0].counters.cycles, 600.0);
/// ```
pub fn read_counter_samples_from_reader<R: Read>(
    reader: R,
    source: &str,
    config: IngestConfig,
) -> Result<Vec<CounterSample>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| IngestError::csv(source, e))?
        .clone();
    let column = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| IngestError::MissingColumn {
                path: source.to_string(),
                column: name.to_string(),
            })
    };

    let backend_idx = column(BACKEND)?;
    let query_idx = column(QUERY)?;
    let sf_idx = column(SCALE_FACTOR)?;
    let mut counter_idx = Vec::with_capacity(Counter::ALL.len());
    for counter in Counter::ALL {
        counter_idx.push((counter, column(counter.input_name())?));
    }

    let mut rows = Vec::new();
    for (record_idx, result) in csv_reader.records().enumerate() {
        if record_idx >= config.max_rows {
            return Err(IngestError::RowLimit {
                path: source.to_string(),
                limit: config.max_rows,
            });
        }
        let record = result.map_err(|e| IngestError::csv(source, e))?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(record_idx + 2);

        let mut counters = Counters::default();
        for &(counter, idx) in &counter_idx {
            let field = &record[idx];
            *counters.get_mut(counter) =
                field.parse().map_err(|_| IngestError::InvalidNumber {
                    path: source.to_string(),
                    line,
                    column: counter.input_name().to_string(),
                    value: field.to_string(),
                })?;
        }

        rows.push(CounterSample::new(
            &record[backend_idx],
            &record[query_idx],
            &record[sf_idx],
            counters,
        ));
    }
    Ok(rows)
}
