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

//! Import-umbra command - converts raw Umbra logs into observation files

use crate::error::CliError;
use perfgrid_csv::umbra::import_dir;
use std::path::Path;

/// Appends the rows of every Umbra log in `source` to observation files in
/// `dest` and prints one line per written file.
pub fn import_umbra(source: &Path, dest: &Path) -> Result<(), CliError> {
    let summary = import_dir(source, dest)?;
    for (path, rows) in &summary.written {
        println!("{}: {} row(s)", path.display(), rows);
    }
    println!(
        "Imported {} log(s), skipped {} file(s)",
        summary.logs, summary.skipped
    );
    Ok(())
}
