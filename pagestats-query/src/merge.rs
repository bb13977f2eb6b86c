// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Two-window merge of per-page statistics.

use pagestats_core::{Aggregate, Counts, MergedAggregate};
use std::collections::HashMap;

/// Left join of `long` with `short` by page key
///
/// Every row of `long` produces exactly one output row, in the same order.
/// Pages missing from `short` get zero short counts; pages only present in
/// `short` are dropped, since the long window always covers the short one.
pub fn merge_windows(long: &[Aggregate], short: &[Aggregate]) -> Vec<MergedAggregate> {
    let short_by_key: HashMap<&str, Counts> = short
        .iter()
        .map(|row| (row.page_key.as_str(), row.counts()))
        .collect();

    long.iter()
        .map(|row| MergedAggregate {
            page_key: row.page_key.clone(),
            short: short_by_key
                .get(row.page_key.as_str())
                .copied()
                .unwrap_or_default(),
            long: row.counts(),
        })
        .collect()
}
