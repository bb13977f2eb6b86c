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

//! Derived aggregates
//!
//! Aggregates are never persisted; they are recomputed from the event log
//! on every request. For every emitted row `distinct_user_count <= views_count`
//! and `views_count >= 1`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// View and distinct-user counts for one group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub views_count: u64,
    pub distinct_user_count: u64,
}

impl Counts {
    pub fn new(views_count: u64, distinct_user_count: u64) -> Self {
        debug_assert!(distinct_user_count <= views_count);
        Self {
            views_count,
            distinct_user_count,
        }
    }
}

/// Statistics for one page key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregate {
    pub page_key: String,
    pub views_count: u64,
    pub distinct_user_count: u64,
}

impl Aggregate {
    pub fn new(page_key: impl Into<String>, views_count: u64, distinct_user_count: u64) -> Self {
        debug_assert!(distinct_user_count <= views_count);
        Self {
            page_key: page_key.into(),
            views_count,
            distinct_user_count,
        }
    }

    pub fn counts(&self) -> Counts {
        Counts::new(self.views_count, self.distinct_user_count)
    }
}

/// Statistics for one UTC calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub views_count: u64,
    pub distinct_user_count: u64,
}

impl DailyAggregate {
    pub fn new(date: NaiveDate, views_count: u64, distinct_user_count: u64) -> Self {
        debug_assert!(distinct_user_count <= views_count);
        Self {
            date,
            views_count,
            distinct_user_count,
        }
    }
}

/// A page's statistics over a short and a long window
///
/// Produced by joining the long-window rows with the short-window rows by
/// page key; a page absent from the short window has zero short counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedAggregate {
    pub page_key: String,
    pub short: Counts,
    pub long: Counts,
}
