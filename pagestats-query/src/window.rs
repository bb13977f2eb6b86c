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

//! Time windows expressed as half-open filter bounds

use chrono::{DateTime, Duration, NaiveDate, Utc};
use pagestats_core::{start_of_day, EventFilter};

/// Half-open interval `[from, to)`; `None` leaves that side unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl Window {
    /// `[start of today - days, unbounded)`; today is always included
    pub fn trailing_days(now: DateTime<Utc>, days: u32) -> Self {
        let today = start_of_day(now.date_naive());
        Self {
            from: Some(today - Duration::days(i64::from(days))),
            to: None,
        }
    }

    /// `[start of today - days, start of today)`; today is excluded
    pub fn completed_days(now: DateTime<Utc>, days: u32) -> Self {
        let today = start_of_day(now.date_naive());
        Self {
            from: Some(today - Duration::days(i64::from(days))),
            to: Some(today),
        }
    }

    /// The single UTC calendar day `date`
    pub fn day(date: NaiveDate) -> Self {
        let start = start_of_day(date);
        Self {
            from: Some(start),
            to: Some(start + Duration::days(1)),
        }
    }

    /// Narrow `filter` to this window
    pub fn apply(&self, filter: EventFilter) -> EventFilter {
        filter.between(self.from, self.to)
    }

    /// Filter selecting every page inside this window
    pub fn filter(&self) -> EventFilter {
        self.apply(EventFilter::all())
    }
}
