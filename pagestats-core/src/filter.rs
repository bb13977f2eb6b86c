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

//! Event filter
//!
//! A single immutable value describing which events a query selects.
//! Every field is optional; an absent field leaves that dimension
//! unconstrained. Time bounds are half-open: `[from_inclusive, to_exclusive)`.

use crate::error::Result;
use crate::event::PageLoadEvent;
use chrono::{DateTime, Utc};
use regex::Regex;

/// How the page key of an event is matched
#[derive(Debug, Clone)]
pub enum PageKeyMatch {
    /// Byte-for-byte equality
    Exact(String),
    /// Regex search; anchor with `^` to select a key namespace
    Pattern(Regex),
}

impl PageKeyMatch {
    pub fn matches(&self, page_key: &str) -> bool {
        match self {
            PageKeyMatch::Exact(key) => key == page_key,
            PageKeyMatch::Pattern(re) => re.is_match(page_key),
        }
    }
}

/// Filter applied by the event store before aggregation
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub page_key: Option<PageKeyMatch>,
    pub from_inclusive: Option<DateTime<Utc>>,
    pub to_exclusive: Option<DateTime<Utc>>,
}

impl EventFilter {
    /// Filter that selects every event
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to one exact page key
    pub fn exact_page(mut self, page_key: impl Into<String>) -> Self {
        self.page_key = Some(PageKeyMatch::Exact(page_key.into()));
        self
    }

    /// Restrict to page keys matching a regex
    pub fn page_pattern(self, pattern: &str) -> Result<Self> {
        Ok(self.page_regex(Regex::new(pattern)?))
    }

    /// Restrict to page keys matching an already compiled regex
    pub fn page_regex(mut self, regex: Regex) -> Self {
        self.page_key = Some(PageKeyMatch::Pattern(regex));
        self
    }

    /// Set both time bounds at once (`None` = unbounded)
    pub fn between(
        mut self,
        from_inclusive: Option<DateTime<Utc>>,
        to_exclusive: Option<DateTime<Utc>>,
    ) -> Self {
        self.from_inclusive = from_inclusive;
        self.to_exclusive = to_exclusive;
        self
    }

    pub fn since(mut self, from_inclusive: DateTime<Utc>) -> Self {
        self.from_inclusive = Some(from_inclusive);
        self
    }

    pub fn until(mut self, to_exclusive: DateTime<Utc>) -> Self {
        self.to_exclusive = Some(to_exclusive);
        self
    }

    /// Whether an event belongs to the filtered set
    pub fn matches(&self, event: &PageLoadEvent) -> bool {
        if let Some(from) = self.from_inclusive {
            if event.timestamp < from {
                return false;
            }
        }
        if let Some(to) = self.to_exclusive {
            if event.timestamp >= to {
                return false;
            }
        }
        match &self.page_key {
            Some(key) => key.matches(&event.page_key),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2007, 12, 3, 0, 0, 0).unwrap() + Duration::seconds(secs)
    }

    fn event(page_key: &str, secs: i64) -> PageLoadEvent {
        PageLoadEvent::new("id", "user", at(secs), page_key)
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = EventFilter::all();
        assert!(filter.matches(&event("anything", -1_000_000)));
        assert!(filter.matches(&event("", 1_000_000)));
    }

    #[test]
    fn test_exact_page_key() {
        let filter = EventFilter::all().exact_page("page-key");
        assert!(filter.matches(&event("page-key", 0)));
        assert!(!filter.matches(&event("page-key-2", 0)));
        assert!(!filter.matches(&event("other", 0)));
    }

    #[test]
    fn test_pattern_page_key() {
        let filter = EventFilter::all().page_pattern("^kta-article-").unwrap();
        assert!(filter.matches(&event("kta-article-key", 0)));
        assert!(filter.matches(&event("kta-article-key-2", 0)));
        assert!(!filter.matches(&event("page-kta-article-key", 0)));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(EventFilter::all().page_pattern("(unclosed").is_err());
    }

    #[test]
    fn test_bounds_are_half_open() {
        let filter = EventFilter::all().since(at(0)).until(at(10));
        assert!(filter.matches(&event("p", 0)));
        assert!(filter.matches(&event("p", 9)));
        assert!(!filter.matches(&event("p", 10)));
        assert!(!filter.matches(&event("p", -1)));
    }

    proptest! {
        #[test]
        fn prop_window_membership(from in -1000i64..1000, len in 0i64..1000, ts in -3000i64..3000) {
            let filter = EventFilter::all().between(Some(at(from)), Some(at(from + len)));
            let inside = ts >= from && ts < from + len;
            prop_assert_eq!(filter.matches(&event("p", ts)), inside);
        }
    }
}
