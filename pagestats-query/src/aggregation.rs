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

//! Grouped aggregation of page-load events
//!
//! Both groupings count views (events in the group) and distinct users
//! (unique `user_id`s in the group). Groups only exist for keys that have at
//! least one event, so empty pages and empty days never appear.
//!
//! Ordering:
//! - per page: `views_count` descending, then `page_key` ascending
//! - per day: `date` descending

use chrono::NaiveDate;
use pagestats_core::{Aggregate, DailyAggregate, EventFilter, PageLoadEvent, Result};
use pagestats_storage::EventStore;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

#[derive(Default)]
struct Group<'a> {
    views: u64,
    users: HashSet<&'a str>,
}

fn group_events<'a, K, F>(events: &'a [PageLoadEvent], key_of: F) -> HashMap<K, Group<'a>>
where
    K: Eq + Hash,
    F: Fn(&'a PageLoadEvent) -> K,
{
    let mut groups: HashMap<K, Group<'a>> = HashMap::new();
    for event in events {
        let group = groups.entry(key_of(event)).or_default();
        group.views += 1;
        group.users.insert(event.user_id.as_str());
    }
    groups
}

/// Per-page statistics for an already filtered set of events
pub fn page_aggregates(events: &[PageLoadEvent]) -> Vec<Aggregate> {
    let mut rows: Vec<Aggregate> = group_events(events, |e| e.page_key.as_str())
        .into_iter()
        .map(|(page_key, group)| {
            Aggregate::new(page_key, group.views, group.users.len() as u64)
        })
        .collect();

    rows.sort_by(|a, b| {
        b.views_count
            .cmp(&a.views_count)
            .then_with(|| a.page_key.cmp(&b.page_key))
    });
    rows
}

/// Per-day statistics for an already filtered set of events
pub fn daily_aggregates(events: &[PageLoadEvent]) -> Vec<DailyAggregate> {
    let mut rows: Vec<DailyAggregate> = group_events(events, PageLoadEvent::day)
        .into_iter()
        .map(|(date, group): (NaiveDate, Group<'_>)| {
            DailyAggregate::new(date, group.views, group.users.len() as u64)
        })
        .collect();

    rows.sort_by(|a, b| b.date.cmp(&a.date));
    rows
}

/// Group the events matching `filter` by page key
pub fn group_by_page(store: &dyn EventStore, filter: &EventFilter) -> Result<Vec<Aggregate>> {
    let events = store.query(filter)?;
    let rows = page_aggregates(&events);
    tracing::trace!(events = events.len(), pages = rows.len(), "Grouped by page");
    Ok(rows)
}

/// Group the events matching `filter` by UTC calendar day
pub fn group_by_day(store: &dyn EventStore, filter: &EventFilter) -> Result<Vec<DailyAggregate>> {
    let events = store.query(filter)?;
    let rows = daily_aggregates(&events);
    tracing::trace!(events = events.len(), days = rows.len(), "Grouped by day");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use pagestats_storage::MemoryEventStore;
    use proptest::prelude::*;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2007, 12, 3, 10, 15, 30).unwrap()
    }

    fn load(user: &str, page: &str, days: i64) -> PageLoadEvent {
        PageLoadEvent::new("id", user, base() + Duration::days(days), page)
    }

    fn date(days: i64) -> NaiveDate {
        (base() + Duration::days(days)).date_naive()
    }

    fn three_day_store() -> MemoryEventStore {
        MemoryEventStore::with_events(vec![
            load("A", "p1", 0),
            load("B", "p2", 0),
            load("A", "p1", 1),
            load("A", "p1", 1),
            load("A", "p2", 1),
            load("B", "p2", 1),
            load("A", "p1", 2),
            load("B", "p1", 2),
        ])
    }

    #[test]
    fn test_group_by_page() {
        let store = three_day_store();
        let rows = group_by_page(&store, &EventFilter::all()).unwrap();
        assert_eq!(
            rows,
            vec![Aggregate::new("p1", 5, 2), Aggregate::new("p2", 3, 2)]
        );
    }

    #[test]
    fn test_group_by_page_ties_break_on_key() {
        let store = MemoryEventStore::with_events(vec![
            load("A", "zeta", 0),
            load("A", "alpha", 0),
            load("B", "mid", 0),
        ]);
        let keys: Vec<_> = group_by_page(&store, &EventFilter::all())
            .unwrap()
            .into_iter()
            .map(|row| row.page_key)
            .collect();
        assert_eq!(keys, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_group_by_day() {
        let store = three_day_store();
        let rows = group_by_day(&store, &EventFilter::all().exact_page("p1")).unwrap();
        assert_eq!(
            rows,
            vec![
                DailyAggregate::new(date(2), 2, 2),
                DailyAggregate::new(date(1), 2, 1),
                DailyAggregate::new(date(0), 1, 1),
            ]
        );
    }

    #[test]
    fn test_day_boundary_is_utc_midnight() {
        let midnight = Utc.with_ymd_and_hms(2007, 12, 4, 0, 0, 0).unwrap();
        let store = MemoryEventStore::with_events(vec![
            PageLoadEvent::new("1", "A", midnight - Duration::nanoseconds(1), "p"),
            PageLoadEvent::new("2", "A", midnight, "p"),
        ]);
        let rows = group_by_day(&store, &EventFilter::all()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2007, 12, 4).unwrap());
        assert_eq!(rows[1].date, NaiveDate::from_ymd_opt(2007, 12, 3).unwrap());
    }

    #[test]
    fn test_empty_store() {
        let store = MemoryEventStore::new();
        assert!(group_by_page(&store, &EventFilter::all()).unwrap().is_empty());
        assert!(group_by_day(&store, &EventFilter::all()).unwrap().is_empty());
    }

    fn arb_events() -> impl Strategy<Value = Vec<PageLoadEvent>> {
        prop::collection::vec((0u8..5, 0u8..4, 0i64..(10 * 24 * 3600)), 0..200).prop_map(
            |raw| {
                raw.into_iter()
                    .map(|(user, page, secs)| {
                        PageLoadEvent::new(
                            "id",
                            format!("user-{}", user),
                            base() + Duration::seconds(secs),
                            format!("page-{}", page),
                        )
                    })
                    .collect()
            },
        )
    }

    proptest! {
        #[test]
        fn prop_page_rows_are_consistent(events in arb_events()) {
            let rows = page_aggregates(&events);
            let total: u64 = rows.iter().map(|r| r.views_count).sum();
            prop_assert_eq!(total, events.len() as u64);
            for row in &rows {
                prop_assert!(row.views_count >= 1);
                prop_assert!(row.distinct_user_count <= row.views_count);
            }
            for pair in rows.windows(2) {
                prop_assert!(pair[0].views_count >= pair[1].views_count);
            }
        }

        #[test]
        fn prop_day_rows_are_consistent(events in arb_events()) {
            let rows = daily_aggregates(&events);
            let total: u64 = rows.iter().map(|r| r.views_count).sum();
            prop_assert_eq!(total, events.len() as u64);
            for row in &rows {
                prop_assert!(row.views_count >= 1);
                prop_assert!(row.distinct_user_count <= row.views_count);
            }
            for pair in rows.windows(2) {
                prop_assert!(pair[0].date > pair[1].date);
            }
        }
    }
}
