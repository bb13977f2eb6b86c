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

//! Statistics Service
//!
//! Facade over the event store and the aggregation engine. Every operation
//! first checks the caller identity, then (for reads) asks the user directory
//! whether the caller is an admin, and only then touches the store.
//!
//! Windows, relative to the start of the current UTC day:
//!
//! | Report            | per page                              | per day            |
//! |-------------------|---------------------------------------|--------------------|
//! | overall / page    | last 30 completed days                | last 30 days + today |
//! | articles          | 30 completed days joined with 365 days | last 30 days + today |
//! | day               | `[date, date + 1)`                    | -                  |
//!
//! Store calls are blocking and run on the blocking pool. Reads are bounded
//! by the store timeout. Appends run to completion: `record_page_load`
//! returns once the event is fully stored or fully rejected.

use crate::directory::UserDirectory;
use chrono::NaiveDate;
use pagestats_core::{
    Aggregate, Counts, DailyAggregate, EventFilter, IdSource, MergedAggregate, PageLoadEvent,
    PagestatsError, Result, StatisticsConfig, TimeSource,
};
use pagestats_query::{group_by_day, group_by_page, merge_windows, Window};
use pagestats_storage::{EventRecorder, EventStore};
use regex::Regex;
use std::sync::Arc;
use std::time::Duration;

/// Per-page row of a statistics report
///
/// `long` is only filled in for article statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageStatistics {
    pub page_key: String,
    pub short: Counts,
    pub long: Option<Counts>,
}

impl From<Aggregate> for PageStatistics {
    fn from(row: Aggregate) -> Self {
        Self {
            short: row.counts(),
            page_key: row.page_key,
            long: None,
        }
    }
}

impl From<MergedAggregate> for PageStatistics {
    fn from(row: MergedAggregate) -> Self {
        Self {
            page_key: row.page_key,
            short: row.short,
            long: Some(row.long),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatisticsReport {
    pub per_page: Vec<PageStatistics>,
    pub per_day: Vec<DailyAggregate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayStatisticsReport {
    pub per_page: Vec<Aggregate>,
}

/// Longest accepted page key, in bytes
pub const MAX_PAGE_KEY_LEN: usize = 2048;

/// Reject a missing or blank caller identity; the id itself is kept as sent
pub fn require_identity(caller: Option<&str>) -> Result<&str> {
    match caller {
        Some(user_id) if !user_id.trim().is_empty() => Ok(user_id),
        _ => Err(PagestatsError::IdentityRequired),
    }
}

fn check_page_key(page_key: &str) -> Result<()> {
    if page_key.len() > MAX_PAGE_KEY_LEN {
        return Err(PagestatsError::InvalidParameter {
            name: "pageKey".to_string(),
            reason: format!("longer than {} bytes", MAX_PAGE_KEY_LEN),
        });
    }
    Ok(())
}

pub struct StatisticsService {
    store: Arc<dyn EventStore>,
    recorder: EventRecorder,
    directory: Arc<dyn UserDirectory>,
    clock: Arc<dyn TimeSource>,
    article_pattern: Regex,
    config: StatisticsConfig,
    store_timeout: Duration,
}

impl StatisticsService {
    pub fn new(
        store: Arc<dyn EventStore>,
        directory: Arc<dyn UserDirectory>,
        clock: Arc<dyn TimeSource>,
        ids: Arc<dyn IdSource>,
        config: StatisticsConfig,
        store_timeout: Duration,
    ) -> Result<Self> {
        config.validate()?;
        let article_pattern = config.article_regex()?;
        let recorder = EventRecorder::new(store.clone(), ids, clock.clone());

        Ok(Self {
            store,
            recorder,
            directory,
            clock,
            article_pattern,
            config,
            store_timeout,
        })
    }

    /// Record one page load; any identified caller may do this
    pub async fn record_page_load(
        &self,
        caller: Option<&str>,
        page_key: &str,
    ) -> Result<PageLoadEvent> {
        let user_id = require_identity(caller)?.to_string();
        check_page_key(page_key)?;
        let recorder = self.recorder.clone();
        let page_key = page_key.to_string();

        tokio::task::spawn_blocking(move || recorder.record(&user_id, &page_key))
            .await
            .map_err(|join_error| {
                PagestatsError::Storage(format!("append task failed: {}", join_error))
            })?
    }

    /// Statistics across every page
    pub async fn overall_statistics(&self, caller: Option<&str>) -> Result<StatisticsReport> {
        self.require_admin(caller).await?;
        self.windowed_report(EventFilter::all()).await
    }

    /// Statistics for one exact page key
    pub async fn page_statistics(
        &self,
        caller: Option<&str>,
        page_key: &str,
    ) -> Result<StatisticsReport> {
        self.require_admin(caller).await?;
        self.windowed_report(EventFilter::all().exact_page(page_key))
            .await
    }

    /// Statistics for article pages, with the long window alongside the short one
    pub async fn article_statistics(&self, caller: Option<&str>) -> Result<StatisticsReport> {
        self.require_admin(caller).await?;

        let now = self.clock.now();
        let articles = EventFilter::all().page_regex(self.article_pattern.clone());
        let short_pages =
            Window::completed_days(now, self.config.short_window_days).apply(articles.clone());
        let long_pages =
            Window::trailing_days(now, self.config.long_window_days).apply(articles.clone());
        let days = Window::trailing_days(now, self.config.short_window_days).apply(articles);

        let store = self.store.clone();
        self.run_store(move || {
            let long_rows = group_by_page(store.as_ref(), &long_pages)?;
            let short_rows = group_by_page(store.as_ref(), &short_pages)?;
            let per_day = group_by_day(store.as_ref(), &days)?;

            Ok(StatisticsReport {
                per_page: merge_windows(&long_rows, &short_rows)
                    .into_iter()
                    .map(PageStatistics::from)
                    .collect(),
                per_day,
            })
        })
        .await
    }

    /// Per-page statistics for a single UTC day
    pub async fn day_statistics(
        &self,
        caller: Option<&str>,
        date: NaiveDate,
    ) -> Result<DayStatisticsReport> {
        self.require_admin(caller).await?;

        let filter = Window::day(date).filter();
        let store = self.store.clone();
        self.run_store(move || {
            Ok(DayStatisticsReport {
                per_page: group_by_page(store.as_ref(), &filter)?,
            })
        })
        .await
    }

    /// Number of stored events
    pub async fn event_count(&self) -> Result<usize> {
        let store = self.store.clone();
        self.run_store(move || store.len()).await
    }

    async fn require_admin<'a>(&self, caller: Option<&'a str>) -> Result<&'a str> {
        let user_id = require_identity(caller)?;
        if !self.directory.is_admin(user_id).await? {
            tracing::warn!(user_id, "Statistics requested by non-admin user");
            return Err(PagestatsError::ForbiddenOperation);
        }
        Ok(user_id)
    }

    /// Per-page rows over completed days and per-day rows including today
    async fn windowed_report(&self, pages: EventFilter) -> Result<StatisticsReport> {
        let now = self.clock.now();
        let days = self.config.short_window_days;
        let page_filter = Window::completed_days(now, days).apply(pages.clone());
        let day_filter = Window::trailing_days(now, days).apply(pages);

        let store = self.store.clone();
        self.run_store(move || {
            let per_page = group_by_page(store.as_ref(), &page_filter)?;
            let per_day = group_by_day(store.as_ref(), &day_filter)?;
            Ok(StatisticsReport {
                per_page: per_page.into_iter().map(PageStatistics::from).collect(),
                per_day,
            })
        })
        .await
    }

    /// Run a read on the blocking pool, bounded by the store timeout
    async fn run_store<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        match tokio::time::timeout(self.store_timeout, tokio::task::spawn_blocking(op)).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(PagestatsError::Storage(format!(
                "store task failed: {}",
                join_error
            ))),
            Err(_) => Err(PagestatsError::StoreTimeout(self.store_timeout)),
        }
    }
}
