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

//! Pagestats Core
//!
//! Fundamental data structures for page-load analytics: the event record,
//! the query filter, derived aggregates, and the injected clock and id
//! capabilities.

pub mod aggregate;
pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod filter;
pub mod id;

pub use aggregate::{Aggregate, Counts, DailyAggregate, MergedAggregate};
pub use clock::{start_of_day, ManualTimeSource, SystemTimeSource, TimeSource};
pub use config::{
    StatisticsConfig, DEFAULT_ARTICLE_PATTERN, DEFAULT_LONG_WINDOW_DAYS,
    DEFAULT_SHORT_WINDOW_DAYS,
};
pub use error::{PagestatsError, Result};
pub use event::PageLoadEvent;
pub use filter::{EventFilter, PageKeyMatch};
pub use id::{IdSource, SequentialIdSource, UuidIdSource};
