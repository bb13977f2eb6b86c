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

//! Page-load event record
//!
//! One record per page view. Events are immutable once written; only the
//! timestamp carries meaning for queries, never the insertion order.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A single recorded page view
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageLoadEvent {
    /// Unique id assigned at write time
    pub id: String,

    /// Opaque viewer identifier
    pub user_id: String,

    /// Instant the view was recorded (UTC)
    pub timestamp: DateTime<Utc>,

    /// Key of the viewed page
    pub page_key: String,
}

impl PageLoadEvent {
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        page_key: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            timestamp,
            page_key: page_key.into(),
        }
    }

    /// UTC calendar day this event falls on
    pub fn day(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}
