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

use crate::EventStore;
use pagestats_core::{IdSource, PageLoadEvent, Result, TimeSource};
use std::sync::Arc;

/// Writes page loads, assigning the id and timestamp at write time
#[derive(Clone)]
pub struct EventRecorder {
    store: Arc<dyn EventStore>,
    ids: Arc<dyn IdSource>,
    clock: Arc<dyn TimeSource>,
}

impl EventRecorder {
    pub fn new(
        store: Arc<dyn EventStore>,
        ids: Arc<dyn IdSource>,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        Self { store, ids, clock }
    }

    /// Append one page load for `user_id` and return the stored event
    pub fn record(&self, user_id: &str, page_key: &str) -> Result<PageLoadEvent> {
        let event = PageLoadEvent::new(self.ids.next_id(), user_id, self.clock.now(), page_key);
        self.store.append(event.clone())?;
        tracing::debug!(id = %event.id, page_key = %event.page_key, "Recorded page load");
        Ok(event)
    }
}
