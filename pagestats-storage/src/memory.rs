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

//! In-memory event store

use crate::EventStore;
use pagestats_core::{EventFilter, PageLoadEvent, Result};
use parking_lot::RwLock;

/// Event store backed by a vector; contents are lost on drop
#[derive(Debug, Default)]
pub struct MemoryEventStore {
    events: RwLock<Vec<PageLoadEvent>>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `events`
    pub fn with_events(events: impl IntoIterator<Item = PageLoadEvent>) -> Self {
        Self {
            events: RwLock::new(events.into_iter().collect()),
        }
    }

    /// Drop every stored event (test cleanup only)
    pub fn clear(&self) {
        self.events.write().clear();
    }
}

impl EventStore for MemoryEventStore {
    fn append(&self, event: PageLoadEvent) -> Result<()> {
        self.events.write().push(event);
        Ok(())
    }

    fn query(&self, filter: &EventFilter) -> Result<Vec<PageLoadEvent>> {
        Ok(self
            .events
            .read()
            .iter()
            .filter(|event| filter.matches(event))
            .cloned()
            .collect())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.events.read().len())
    }
}
