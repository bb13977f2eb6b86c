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

//! Pagestats Storage Layer
//!
//! Append-only event store for page-load events.
//!
//! ## Architecture
//!
//! - **EventStore**: the contract the aggregation engine reads through
//! - **MemoryEventStore**: process-local store, used by tests and `--memory`
//! - **FileEventStore**: CRC-checked append-only log replayed on open
//! - **EventRecorder**: stamps new events with an id and a timestamp
//!
//! All I/O is synchronous; async callers offload it with `spawn_blocking`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pagestats_storage::{EventStore, FileEventStore};
//! use pagestats_core::EventFilter;
//!
//! let store = FileEventStore::open("./pagestats-data")?;
//! let events = store.query(&EventFilter::all().exact_page("home"))?;
//! ```

pub mod file_log;
pub mod memory;
pub mod recorder;

pub use file_log::FileEventStore;
pub use memory::MemoryEventStore;
pub use recorder::EventRecorder;

use pagestats_core::{EventFilter, PageLoadEvent, Result};

/// Durable, append-only log of page-load events
///
/// Events are never updated or deleted. Insertion order carries no meaning;
/// only the event timestamp is used when querying.
pub trait EventStore: Send + Sync {
    /// Durably write one event
    fn append(&self, event: PageLoadEvent) -> Result<()>;

    /// Every stored event matching `filter`
    fn query(&self, filter: &EventFilter) -> Result<Vec<PageLoadEvent>>;

    /// Number of stored events
    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
