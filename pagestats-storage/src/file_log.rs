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

//! Durable page-load log
//!
//! Layout of `page_loads.log`:
//!
//! ```text
//! +-------+-------------+
//! | PGLD  | version u32 |                       header (8 bytes)
//! +-------+-------------+---------------+
//! | len u32 | JSON payload | crc32 u32  |       one record per event
//! +---------+--------------+------------+
//! ```
//!
//! Integers are little-endian. The log is replayed into memory on open and
//! queries are answered from that copy. A record whose checksum does not
//! match is skipped; a partially written trailing record ends the replay and
//! is cut off so later appends start on a record boundary. Appends never
//! leave a partial record behind: payloads over `MAX_RECORD_LEN` are refused
//! before writing, and a failed write is rolled back to the previous length.

use crate::EventStore;
use pagestats_core::{EventFilter, PageLoadEvent, PagestatsError, Result};
use parking_lot::{Mutex, RwLock};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};

const LOG_FILE_NAME: &str = "page_loads.log";
const PAGE_LOG_MAGIC: &[u8; 4] = b"PGLD";
const PAGE_LOG_VERSION: u32 = 1;
const HEADER_LEN: u64 = 8;
/// Length prefix + checksum
const RECORD_OVERHEAD: u64 = 8;
/// Larger length prefixes are treated as a torn write, so appends refuse them
const MAX_RECORD_LEN: usize = 1024 * 1024;

/// Event store persisted to an append-only, checksummed log file
pub struct FileEventStore {
    log_path: PathBuf,
    events: RwLock<Vec<PageLoadEvent>>,
    writer: Mutex<File>,
}

struct Replay {
    events: Vec<PageLoadEvent>,
    valid_len: u64,
    skipped: usize,
}

impl FileEventStore {
    /// Open or create the log inside `data_dir`
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        std::fs::create_dir_all(data_dir)?;
        let log_path = data_dir.join(LOG_FILE_NAME);

        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&log_path)?;
        let file_len = file.metadata()?.len();

        let events = if file_len < HEADER_LEN {
            // Too short to hold a record, so rewriting the header loses nothing
            if file_len > 0 {
                tracing::warn!(
                    path = %log_path.display(),
                    bytes = file_len,
                    "Rewriting torn page-load log header"
                );
                file.set_len(0)?;
            }
            file.write_all(PAGE_LOG_MAGIC)?;
            file.write_all(&PAGE_LOG_VERSION.to_le_bytes())?;
            file.sync_data()?;
            Vec::new()
        } else {
            let replay = replay_log(BufReader::new(&file))?;
            if replay.skipped > 0 {
                tracing::warn!(
                    path = %log_path.display(),
                    skipped = replay.skipped,
                    "Skipped corrupt records in page-load log"
                );
            }
            if replay.valid_len < file_len {
                tracing::warn!(
                    path = %log_path.display(),
                    bytes = file_len - replay.valid_len,
                    "Truncating partial trailing record in page-load log"
                );
                file.set_len(replay.valid_len)?;
            }
            replay.events
        };

        tracing::info!(
            path = %log_path.display(),
            events = events.len(),
            "Opened page-load log"
        );

        Ok(Self {
            log_path,
            events: RwLock::new(events),
            writer: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }
}

fn encode_record(payload: &[u8]) -> Vec<u8> {
    let mut record = Vec::with_capacity(payload.len() + RECORD_OVERHEAD as usize);
    record.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    record.extend_from_slice(payload);
    record.extend_from_slice(&crc32fast::hash(payload).to_le_bytes());
    record
}

/// Run `write` against the log, cutting the file back to its previous length
/// if it fails so no partial record survives
fn rollback_on_error<F>(file: &mut File, write: F) -> Result<()>
where
    F: FnOnce(&mut File) -> std::io::Result<()>,
{
    let start_len = file.metadata()?.len();
    if let Err(e) = write(file) {
        if let Err(truncate_err) = file.set_len(start_len) {
            tracing::error!(
                error = %truncate_err,
                len = start_len,
                "Failed to roll back partial page-load record"
            );
        }
        return Err(e.into());
    }
    Ok(())
}

fn replay_log<R: Read>(mut reader: R) -> Result<Replay> {
    let mut magic = [0u8; 4];
    reader
        .read_exact(&mut magic)
        .map_err(|_| PagestatsError::Storage("page-load log header is truncated".to_string()))?;
    if &magic != PAGE_LOG_MAGIC {
        return Err(PagestatsError::Storage(format!(
            "not a page-load log (magic {:?})",
            magic
        )));
    }

    let mut version_bytes = [0u8; 4];
    reader
        .read_exact(&mut version_bytes)
        .map_err(|_| PagestatsError::Storage("page-load log header is truncated".to_string()))?;
    let version = u32::from_le_bytes(version_bytes);
    if version != PAGE_LOG_VERSION {
        return Err(PagestatsError::Storage(format!(
            "unsupported page-load log version {} (expected {})",
            version, PAGE_LOG_VERSION
        )));
    }

    let mut replay = Replay {
        events: Vec::new(),
        valid_len: HEADER_LEN,
        skipped: 0,
    };

    loop {
        let mut len_bytes = [0u8; 4];
        if reader.read_exact(&mut len_bytes).is_err() {
            break;
        }
        let len = u32::from_le_bytes(len_bytes) as usize;
        if len > MAX_RECORD_LEN {
            break;
        }

        let mut data = vec![0u8; len];
        if reader.read_exact(&mut data).is_err() {
            break;
        }

        let mut crc_bytes = [0u8; 4];
        if reader.read_exact(&mut crc_bytes).is_err() {
            break;
        }
        replay.valid_len += RECORD_OVERHEAD + len as u64;

        if u32::from_le_bytes(crc_bytes) != crc32fast::hash(&data) {
            tracing::warn!("CRC mismatch in page-load log, skipping record");
            replay.skipped += 1;
            continue;
        }

        match serde_json::from_slice::<PageLoadEvent>(&data) {
            Ok(event) => replay.events.push(event),
            Err(e) => {
                tracing::warn!(error = %e, "Undecodable record in page-load log, skipping");
                replay.skipped += 1;
            }
        }
    }

    Ok(replay)
}

impl EventStore for FileEventStore {
    fn append(&self, event: PageLoadEvent) -> Result<()> {
        let payload = serde_json::to_vec(&event)?;
        if payload.len() > MAX_RECORD_LEN {
            return Err(PagestatsError::Storage(format!(
                "page-load record of {} bytes exceeds the {} byte limit",
                payload.len(),
                MAX_RECORD_LEN
            )));
        }
        let record = encode_record(&payload);

        let mut file = self.writer.lock();
        rollback_on_error(&mut file, |file| {
            file.write_all(&record)?;
            file.sync_data()
        })?;
        // Still under the writer lock so memory order follows file order
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
