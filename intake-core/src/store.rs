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

//! Append-only in-memory record store
//!
//! Records live for the lifetime of the process and are addressed purely by
//! insertion position. There is no update, delete, eviction or persistence.
//!
//! All appends take the write lock, so index assignment and the push happen
//! as one step: concurrent writers never share an index and readers never see
//! a half-inserted element.

use crate::error::{Result, StoreError};
use crate::record::{Record, StoredRecord};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

/// Thread-safe, cheaply cloneable record store
#[derive(Clone, Default)]
pub struct RecordStore {
    records: Arc<RwLock<Vec<Record>>>,
}

impl RecordStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record to the end of the store
    ///
    /// The returned index is the store length observed under the write lock,
    /// i.e. the position the record now occupies.
    pub fn append(&self, value: Record) -> StoredRecord {
        let mut records = self.records.write();
        let index = records.len();
        records.push(value.clone());
        drop(records);

        debug!("Appended record at index {}", index);
        StoredRecord { index, value }
    }

    /// Snapshot of every record in insertion order
    pub fn list_all(&self) -> Vec<Record> {
        self.records.read().clone()
    }

    /// Fetch the record at a zero-based position
    ///
    /// Negative indices and indices past the end are both `IndexOutOfRange`.
    pub fn get(&self, index: i64) -> Result<Record> {
        let records = self.records.read();
        usize::try_from(index)
            .ok()
            .and_then(|i| records.get(i))
            .cloned()
            .ok_or(StoreError::IndexOutOfRange {
                index,
                len: records.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("len", &self.len())
            .finish()
    }
}
