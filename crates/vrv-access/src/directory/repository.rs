// VRV Access
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Storage for directory records

use super::models::Record;
use crate::error::{AccessError, AccessResult};
use async_trait::async_trait;
use parking_lot::RwLock;

/// CRUD storage keyed by record id
#[async_trait]
pub trait Repository<T: Record>: Send + Sync {
    /// Get a record by id
    async fn get(&self, id: &str) -> AccessResult<T>;

    /// All records, in insertion order
    async fn list(&self) -> AccessResult<Vec<T>>;

    /// Store a new record under a freshly assigned id
    async fn create(&self, record: T) -> AccessResult<T>;

    /// Merge a patch onto a stored record
    async fn update(&self, id: &str, patch: T::Patch) -> AccessResult<T>;

    /// Remove a record
    async fn delete(&self, id: &str) -> AccessResult<()>;
}

/// In-process repository
#[derive(Debug)]
pub struct InMemoryRepository<T> {
    records: RwLock<Vec<T>>,
}

impl<T: Record> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    /// Create a repository holding `records` as given
    pub fn with_records(records: Vec<T>) -> Self {
        Self { records: RwLock::new(records) }
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Next id: prefix plus one more than the highest numeric suffix in use
    fn next_id(records: &[T]) -> String {
        let highest = records.iter().filter_map(|record| record.id().strip_prefix(T::ID_PREFIX)?.parse::<u64>().ok()).max().unwrap_or(0);
        format!("{}{:03}", T::ID_PREFIX, highest + 1)
    }

    fn not_found(id: &str) -> AccessError {
        AccessError::NotFound {
            message: format!("No record with id {}", id),
        }
    }
}

impl<T: Record> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Record> Repository<T> for InMemoryRepository<T> {
    async fn get(&self, id: &str) -> AccessResult<T> {
        self.records.read().iter().find(|record| record.id() == id).cloned().ok_or_else(|| Self::not_found(id))
    }

    async fn list(&self) -> AccessResult<Vec<T>> {
        Ok(self.records.read().clone())
    }

    async fn create(&self, mut record: T) -> AccessResult<T> {
        let mut records = self.records.write();
        record.set_id(Self::next_id(&records));
        records.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &str, patch: T::Patch) -> AccessResult<T> {
        let mut records = self.records.write();
        let record = records.iter_mut().find(|record| record.id() == id).ok_or_else(|| Self::not_found(id))?;
        record.apply(patch);
        Ok(record.clone())
    }

    async fn delete(&self, id: &str) -> AccessResult<()> {
        let mut records = self.records.write();
        let index = records.iter().position(|record| record.id() == id).ok_or_else(|| Self::not_found(id))?;
        records.remove(index);
        Ok(())
    }
}
