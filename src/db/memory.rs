// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory record store, used by tests and ephemeral deployments.

use crate::db::{Keyed, RecordStore};
use crate::error::AppError;
use dashmap::DashMap;
use uuid::Uuid;

/// Record store backed by a sharded concurrent map.
pub struct MemoryStore<T> {
    records: DashMap<Uuid, T>,
}

impl<T> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RecordStore<T> for MemoryStore<T>
where
    T: Keyed + Clone + Send + Sync,
{
    fn get(&self, id: Uuid) -> Result<Option<T>, AppError> {
        Ok(self.records.get(&id).map(|r| r.value().clone()))
    }

    fn put(&self, record: &T) -> Result<(), AppError> {
        self.records.insert(record.key(), record.clone());
        Ok(())
    }

    fn list(&self) -> Result<Vec<T>, AppError> {
        Ok(self.records.iter().map(|r| r.value().clone()).collect())
    }
}
