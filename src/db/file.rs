// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! One-JSON-file-per-record store.
//!
//! Records live at `<dir>/<id>.json`. Writes go to a temporary file in the
//! same directory and are renamed into place, so readers see either the old
//! or the new record and never a partial one.

use crate::db::{Keyed, RecordStore};
use crate::error::AppError;
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const EXTENSION: &str = "json";

/// File-backed record store for one collection.
pub struct FileStore<T> {
    dir: PathBuf,
    _record: PhantomData<fn() -> T>,
}

impl<T> FileStore<T> {
    /// Open (and create if needed) a collection directory.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, AppError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| {
            AppError::Database(format!("Failed to create {}: {}", dir.display(), e))
        })?;
        tracing::info!(path = %dir.display(), "Opened record store");
        Ok(Self {
            dir,
            _record: PhantomData,
        })
    }

    fn record_path(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{}.{}", id, EXTENSION))
    }
}

impl<T> RecordStore<T> for FileStore<T>
where
    T: Keyed + Serialize + DeserializeOwned,
{
    fn get(&self, id: Uuid) -> Result<Option<T>, AppError> {
        let path = self.record_path(id);
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AppError::Database(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        serde_json::from_str(&data)
            .map(Some)
            .map_err(|e| AppError::Database(format!("Corrupt record {}: {}", path.display(), e)))
    }

    fn put(&self, record: &T) -> Result<(), AppError> {
        let id = record.key();
        let data = serde_json::to_vec_pretty(record)
            .map_err(|e| AppError::Database(format!("Failed to serialize {}: {}", id, e)))?;

        // Unique temp name so concurrent writers never share a file
        let tmp = self.dir.join(format!(".{}.{}.tmp", id, Uuid::new_v4()));
        fs::write(&tmp, &data)
            .map_err(|e| AppError::Database(format!("Failed to write {}: {}", tmp.display(), e)))?;

        if let Err(e) = fs::rename(&tmp, self.record_path(id)) {
            let _ = fs::remove_file(&tmp);
            return Err(AppError::Database(format!(
                "Failed to commit record {}: {}",
                id, e
            )));
        }

        tracing::debug!(record_id = %id, "Record written");
        Ok(())
    }

    fn list(&self) -> Result<Vec<T>, AppError> {
        let entries = fs::read_dir(&self.dir).map_err(|e| {
            AppError::Database(format!("Failed to list {}: {}", self.dir.display(), e))
        })?;

        let mut records = Vec::new();
        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable directory entry");
                    continue;
                }
            };

            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }

            // A record removed between read_dir and read is simply skipped
            let parsed = fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|data| serde_json::from_str::<T>(&data).map_err(|e| e.to_string()));

            match parsed {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable record")
                }
            }
        }

        Ok(records)
    }
}
