// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity ledger and leaderboard scoring.
//!
//! Handles the core workflow:
//! 1. Upsert users and activity records, one atomic write per record
//! 2. Reject activities at unknown sites
//! 3. Recompute per-municipality scores from every stored record

use crate::db::RecordStore;
use crate::error::{AppError, Result};
use crate::models::{ActivityRecord, ActivityUpsert, Score, User, UserUpsert};
use crate::services::{MunicipalityResolver, SiteIndex};
use chrono::Utc;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

/// Per-record locks serializing read-modify-write on the same id.
pub type RecordLocks = Arc<DashMap<Uuid, Arc<Mutex<()>>>>;

/// Stores users and activities, and derives the leaderboard.
///
/// Cheap to clone; all clones share the same stores and locks.
#[derive(Clone)]
pub struct ActivityLedger {
    municipalities: Arc<MunicipalityResolver>,
    sites: Arc<SiteIndex>,
    users: Arc<dyn RecordStore<User>>,
    activities: Arc<dyn RecordStore<ActivityRecord>>,
    locks: RecordLocks,
}

impl ActivityLedger {
    pub fn new(
        municipalities: Arc<MunicipalityResolver>,
        sites: Arc<SiteIndex>,
        users: Arc<dyn RecordStore<User>>,
        activities: Arc<dyn RecordStore<ActivityRecord>>,
    ) -> Self {
        Self {
            municipalities,
            sites,
            users,
            activities,
            locks: Arc::new(DashMap::new()),
        }
    }

    /// Run `f` while holding the lock for one record id.
    ///
    /// Writes to different ids never wait on each other. The lock entry is
    /// dropped once no other writer holds or waits on it.
    fn with_record_lock<T>(&self, id: Uuid, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let lock = self
            .locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let result = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };
        drop(lock);

        // Only the map's own reference left
        self.locks
            .remove_if(&id, |_, lock| Arc::strong_count(lock) == 1);
        result
    }

    // ─── Users ───────────────────────────────────────────────────

    /// Create or update a user.
    ///
    /// `created_at` is set on first insert and kept afterwards;
    /// `last_active` is refreshed on every call.
    pub fn upsert_user(&self, upsert: UserUpsert) -> Result<User> {
        let short_name = upsert.short_name.trim();
        if short_name.is_empty() {
            return Err(AppError::BadRequest("short_name must not be empty".to_string()));
        }

        let id = upsert.id.unwrap_or_else(Uuid::new_v4);
        let user = self.with_record_lock(id, || {
            let now = Utc::now();
            let existing = self.users.get(id)?;
            let user = User {
                id,
                short_name: short_name.to_string(),
                full_name: upsert.full_name,
                activities: upsert.activities,
                created_at: existing.map(|u| u.created_at).unwrap_or(now),
                last_active: now,
            };
            self.users.put(&user)?;
            Ok(user)
        })?;

        tracing::info!(user_id = %user.id, "User upserted");
        Ok(user)
    }

    /// Get a user by id.
    pub fn user(&self, id: Uuid) -> Result<Option<User>> {
        self.users.get(id)
    }

    // ─── Activities ──────────────────────────────────────────────

    /// Create or update an activity record.
    ///
    /// The site must exist. A new record gets an id and the current time if
    /// none were given; an update without a timestamp keeps the stored one.
    /// A confirmed record stays confirmed.
    pub fn upsert_activity(&self, upsert: ActivityUpsert) -> Result<ActivityRecord> {
        if upsert.activities.is_empty() {
            return Err(AppError::BadRequest(
                "activities must list at least one activity".to_string(),
            ));
        }
        if self.sites.site_by_id(upsert.site_id).is_none() {
            tracing::warn!(site_id = %upsert.site_id, "Rejected activity at unknown site");
            return Err(AppError::UnknownSite(upsert.site_id));
        }

        let id = upsert.id.unwrap_or_else(Uuid::new_v4);
        let record = self.with_record_lock(id, || {
            let existing = self.activities.get(id)?;
            let timestamp = upsert
                .timestamp
                .or_else(|| existing.as_ref().map(|r| r.timestamp))
                .unwrap_or_else(Utc::now);
            let confirmed = upsert.confirmed.unwrap_or(false)
                || existing.as_ref().is_some_and(|r| r.confirmed);

            let record = ActivityRecord {
                id,
                user_id: upsert.user_id,
                activities: upsert.activities,
                timestamp,
                confirmed,
                site_id: upsert.site_id,
            };
            self.activities.put(&record)?;
            Ok(record)
        })?;

        tracing::info!(
            activity_id = %record.id,
            user_id = %record.user_id,
            site_id = %record.site_id,
            "Activity upserted"
        );
        Ok(record)
    }

    /// Confirm an activity. Returns `None` if no such record exists.
    pub fn confirm_activity(&self, id: Uuid) -> Result<Option<ActivityRecord>> {
        self.with_record_lock(id, || {
            let Some(mut record) = self.activities.get(id)? else {
                return Ok(None);
            };
            if record.confirm() {
                self.activities.put(&record)?;
                tracing::info!(activity_id = %id, "Activity confirmed");
            }
            Ok(Some(record))
        })
    }

    /// All activities of one user, newest first.
    pub fn activities_by_user(&self, user_id: Uuid) -> Result<Vec<ActivityRecord>> {
        let mut records: Vec<ActivityRecord> = self
            .activities
            .list()?
            .into_iter()
            .filter(|r| r.user_id == user_id)
            .collect();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| a.id.cmp(&b.id)));
        Ok(records)
    }

    // ─── Scoring ─────────────────────────────────────────────────

    /// Count activity records per municipality.
    ///
    /// Recomputed from a snapshot of every record on each call. Every known
    /// municipality is present, at 0 if nothing was logged there. Each record
    /// counts once however many activities it lists. Records whose site is
    /// no longer in the index are skipped.
    pub fn compute_scores(&self) -> Result<BTreeMap<String, u32>> {
        let mut scores: BTreeMap<String, u32> = self
            .municipalities
            .municipalities()
            .iter()
            .map(|m| (m.id.clone(), 0))
            .collect();

        for record in self.activities.list()? {
            let Some(site) = self.sites.site_by_id(record.site_id) else {
                tracing::warn!(
                    activity_id = %record.id,
                    site_id = %record.site_id,
                    "Skipping activity with dangling site reference"
                );
                continue;
            };

            match scores.get_mut(&site.municipality) {
                Some(score) => *score += 1,
                None => tracing::warn!(
                    activity_id = %record.id,
                    municipality = %site.municipality,
                    "Skipping activity in unknown municipality"
                ),
            }
        }

        Ok(scores)
    }

    /// Scores sorted best first, ties by municipality id.
    pub fn leaderboard(&self) -> Result<Vec<Score>> {
        let mut board: Vec<Score> = self
            .compute_scores()?
            .into_iter()
            .map(|(municipality, score)| Score {
                municipality,
                score,
            })
            .collect();
        board.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.municipality.cmp(&b.municipality))
        });
        Ok(board)
    }
}
