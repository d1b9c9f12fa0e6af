// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity record model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;

use crate::db::Keyed;
use crate::models::site::ActivityKind;

/// A user practicing one or more activities at a site.
///
/// Stored as one record per id. Each record counts once toward its site's
/// municipality, however many activities it lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivityRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Never empty
    pub activities: BTreeSet<ActivityKind>,
    /// Start of the activity
    pub timestamp: DateTime<Utc>,
    /// Only ever goes from false to true
    #[serde(default)]
    pub confirmed: bool,
    pub site_id: Uuid,
}

impl ActivityRecord {
    /// Move the record to the confirmed state.
    ///
    /// Returns `true` if the state changed, `false` if it was already
    /// confirmed. There is no way back to unconfirmed.
    pub fn confirm(&mut self) -> bool {
        if self.confirmed {
            return false;
        }
        self.confirmed = true;
        true
    }
}

impl Keyed for ActivityRecord {
    fn key(&self) -> Uuid {
        self.id
    }
}

/// Incoming activity create/update.
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivityUpsert {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub user_id: Uuid,
    pub activities: BTreeSet<ActivityKind>,
    /// Defaults to submission time for new records
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    /// Can confirm, never unconfirm
    #[serde(default)]
    pub confirmed: Option<bool>,
    pub site_id: Uuid,
}
