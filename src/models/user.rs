//! User model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;

use crate::db::Keyed;
use crate::models::site::ActivityKind;

/// User profile stored as one record per id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct User {
    pub id: Uuid,
    /// Handle shown on the leaderboard (not enforced unique)
    pub short_name: String,
    pub full_name: Option<String>,
    /// Preferred activities
    #[serde(default)]
    pub activities: BTreeSet<ActivityKind>,
    /// When the user was first stored
    pub created_at: DateTime<Utc>,
    /// Refreshed on every upsert
    pub last_active: DateTime<Utc>,
}

impl Keyed for User {
    fn key(&self) -> Uuid {
        self.id
    }
}

/// Incoming user create/update.
///
/// Timestamps are owned by the ledger and cannot be supplied.
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserUpsert {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub short_name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub activities: BTreeSet<ActivityKind>,
}
