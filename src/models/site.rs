// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity site ("plateau") model.

use crate::models::geometry::{Coordinates, Geometry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;

/// Season during which a site is open.
///
/// Datasets produced by the original French tooling use `Hiver`,
/// `TroisSaisons` and `QuatreSaisons`; both spellings are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Season {
    #[serde(alias = "Hiver")]
    Winter,
    #[serde(alias = "TroisSaisons")]
    ThreeSeason,
    #[serde(alias = "QuatreSaisons")]
    AllSeason,
}

/// Kind of physical activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ActivityKind {
    #[serde(alias = "Marche")]
    Walk,
    #[serde(alias = "Course")]
    Run,
    #[serde(alias = "Vélo", alias = "Velo")]
    Bike,
}

/// A park or trail where activities can be logged.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivitySite {
    pub id: Uuid,
    /// Display name (e.g., "Parc Sanguinet")
    pub name: String,
    /// Owning municipality id
    pub municipality: String,
    pub seasons: BTreeSet<Season>,
    pub activities: BTreeSet<ActivityKind>,
    /// Point used for distance queries
    pub centroid: Coordinates,
    /// Full outline, when the dataset has one
    #[serde(skip)]
    #[cfg_attr(feature = "binding-generation", ts(skip))]
    pub geometry: Option<Geometry>,
}
