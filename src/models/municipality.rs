// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Competing municipality model.

use crate::models::geometry::{Coordinates, PreparedGeometry};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A municipality taking part in the competition.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Municipality {
    /// Stable identifier (e.g., "ville-de-repentigny")
    pub id: String,
    /// Display name (e.g., "Repentigny")
    pub name: String,
    pub centroid: Coordinates,
    /// External region reference (Overpass area id)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub region: Option<i64>,
    /// Boundary, always a Polygon or MultiPolygon
    #[serde(skip)]
    #[cfg_attr(feature = "binding-generation", ts(skip))]
    pub boundary: PreparedGeometry,
}
