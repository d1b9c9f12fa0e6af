// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Loading named features from GeoJSON into prepared geometries.

use crate::models::geometry::{Geometry, PreparedGeometry};
use geojson::{feature::Id, FeatureCollection, GeoJson, JsonObject, PolygonType, Position};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// One named feature of a loaded collection.
#[derive(Debug, Clone)]
pub struct GeometryFeature {
    pub id: String,
    /// `None` when the feature has a null geometry
    pub geometry: Option<PreparedGeometry>,
    pub properties: JsonObject,
}

impl GeometryFeature {
    /// Deserialize the feature properties into a typed struct.
    pub fn properties<T: DeserializeOwned>(&self) -> Result<T, GeometryError> {
        serde_json::from_value(serde_json::Value::Object(self.properties.clone())).map_err(|e| {
            GeometryError::InvalidProperties {
                id: self.id.clone(),
                reason: e.to_string(),
            }
        })
    }
}

/// Named, validated geometries in dataset order.
#[derive(Debug, Clone, Default)]
pub struct GeometryStore {
    features: Vec<GeometryFeature>,
}

impl GeometryStore {
    /// Load a feature collection from a GeoJSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, GeometryError> {
        let json_data = fs::read_to_string(path.as_ref()).map_err(|e| {
            GeometryError::Io(format!("{}: {}", path.as_ref().display(), e))
        })?;
        Self::load_from_json(&json_data)
    }

    /// Load a feature collection from a GeoJSON string.
    pub fn load_from_json(json_data: &str) -> Result<Self, GeometryError> {
        let geojson: GeoJson = json_data
            .parse()
            .map_err(|e: geojson::Error| GeometryError::Parse(e.to_string()))?;

        match geojson {
            GeoJson::FeatureCollection(collection) => Self::load(collection),
            GeoJson::Feature(_) => Err(GeometryError::Parse(
                "expected a FeatureCollection, got a Feature".to_string(),
            )),
            GeoJson::Geometry(_) => Err(GeometryError::Parse(
                "expected a FeatureCollection, got a Geometry".to_string(),
            )),
        }
    }

    /// Validate and prepare every feature of a collection.
    ///
    /// Fails on the first malformed geometry or repeated id; nothing is
    /// returned for a partially valid collection.
    pub fn load(collection: FeatureCollection) -> Result<Self, GeometryError> {
        let mut features = Vec::with_capacity(collection.features.len());
        let mut seen = HashSet::with_capacity(collection.features.len());

        for (index, feature) in collection.features.into_iter().enumerate() {
            let properties = feature.properties.unwrap_or_default();
            let id = feature_id(feature.id.as_ref(), &properties).ok_or_else(|| {
                GeometryError::MalformedGeometry {
                    id: format!("#{}", index),
                    reason: "feature has no id".to_string(),
                }
            })?;

            if !seen.insert(id.clone()) {
                return Err(GeometryError::DuplicateIdentifier(id));
            }

            let geometry = match feature.geometry {
                Some(geom) => Some(prepare(&id, geom.value)?),
                None => None,
            };

            features.push(GeometryFeature {
                id,
                geometry,
                properties,
            });
        }

        tracing::debug!(count = features.len(), "Loaded geometry features");
        Ok(Self { features })
    }

    pub fn features(&self) -> &[GeometryFeature] {
        &self.features
    }

    pub fn into_features(self) -> Vec<GeometryFeature> {
        self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Feature id, falling back to an `id` property.
fn feature_id(id: Option<&Id>, properties: &JsonObject) -> Option<String> {
    match id {
        Some(Id::String(s)) => Some(s.clone()),
        Some(Id::Number(n)) => Some(n.to_string()),
        None => match properties.get("id")? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        },
    }
}

fn malformed(id: &str, reason: impl Into<String>) -> GeometryError {
    GeometryError::MalformedGeometry {
        id: id.to_string(),
        reason: reason.into(),
    }
}

/// Validate a GeoJSON geometry and convert it to a prepared geometry.
pub(crate) fn prepare(id: &str, value: geojson::Value) -> Result<PreparedGeometry, GeometryError> {
    match &value {
        geojson::Value::Point(position) => validate_position(id, position)?,
        geojson::Value::Polygon(rings) => validate_polygon(id, rings)?,
        geojson::Value::MultiPolygon(polygons) => {
            if polygons.is_empty() {
                return Err(malformed(id, "MultiPolygon has no polygons"));
            }
            for rings in polygons {
                validate_polygon(id, rings)?;
            }
        }
        other => {
            return Err(malformed(
                id,
                format!(
                    "unsupported geometry type {} (expected Point, Polygon or MultiPolygon)",
                    value_type(other)
                ),
            ))
        }
    }

    let converted = geo::Geometry::<f64>::try_from(value)
        .map_err(|e: geojson::Error| malformed(id, e.to_string()))?;
    let geometry = match converted {
        geo::Geometry::Point(p) => Geometry::Point(p),
        geo::Geometry::Polygon(p) => Geometry::Polygon(p),
        geo::Geometry::MultiPolygon(mp) => Geometry::MultiPolygon(mp),
        _ => return Err(malformed(id, "unexpected geometry after conversion")),
    };

    PreparedGeometry::new(geometry).ok_or_else(|| malformed(id, "empty geometry"))
}

pub(crate) fn value_type(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn validate_position(id: &str, position: &Position) -> Result<(), GeometryError> {
    if position.len() < 2 {
        return Err(malformed(id, "position has fewer than 2 values"));
    }
    let (lon, lat) = (position[0], position[1]);
    if !lon.is_finite() || !lat.is_finite() {
        return Err(malformed(id, "position is not finite"));
    }
    if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
        return Err(malformed(
            id,
            format!("position ({}, {}) is outside WGS84 bounds", lon, lat),
        ));
    }
    Ok(())
}

fn validate_polygon(id: &str, rings: &PolygonType) -> Result<(), GeometryError> {
    if rings.is_empty() {
        return Err(malformed(id, "polygon has no rings"));
    }
    for ring in rings {
        validate_ring(id, ring)?;
    }
    Ok(())
}

/// A ring must be closed and have at least 3 distinct points.
fn validate_ring(id: &str, ring: &[Position]) -> Result<(), GeometryError> {
    for position in ring {
        validate_position(id, position)?;
    }

    let (first, last) = match (ring.first(), ring.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(malformed(id, "empty ring")),
    };
    if first[..2] != last[..2] {
        return Err(malformed(id, "ring is not closed"));
    }

    let distinct: HashSet<(u64, u64)> = ring
        .iter()
        .map(|p| (p[0].to_bits(), p[1].to_bits()))
        .collect();
    if ring.len() < 4 || distinct.len() < 3 {
        return Err(malformed(
            id,
            format!("degenerate ring ({} distinct points)", distinct.len()),
        ));
    }
    Ok(())
}

/// Errors from loading geometry datasets. All of them are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    #[error("Failed to read file: {0}")]
    Io(String),

    #[error("Failed to parse GeoJSON: {0}")]
    Parse(String),

    #[error("Malformed geometry in feature {id}: {reason}")]
    MalformedGeometry { id: String, reason: String },

    #[error("Duplicate identifier: {0}")]
    DuplicateIdentifier(String),

    #[error("Invalid properties in feature {id}: {reason}")]
    InvalidProperties { id: String, reason: String },

    #[error("Site {site} references unknown municipality {municipality}")]
    UnknownMunicipality { site: String, municipality: String },
}
