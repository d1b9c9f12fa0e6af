// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Resolving coordinates to competing municipalities.

use crate::error::AppError;
use crate::models::{Coordinates, Municipality};
use crate::services::discovery::overpass_area_id;
use crate::services::geometry::{GeometryError, GeometryStore};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Properties carried by each municipality feature.
#[derive(Deserialize)]
struct MunicipalityProperties {
    name: String,
    #[serde(default)]
    region: Option<i64>,
    /// OSM object the boundary came from, when `region` is not given
    #[serde(default)]
    osm_type: Option<String>,
    #[serde(default)]
    osm_id: Option<i64>,
}

impl MunicipalityProperties {
    fn region(&self) -> Option<i64> {
        self.region.or_else(|| match (&self.osm_type, self.osm_id) {
            (Some(osm_type), Some(osm_id)) => overpass_area_id(osm_type, osm_id),
            _ => None,
        })
    }
}

/// Immutable set of municipality boundaries, built once at startup.
///
/// Resolution is a linear scan with a bounding-box pre-check. There are
/// tens of municipalities, so no spatial tree is needed.
#[derive(Debug, Clone, Default)]
pub struct MunicipalityResolver {
    municipalities: Vec<Municipality>,
    by_id: HashMap<String, usize>,
}

impl MunicipalityResolver {
    /// Load municipality boundaries from a GeoJSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, GeometryError> {
        Self::from_store(GeometryStore::load_from_file(path)?)
    }

    /// Load municipality boundaries from a GeoJSON string.
    pub fn load_from_json(json_data: &str) -> Result<Self, GeometryError> {
        Self::from_store(GeometryStore::load_from_json(json_data)?)
    }

    fn from_store(store: GeometryStore) -> Result<Self, GeometryError> {
        let mut municipalities = Vec::with_capacity(store.len());

        for feature in store.into_features() {
            let props: MunicipalityProperties = feature.properties()?;

            let boundary = match feature.geometry {
                Some(geometry) if geometry.geometry().is_areal() => geometry,
                Some(geometry) => {
                    return Err(GeometryError::MalformedGeometry {
                        id: feature.id,
                        reason: format!(
                            "boundary must be a Polygon or MultiPolygon, got {}",
                            geometry.geometry().kind()
                        ),
                    })
                }
                None => {
                    return Err(GeometryError::MalformedGeometry {
                        id: feature.id,
                        reason: "municipality has no boundary".to_string(),
                    })
                }
            };

            let centroid = Coordinates::from_point(boundary.centroid()).map_err(|e| {
                GeometryError::MalformedGeometry {
                    id: feature.id.clone(),
                    reason: e.to_string(),
                }
            })?;

            let region = props.region();
            municipalities.push(Municipality {
                id: feature.id,
                name: props.name,
                centroid,
                region,
                boundary,
            });
        }

        Self::new(municipalities)
    }

    /// Build from municipality records. Ids must be unique.
    pub fn new(municipalities: Vec<Municipality>) -> Result<Self, GeometryError> {
        let mut by_id = HashMap::with_capacity(municipalities.len());
        for (i, municipality) in municipalities.iter().enumerate() {
            if by_id.insert(municipality.id.clone(), i).is_some() {
                return Err(GeometryError::DuplicateIdentifier(municipality.id.clone()));
            }
        }

        tracing::info!(count = municipalities.len(), "Loaded municipalities");
        Ok(Self {
            municipalities,
            by_id,
        })
    }

    /// All municipalities, in dataset order.
    pub fn municipalities(&self) -> &[Municipality] {
        &self.municipalities
    }

    pub fn municipality(&self, id: &str) -> Option<&Municipality> {
        self.by_id.get(id).map(|&i| &self.municipalities[i])
    }

    /// Find the municipality containing a point.
    ///
    /// A point exactly on a boundary is contained. Boundaries are not
    /// expected to overlap; if they do, the first in dataset order wins.
    pub fn containing_municipality(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<&Municipality>, AppError> {
        let point = Coordinates::new(latitude, longitude)?.point();

        Ok(self
            .municipalities
            .iter()
            .find(|m| m.boundary.contains_point(&point)))
    }
}
