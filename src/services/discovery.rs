// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Deriving activity sites from open-data parks and trails.
//!
//! Downloading the parks and trails is left to the data pipeline; this
//! module takes the two collections it produces and picks the parks that
//! contain at least one trail.

use crate::models::{ActivityKind, ActivitySite, Coordinates, Season};
use crate::services::geometry::{prepare, value_type, GeometryError};
use geo::{BoundingRect, Rect, Relate};
use geojson::{feature::Id, Feature, FeatureCollection, JsonObject};
use serde_json::Value;
use std::collections::BTreeSet;
use uuid::Uuid;

/// Name given to parks without a name property.
const UNNAMED_PARK: &str = "INCONNU";

/// Offset between an OSM relation id and its Overpass area id.
const OVERPASS_RELATION_OFFSET: i64 = 3_600_000_000;
/// Offset between an OSM way id and its Overpass area id.
const OVERPASS_WAY_OFFSET: i64 = 2_400_000_000;

/// Overpass area id for an OSM object, used as a municipality `region`.
pub fn overpass_area_id(osm_type: &str, osm_id: i64) -> Option<i64> {
    match osm_type {
        "relation" => Some(osm_id + OVERPASS_RELATION_OFFSET),
        "way" => Some(osm_id + OVERPASS_WAY_OFFSET),
        other => {
            tracing::warn!(osm_type = other, osm_id, "No Overpass area for OSM type");
            None
        }
    }
}

struct Trail {
    geometry: geo::Geometry<f64>,
    bounds: Rect<f64>,
}

fn rects_overlap(a: &Rect<f64>, b: &Rect<f64>) -> bool {
    a.min().x <= b.max().x
        && b.min().x <= a.max().x
        && a.min().y <= b.max().y
        && b.min().y <= a.max().y
}

fn string_property<'a>(properties: &'a JsonObject, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| properties.get(*key).and_then(Value::as_str))
}

fn number_property(properties: &JsonObject, key: &str) -> Option<f64> {
    properties.get(key).and_then(Value::as_f64)
}

fn load_trails(trails: &FeatureCollection) -> Vec<Trail> {
    trails
        .features
        .iter()
        .filter_map(|feature| {
            let value = feature.geometry.as_ref()?.value.clone();
            let kind = value_type(&value);
            let geometry = match geo::Geometry::<f64>::try_from(value) {
                Ok(g @ (geo::Geometry::LineString(_) | geo::Geometry::MultiLineString(_))) => g,
                Ok(_) => {
                    tracing::debug!(kind, "Ignoring non-linear trail feature");
                    return None;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable trail feature");
                    return None;
                }
            };
            let bounds = geometry.bounding_rect()?;
            Some(Trail { geometry, bounds })
        })
        .collect()
}

/// Turn the parks of one municipality into activity sites.
///
/// A park qualifies when its outline contains at least one trail. The site
/// id is a UUIDv5 of the municipality, name and centroid, so rerunning on
/// the same data gives the same ids. Parks with unusable geometry are
/// skipped with a warning.
pub fn derive_sites(
    municipality: &str,
    parks: &FeatureCollection,
    trails: &FeatureCollection,
) -> Vec<ActivitySite> {
    let trails = load_trails(trails);
    tracing::info!(municipality, trails = trails.len(), "Trails loaded");

    let mut sites = Vec::new();
    for (index, park) in parks.features.iter().enumerate() {
        let properties = park.properties.clone().unwrap_or_default();
        let name = string_property(&properties, &["NOM", "name"]).unwrap_or(UNNAMED_PARK);
        let label = format!("{}#{}", name, index);

        let Some(value) = park.geometry.as_ref().map(|g| g.value.clone()) else {
            tracing::debug!(park = %label, "Park has no geometry");
            continue;
        };
        let outline = match prepare(&label, value) {
            Ok(outline) if outline.geometry().is_areal() => outline,
            Ok(_) => {
                tracing::debug!(park = %label, "Park geometry is not an area");
                continue;
            }
            Err(e) => {
                tracing::warn!(park = %label, error = %e, "Skipping park with bad geometry");
                continue;
            }
        };

        let park_geometry = outline.geometry().to_geo();
        let has_trail = trails.iter().any(|trail| {
            rects_overlap(&outline.bounds(), &trail.bounds)
                && park_geometry.relate(&trail.geometry).is_contains()
        });
        if !has_trail {
            continue;
        }

        // Open-data parks often carry their own reference point
        let centroid = match (
            number_property(&properties, "LONGITUDE"),
            number_property(&properties, "LATITUDE"),
        ) {
            (Some(lon), Some(lat)) => Coordinates::new(lat, lon),
            _ => Coordinates::from_point(outline.centroid()),
        };
        let centroid = match centroid {
            Ok(centroid) => centroid,
            Err(e) => {
                tracing::warn!(park = %label, error = %e, "Skipping park without usable centroid");
                continue;
            }
        };

        let key = format!(
            "{}/{}/{:.6},{:.6}",
            municipality, name, centroid.longitude, centroid.latitude
        );
        sites.push(ActivitySite {
            id: Uuid::new_v5(&Uuid::NAMESPACE_URL, key.as_bytes()),
            name: name.to_string(),
            municipality: municipality.to_string(),
            seasons: BTreeSet::from([Season::AllSeason]),
            activities: BTreeSet::from([ActivityKind::Walk, ActivityKind::Bike]),
            centroid,
            geometry: Some(outline.into_geometry()),
        });
    }

    tracing::info!(
        municipality,
        parks = parks.features.len(),
        sites = sites.len(),
        "Parks with trails"
    );
    sites
}

/// Serialize sites in the dataset format read by
/// [`SiteIndex::load_from_json`](crate::services::SiteIndex::load_from_json).
pub fn sites_to_geojson(sites: &[ActivitySite]) -> Result<FeatureCollection, GeometryError> {
    let features = sites
        .iter()
        .map(|site| {
            let mut properties = JsonObject::new();
            properties.insert("name".to_string(), Value::from(site.name.clone()));
            properties.insert(
                "municipality".to_string(),
                Value::from(site.municipality.clone()),
            );
            properties.insert("seasons".to_string(), to_json(&site.id, &site.seasons)?);
            properties.insert(
                "activities".to_string(),
                to_json(&site.id, &site.activities)?,
            );
            properties.insert("longitude".to_string(), Value::from(site.centroid.longitude));
            properties.insert("latitude".to_string(), Value::from(site.centroid.latitude));

            Ok(Feature {
                bbox: None,
                geometry: site.geometry.as_ref().map(|g| g.to_geojson()),
                id: Some(Id::String(site.id.to_string())),
                properties: Some(properties),
                foreign_members: None,
            })
        })
        .collect::<Result<Vec<_>, GeometryError>>()?;

    Ok(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

fn to_json<T: serde::Serialize>(id: &Uuid, value: &T) -> Result<Value, GeometryError> {
    serde_json::to_value(value).map_err(|e| GeometryError::InvalidProperties {
        id: id.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn collection(value: serde_json::Value) -> FeatureCollection {
        serde_json::from_value(value).unwrap()
    }

    fn parks() -> FeatureCollection {
        collection(json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": { "NOM": "Parc du Ruisseau" },
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[0.0, 0.0], [0.01, 0.0], [0.01, 0.01], [0.0, 0.01], [0.0, 0.0]]]
                    }
                },
                {
                    "type": "Feature",
                    "properties": { "NOM": "Parc Sec", "LONGITUDE": 0.025, "LATITUDE": 0.005 },
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[0.02, 0.0], [0.03, 0.0], [0.03, 0.01], [0.02, 0.01], [0.02, 0.0]]]
                    }
                },
                {
                    "type": "Feature",
                    "properties": { "LONGITUDE": 0.045, "LATITUDE": 0.004 },
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[0.04, 0.0], [0.05, 0.0], [0.05, 0.01], [0.04, 0.01], [0.04, 0.0]]]
                    }
                },
                {
                    "type": "Feature",
                    "properties": { "NOM": "Sans contour" },
                    "geometry": null
                }
            ]
        }))
    }

    fn trails() -> FeatureCollection {
        collection(json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {},
                    "geometry": {
                        "type": "LineString",
                        "coordinates": [[0.002, 0.002], [0.008, 0.008]]
                    }
                },
                {
                    // Crosses out of the second park, so it is not contained
                    "type": "Feature",
                    "properties": {},
                    "geometry": {
                        "type": "LineString",
                        "coordinates": [[0.025, 0.005], [0.035, 0.005]]
                    }
                },
                {
                    "type": "Feature",
                    "properties": {},
                    "geometry": {
                        "type": "MultiLineString",
                        "coordinates": [[[0.041, 0.001], [0.049, 0.009]]]
                    }
                },
                {
                    "type": "Feature",
                    "properties": {},
                    "geometry": { "type": "Point", "coordinates": [0.025, 0.005] }
                }
            ]
        }))
    }

    #[test]
    fn test_parks_with_contained_trails() {
        let sites = derive_sites("ville-test", &parks(), &trails());
        let names: Vec<&str> = sites.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Parc du Ruisseau", UNNAMED_PARK]);

        let first = &sites[0];
        assert_eq!(first.municipality, "ville-test");
        assert!((first.centroid.longitude - 0.005).abs() < 1e-9);
        assert!((first.centroid.latitude - 0.005).abs() < 1e-9);
        assert_eq!(first.seasons, BTreeSet::from([Season::AllSeason]));
        assert_eq!(
            first.activities,
            BTreeSet::from([ActivityKind::Walk, ActivityKind::Bike])
        );

        // Explicit LONGITUDE/LATITUDE wins over the polygon centroid
        assert_eq!(sites[1].centroid.longitude, 0.045);
        assert_eq!(sites[1].centroid.latitude, 0.004);
    }

    #[test]
    fn test_ids_are_stable() {
        let a = derive_sites("ville-test", &parks(), &trails());
        let b = derive_sites("ville-test", &parks(), &trails());
        assert_eq!(a[0].id, b[0].id);
        assert_ne!(a[0].id, a[1].id);

        let other = derive_sites("ville-autre", &parks(), &trails());
        assert_ne!(a[0].id, other[0].id);
    }

    #[test]
    fn test_no_trails_no_sites() {
        let empty = collection(json!({ "type": "FeatureCollection", "features": [] }));
        assert!(derive_sites("ville-test", &parks(), &empty).is_empty());
    }

    #[test]
    fn test_geojson_output() {
        let sites = derive_sites("ville-test", &parks(), &trails());
        let fc = sites_to_geojson(&sites).unwrap();
        assert_eq!(fc.features.len(), 2);

        let feature = &fc.features[0];
        assert_eq!(feature.id, Some(Id::String(sites[0].id.to_string())));
        let props = feature.properties.as_ref().unwrap();
        assert_eq!(props["name"], json!("Parc du Ruisseau"));
        assert_eq!(props["municipality"], json!("ville-test"));
        assert_eq!(props["seasons"], json!(["AllSeason"]));
        assert_eq!(props["activities"], json!(["Walk", "Bike"]));
        assert!(feature.geometry.is_some());
    }

    #[test]
    fn test_overpass_area_id() {
        assert_eq!(overpass_area_id("relation", 123), Some(3_600_000_123));
        assert_eq!(overpass_area_id("way", 5), Some(2_400_000_005));
        assert_eq!(overpass_area_id("node", 5), None);
    }

    #[test]
    fn test_rects_overlap() {
        let a = Rect::new((0.0, 0.0), (1.0, 1.0));
        let b = Rect::new((1.0, 1.0), (2.0, 2.0));
        let c = Rect::new((1.5, 0.0), (2.0, 0.5));
        assert!(rects_overlap(&a, &b));
        assert!(!rects_overlap(&a, &c));
    }
}
