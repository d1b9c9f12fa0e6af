// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity site index: nearest-site queries and lookups.

use crate::error::AppError;
use crate::models::{ActivityKind, ActivitySite, Coordinates, Season};
use crate::services::geometry::{GeometryError, GeometryFeature, GeometryStore};
use crate::services::MunicipalityResolver;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;

pub const DEFAULT_MAX_DISTANCE_KM: f64 = 10.0;
pub const DEFAULT_LIMIT: usize = 10;

/// Radius and result cap for [`SiteIndex::nearest_sites`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbyQuery {
    pub max_distance_km: f64,
    pub limit: usize,
}

impl Default for NearbyQuery {
    fn default() -> Self {
        Self {
            max_distance_km: DEFAULT_MAX_DISTANCE_KM,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// A site with its distance from the query point.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct NearbySite {
    /// Geodesic distance in meters
    pub distance_m: f64,
    pub site: ActivitySite,
}

impl NearbySite {
    pub fn distance_km(&self) -> f64 {
        self.distance_m / 1000.0
    }
}

/// Properties carried by each site feature.
#[derive(Deserialize)]
struct SiteProperties {
    name: String,
    municipality: String,
    seasons: BTreeSet<Season>,
    activities: BTreeSet<ActivityKind>,
    #[serde(default)]
    longitude: Option<f64>,
    #[serde(default)]
    latitude: Option<f64>,
}

/// Immutable index over activity sites, built once at startup.
///
/// Queries scan every site and sort by geodesic distance. That is fine for
/// the hundreds to low thousands of sites a competition has; larger
/// datasets would want an R-tree on the centroids.
#[derive(Debug, Clone, Default)]
pub struct SiteIndex {
    sites: Vec<ActivitySite>,
    by_id: HashMap<Uuid, usize>,
    by_municipality: HashMap<String, Vec<usize>>,
}

impl SiteIndex {
    /// Load sites from a GeoJSON file, checking each against the known
    /// municipalities.
    pub fn load_from_file<P: AsRef<Path>>(
        path: P,
        municipalities: &MunicipalityResolver,
    ) -> Result<Self, GeometryError> {
        Self::from_store(GeometryStore::load_from_file(path)?, municipalities)
    }

    /// Load sites from a GeoJSON string.
    pub fn load_from_json(
        json_data: &str,
        municipalities: &MunicipalityResolver,
    ) -> Result<Self, GeometryError> {
        Self::from_store(GeometryStore::load_from_json(json_data)?, municipalities)
    }

    fn from_store(
        store: GeometryStore,
        municipalities: &MunicipalityResolver,
    ) -> Result<Self, GeometryError> {
        let sites = store
            .into_features()
            .into_iter()
            .map(site_from_feature)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(sites, municipalities)
    }

    /// Build the index from site records.
    pub fn new(
        sites: Vec<ActivitySite>,
        municipalities: &MunicipalityResolver,
    ) -> Result<Self, GeometryError> {
        let mut by_id = HashMap::with_capacity(sites.len());
        let mut by_municipality: HashMap<String, Vec<usize>> = HashMap::new();

        for (i, site) in sites.iter().enumerate() {
            if by_id.insert(site.id, i).is_some() {
                return Err(GeometryError::DuplicateIdentifier(site.id.to_string()));
            }
            if municipalities.municipality(&site.municipality).is_none() {
                return Err(GeometryError::UnknownMunicipality {
                    site: site.id.to_string(),
                    municipality: site.municipality.clone(),
                });
            }
            by_municipality
                .entry(site.municipality.clone())
                .or_default()
                .push(i);
        }

        tracing::info!(
            count = sites.len(),
            municipalities = by_municipality.len(),
            "Loaded activity sites"
        );

        Ok(Self {
            sites,
            by_id,
            by_municipality,
        })
    }

    pub fn sites(&self) -> &[ActivitySite] {
        &self.sites
    }

    /// Look up a site. Unknown ids are a normal outcome, not an error.
    pub fn site_by_id(&self, id: Uuid) -> Option<&ActivitySite> {
        self.by_id.get(&id).map(|&i| &self.sites[i])
    }

    /// Sites of one municipality, in dataset order. Empty for unknown ids.
    pub fn sites_by_municipality(&self, municipality: &str) -> Vec<&ActivitySite> {
        self.by_municipality
            .get(municipality)
            .map(|indices| indices.iter().map(|&i| &self.sites[i]).collect())
            .unwrap_or_default()
    }

    /// Sites within `query.max_distance_km` of a point, closest first.
    ///
    /// Distances are geodesic on the WGS84 ellipsoid. Equal distances are
    /// ordered by site id. At most `query.limit` results are returned.
    pub fn nearest_sites(
        &self,
        latitude: f64,
        longitude: f64,
        query: &NearbyQuery,
    ) -> Result<Vec<NearbySite>, AppError> {
        let origin = Coordinates::new(latitude, longitude)?;
        let max_distance_m = query.max_distance_km * 1000.0;

        let mut nearby: Vec<(f64, &ActivitySite)> = self
            .sites
            .iter()
            .map(|site| (origin.distance_m(&site.centroid), site))
            .filter(|(distance, _)| *distance <= max_distance_m)
            .collect();

        nearby.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.id.cmp(&b.1.id)));
        nearby.truncate(query.limit);

        Ok(nearby
            .into_iter()
            .map(|(distance_m, site)| NearbySite {
                distance_m,
                site: site.clone(),
            })
            .collect())
    }
}

/// Build a site from one dataset feature.
///
/// The centroid comes from a Point geometry, then from `longitude` and
/// `latitude` properties, then from the centroid of the outline.
fn site_from_feature(feature: GeometryFeature) -> Result<ActivitySite, GeometryError> {
    let id = Uuid::parse_str(&feature.id).map_err(|e| GeometryError::InvalidProperties {
        id: feature.id.clone(),
        reason: format!("site id is not a UUID: {}", e),
    })?;
    let props: SiteProperties = feature.properties()?;

    let invalid = |reason: String| GeometryError::InvalidProperties {
        id: feature.id.clone(),
        reason,
    };

    let from_props = match (props.longitude, props.latitude) {
        (Some(lon), Some(lat)) => {
            Some(Coordinates::new(lat, lon).map_err(|e| invalid(e.to_string()))?)
        }
        (None, None) => None,
        _ => {
            return Err(invalid(
                "longitude and latitude must be given together".to_string(),
            ))
        }
    };

    let centroid = match (&feature.geometry, from_props) {
        (Some(geometry), _) if !geometry.geometry().is_areal() => {
            Coordinates::from_point(geometry.centroid()).map_err(|e| invalid(e.to_string()))?
        }
        (_, Some(coordinates)) => coordinates,
        (Some(geometry), None) => {
            Coordinates::from_point(geometry.centroid()).map_err(|e| invalid(e.to_string()))?
        }
        (None, None) => return Err(invalid("site has no geometry and no coordinates".to_string())),
    };

    Ok(ActivitySite {
        id,
        name: props.name,
        municipality: props.municipality,
        seasons: props.seasons,
        activities: props.activities,
        centroid,
        geometry: feature.geometry.map(|g| g.into_geometry()),
    })
}
