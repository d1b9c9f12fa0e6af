// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Geometry types shared by municipalities and activity sites.

use crate::error::AppError;
use geo::coordinate_position::{CoordPos, CoordinatePosition};
use geo::{BoundingRect, Centroid, Distance, Geodesic, MultiPolygon, Point, Polygon, Rect};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A validated WGS84 position.
///
/// The only way to build one is [`Coordinates::new`], so every value in
/// circulation is finite and in range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Validate a latitude/longitude pair.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, AppError> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);

        if !valid {
            return Err(AppError::InvalidCoordinate {
                latitude,
                longitude,
            });
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Build from a geo point (x = longitude, y = latitude).
    pub fn from_point(point: Point<f64>) -> Result<Self, AppError> {
        Self::new(point.y(), point.x())
    }

    /// Longitude-first point for geo algorithms.
    pub fn point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }

    /// Geodesic distance on the WGS84 ellipsoid, in meters.
    pub fn distance_m(&self, other: &Coordinates) -> f64 {
        Geodesic.distance(self.point(), other.point())
    }
}

impl<'de> Deserialize<'de> for Coordinates {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            latitude: f64,
            longitude: f64,
        }

        let raw = Raw::deserialize(deserializer)?;
        Coordinates::new(raw.latitude, raw.longitude).map_err(serde::de::Error::custom)
    }
}

/// Geometry of a municipality boundary or an activity site.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Point<f64>),
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
}

impl Geometry {
    /// GeoJSON type name, for logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPolygon(_) => "MultiPolygon",
        }
    }

    /// True for the areal variants.
    pub fn is_areal(&self) -> bool {
        match self {
            Geometry::Point(_) => false,
            Geometry::Polygon(_) | Geometry::MultiPolygon(_) => true,
        }
    }

    pub fn to_geo(&self) -> geo::Geometry<f64> {
        match self {
            Geometry::Point(p) => geo::Geometry::Point(*p),
            Geometry::Polygon(p) => geo::Geometry::Polygon(p.clone()),
            Geometry::MultiPolygon(mp) => geo::Geometry::MultiPolygon(mp.clone()),
        }
    }

    pub fn to_geojson(&self) -> geojson::Geometry {
        let value = match self {
            Geometry::Point(p) => geojson::Value::from(p),
            Geometry::Polygon(p) => geojson::Value::from(p),
            Geometry::MultiPolygon(mp) => geojson::Value::from(mp),
        };
        geojson::Geometry::new(value)
    }

    fn bounding_rect(&self) -> Option<Rect<f64>> {
        match self {
            Geometry::Point(p) => Some(p.bounding_rect()),
            Geometry::Polygon(p) => p.bounding_rect(),
            Geometry::MultiPolygon(mp) => mp.bounding_rect(),
        }
    }

    fn centroid(&self) -> Option<Point<f64>> {
        match self {
            Geometry::Point(p) => Some(*p),
            Geometry::Polygon(p) => p.centroid(),
            Geometry::MultiPolygon(mp) => mp.centroid(),
        }
    }
}

/// A geometry with its bounding box and centroid computed once.
///
/// Never mutated after construction, so it can be shared across threads
/// and queried repeatedly.
#[derive(Debug, Clone)]
pub struct PreparedGeometry {
    geometry: Geometry,
    bounds: Rect<f64>,
    centroid: Point<f64>,
}

impl PreparedGeometry {
    /// Prepare a geometry. Returns `None` for empty geometries, which have
    /// neither bounds nor a centroid.
    pub fn new(geometry: Geometry) -> Option<Self> {
        let bounds = geometry.bounding_rect()?;
        let centroid = geometry.centroid()?;
        Some(Self {
            geometry,
            bounds,
            centroid,
        })
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn into_geometry(self) -> Geometry {
        self.geometry
    }

    pub fn bounds(&self) -> Rect<f64> {
        self.bounds
    }

    pub fn centroid(&self) -> Point<f64> {
        self.centroid
    }

    /// Point-in-geometry test.
    ///
    /// Points on a ring count as contained; points inside a hole do not.
    /// For point geometries this is exact equality.
    pub fn contains_point(&self, point: &Point<f64>) -> bool {
        let (min, max) = (self.bounds.min(), self.bounds.max());
        if point.x() < min.x || point.x() > max.x || point.y() < min.y || point.y() > max.y {
            return false;
        }

        match &self.geometry {
            Geometry::Point(p) => p == point,
            Geometry::Polygon(poly) => poly.coordinate_position(&point.0) != CoordPos::Outside,
            Geometry::MultiPolygon(mp) => mp.coordinate_position(&point.0) != CoordPos::Outside,
        }
    }
}
