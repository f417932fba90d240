use geo_types::{Coord, LineString, Point};
use geojson::{Geometry as GeoJsonGeometry, Value as GeoJsonValue};

use crate::error::RouteError;

use super::points::LineSegment;

/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

// =============================================================================
// Coordinate
// =============================================================================

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn haversine_km(&self, other: &Coordinate) -> f64 {
        haversine_km(*self, *other)
    }
}

impl From<Coordinate> for Point<f64> {
    fn from(c: Coordinate) -> Self {
        Point::new(c.lng, c.lat)
    }
}

impl From<Point<f64>> for Coordinate {
    fn from(p: Point<f64>) -> Self {
        Coordinate::new(p.y(), p.x())
    }
}

/// Great-circle distance in kilometres between two coordinates (Haversine).
///
/// Non-finite inputs yield NaN, which never compares smaller than any
/// distance, so such points are never picked as a nearest neighbour.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let d_phi = (b.lat - a.lat).to_radians();
    let d_lambda = (b.lng - a.lng).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);

    // clamp keeps NaN, unlike min
    2.0 * EARTH_RADIUS_KM * h.sqrt().clamp(0.0, 1.0).asin()
}

// =============================================================================
// ToGeoJson Trait - Convert geometries to GeoJSON
// =============================================================================

/// Trait for converting geometries to GeoJSON.
pub trait ToGeoJson {
    /// Converts this geometry to a GeoJSON Geometry.
    fn to_geojson(&self) -> GeoJsonGeometry;
}

impl ToGeoJson for Point<f64> {
    fn to_geojson(&self) -> GeoJsonGeometry {
        GeoJsonGeometry::new(GeoJsonValue::Point(vec![self.x(), self.y()]))
    }
}

impl ToGeoJson for LineString<f64> {
    fn to_geojson(&self) -> GeoJsonGeometry {
        let coords: Vec<Vec<f64>> = self.coords().map(|c| vec![c.x, c.y]).collect();
        GeoJsonGeometry::new(GeoJsonValue::LineString(coords))
    }
}

impl ToGeoJson for Coordinate {
    fn to_geojson(&self) -> GeoJsonGeometry {
        Point::from(*self).to_geojson()
    }
}

impl From<&LineSegment> for LineString<f64> {
    fn from(segment: &LineSegment) -> Self {
        LineString::new(vec![
            Coord {
                x: segment.from.lng,
                y: segment.from.lat,
            },
            Coord {
                x: segment.to.lng,
                y: segment.to.lat,
            },
        ])
    }
}

impl ToGeoJson for LineSegment {
    fn to_geojson(&self) -> GeoJsonGeometry {
        LineString::from(self).to_geojson()
    }
}

// =============================================================================
// FromGeoJson Trait - Convert GeoJSON to geometries
// =============================================================================

/// Trait for parsing GeoJSON geometries.
pub trait FromGeoJson: Sized {
    fn from_geojson(geometry: &GeoJsonGeometry) -> Result<Self, RouteError>;
}

impl FromGeoJson for Point<f64> {
    fn from_geojson(geometry: &GeoJsonGeometry) -> Result<Self, RouteError> {
        match &geometry.value {
            GeoJsonValue::Point(position) if position.len() >= 2 => {
                Ok(Point::new(position[0], position[1]))
            }
            GeoJsonValue::Point(_) => Err(RouteError::Geometry(
                "Point needs at least two ordinates".to_string(),
            )),
            other => Err(RouteError::Geometry(format!(
                "Expected Point, got {:?}",
                other
            ))),
        }
    }
}

impl FromGeoJson for Coordinate {
    fn from_geojson(geometry: &GeoJsonGeometry) -> Result<Self, RouteError> {
        Point::from_geojson(geometry).map(Coordinate::from)
    }
}
