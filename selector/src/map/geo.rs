//! Geographic points and boxes

use serde::{Deserialize, Serialize};

/// Tolerance in degrees applied at box edges by [`GeoBox::intersects`]
pub const GEO_BOX_EPSILON: f64 = 1e-7;

/// Longitude/latitude in degrees, altitude in meters
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
    #[serde(default)]
    pub altitude: f64,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64, altitude: f64) -> Self {
        Self {
            longitude,
            latitude,
            altitude,
        }
    }
}

/// Axis-aligned geographic rectangle with an altitude range.
///
/// Longitudes are not normalized: a box shifted by a world-wrap offset may
/// extend past ±180°.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
    #[serde(default)]
    pub min_altitude: f64,
    #[serde(default)]
    pub max_altitude: f64,
}

impl GeoBox {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
            min_altitude: 0.0,
            max_altitude: 0.0,
        }
    }

    /// Degenerate box used when the view has no defined extent
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Smallest box containing all points, `None` for an empty iterator
    pub fn from_points(points: impl IntoIterator<Item = GeoPoint>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut geo_box = GeoBox {
            west: first.longitude,
            south: first.latitude,
            east: first.longitude,
            north: first.latitude,
            min_altitude: first.altitude,
            max_altitude: first.altitude,
        };
        for p in iter {
            geo_box.west = geo_box.west.min(p.longitude);
            geo_box.east = geo_box.east.max(p.longitude);
            geo_box.south = geo_box.south.min(p.latitude);
            geo_box.north = geo_box.north.max(p.latitude);
            geo_box.min_altitude = geo_box.min_altitude.min(p.altitude);
            geo_box.max_altitude = geo_box.max_altitude.max(p.altitude);
        }
        Some(geo_box)
    }

    pub fn with_altitude_range(mut self, min_altitude: f64, max_altitude: f64) -> Self {
        self.min_altitude = min_altitude;
        self.max_altitude = max_altitude;
        self
    }

    /// Copy of this box moved by `offset` world widths in longitude
    pub fn shifted(&self, offset: i32) -> Self {
        let shift = 360.0 * offset as f64;
        Self {
            west: self.west + shift,
            east: self.east + shift,
            ..*self
        }
    }

    pub fn longitude_span(&self) -> f64 {
        self.east - self.west
    }

    pub fn latitude_span(&self) -> f64 {
        self.north - self.south
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.west + self.east) * 0.5,
            (self.south + self.north) * 0.5,
            (self.min_altitude + self.max_altitude) * 0.5,
        )
    }

    /// True when the box has no area or holds non-finite bounds
    pub fn is_degenerate(&self) -> bool {
        let finite = [self.west, self.south, self.east, self.north]
            .iter()
            .all(|v| v.is_finite());
        !finite || self.longitude_span() <= 0.0 || self.latitude_span() <= 0.0
    }

    /// 2D overlap test; boxes that only touch within [`GEO_BOX_EPSILON`] do not intersect
    pub fn intersects(&self, other: &GeoBox) -> bool {
        other.east - self.west > GEO_BOX_EPSILON
            && self.east - other.west > GEO_BOX_EPSILON
            && other.north - self.south > GEO_BOX_EPSILON
            && self.north - other.south > GEO_BOX_EPSILON
    }
}
