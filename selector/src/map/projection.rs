//! World projections: geographic coordinates to world space and back

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::geo::GeoPoint;

/// Equatorial radius in meters
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Latitude limit of the square Web Mercator world
pub const MERCATOR_LATITUDE_LIMIT: f64 = 85.05112878;

/// Orthonormal east/north/up frame at a point on the surface
#[derive(Clone, Copy, Debug)]
pub struct LocalFrame {
    pub east: DVec3,
    pub north: DVec3,
    pub up: DVec3,
}

/// Mapping between geographic and world coordinates.
///
/// Planar projections put the surface in the z = 0 plane with x growing
/// eastwards; longitudes are not wrapped, so `lon + 360` lands exactly one
/// [`Projection::world_width`] further east.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    #[default]
    Mercator,
    Equirectangular,
    Spherical,
}

impl Projection {
    pub fn is_spherical(&self) -> bool {
        matches!(self, Projection::Spherical)
    }

    /// Planar worlds repeat horizontally; a sphere closes on itself
    pub fn wraps_horizontally(&self) -> bool {
        !self.is_spherical()
    }

    /// World-space width of one copy of a planar world
    pub fn world_width(&self) -> f64 {
        2.0 * PI * EARTH_RADIUS
    }

    pub fn latitude_limit(&self) -> f64 {
        match self {
            Projection::Mercator => MERCATOR_LATITUDE_LIMIT,
            Projection::Equirectangular | Projection::Spherical => 90.0,
        }
    }

    pub fn project(&self, point: GeoPoint) -> DVec3 {
        let lon = point.longitude.to_radians();
        match self {
            Projection::Mercator => {
                let lat = point
                    .latitude
                    .clamp(-MERCATOR_LATITUDE_LIMIT, MERCATOR_LATITUDE_LIMIT)
                    .to_radians();
                let y = (FRAC_PI_4 + lat * 0.5).tan().ln();
                DVec3::new(EARTH_RADIUS * lon, EARTH_RADIUS * y, point.altitude)
            }
            Projection::Equirectangular => DVec3::new(
                EARTH_RADIUS * lon,
                EARTH_RADIUS * point.latitude.to_radians(),
                point.altitude,
            ),
            Projection::Spherical => {
                let lat = point.latitude.to_radians();
                let r = EARTH_RADIUS + point.altitude;
                DVec3::new(
                    r * lat.cos() * lon.cos(),
                    r * lat.cos() * lon.sin(),
                    r * lat.sin(),
                )
            }
        }
    }

    pub fn unproject(&self, world: DVec3) -> GeoPoint {
        match self {
            Projection::Mercator => {
                let lat = 2.0 * (world.y / EARTH_RADIUS).exp().atan() - FRAC_PI_2;
                GeoPoint::new(
                    (world.x / EARTH_RADIUS).to_degrees(),
                    lat.to_degrees(),
                    world.z,
                )
            }
            Projection::Equirectangular => GeoPoint::new(
                (world.x / EARTH_RADIUS).to_degrees(),
                (world.y / EARTH_RADIUS).to_degrees(),
                world.z,
            ),
            Projection::Spherical => {
                let r = world.length();
                if r == 0.0 {
                    return GeoPoint::new(0.0, 0.0, -EARTH_RADIUS);
                }
                GeoPoint::new(
                    world.y.atan2(world.x).to_degrees(),
                    (world.z / r).clamp(-1.0, 1.0).asin().to_degrees(),
                    r - EARTH_RADIUS,
                )
            }
        }
    }

    /// Height of a world-space position above the surface
    pub fn altitude_of(&self, world: DVec3) -> f64 {
        match self {
            Projection::Spherical => world.length() - EARTH_RADIUS,
            _ => world.z,
        }
    }

    pub fn local_frame(&self, point: GeoPoint) -> LocalFrame {
        match self {
            Projection::Spherical => {
                let (lon, lat) = (point.longitude.to_radians(), point.latitude.to_radians());
                LocalFrame {
                    east: DVec3::new(-lon.sin(), lon.cos(), 0.0),
                    north: DVec3::new(-lat.sin() * lon.cos(), -lat.sin() * lon.sin(), lat.cos()),
                    up: DVec3::new(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()),
                }
            }
            _ => LocalFrame {
                east: DVec3::X,
                north: DVec3::Y,
                up: DVec3::Z,
            },
        }
    }

    pub fn surface_normal(&self, point: GeoPoint) -> DVec3 {
        self.local_frame(point).up
    }
}
