//! World-space bounding volumes of tiles and their screen-space estimates

use glam::{DMat4, DVec3, DVec4};

use super::geo::{GeoBox, GeoPoint};
use super::projection::{EARTH_RADIUS, Projection};

/// Samples per axis when fitting a volume to a curved tile
const SPHERE_SAMPLES: usize = 5;

/// Oriented box enclosing a tile's surface between its altitude bounds
#[derive(Clone, Copy, Debug)]
pub struct TileVolume {
    pub center: DVec3,
    pub axes: [DVec3; 3],
    pub half_extents: DVec3,
}

impl TileVolume {
    /// Fit a volume to a tile box. Longitudes are projected unwrapped, so a
    /// box shifted by a world offset yields the matching world copy.
    pub fn from_geo_box(projection: Projection, geo_box: &GeoBox) -> Self {
        if projection.is_spherical() {
            Self::fit_sphere(geo_box)
        } else {
            let min = projection.project(GeoPoint::new(
                geo_box.west,
                geo_box.south,
                geo_box.min_altitude,
            ));
            let max = projection.project(GeoPoint::new(
                geo_box.east,
                geo_box.north,
                geo_box.max_altitude,
            ));
            Self {
                center: (min + max) * 0.5,
                axes: [DVec3::X, DVec3::Y, DVec3::Z],
                half_extents: (max - min).abs() * 0.5,
            }
        }
    }

    fn fit_sphere(geo_box: &GeoBox) -> Self {
        let projection = Projection::Spherical;
        let center_point = geo_box.center();
        let frame = projection.local_frame(center_point);
        let origin = projection.project(center_point);
        let axes = [frame.east, frame.north, frame.up];

        let mut min = DVec3::splat(f64::INFINITY);
        let mut max = DVec3::splat(f64::NEG_INFINITY);
        let last = (SPHERE_SAMPLES - 1) as f64;
        for i in 0..SPHERE_SAMPLES {
            let lon = geo_box.west + geo_box.longitude_span() * i as f64 / last;
            for j in 0..SPHERE_SAMPLES {
                let lat = geo_box.south + geo_box.latitude_span() * j as f64 / last;
                for altitude in [geo_box.min_altitude, geo_box.max_altitude] {
                    let d = projection.project(GeoPoint::new(lon, lat, altitude)) - origin;
                    let local = DVec3::new(d.dot(axes[0]), d.dot(axes[1]), d.dot(axes[2]));
                    min = min.min(local);
                    max = max.max(local);
                }
            }
        }

        // Surface bulge between neighbouring samples
        let step = (geo_box.longitude_span().max(geo_box.latitude_span()) / last).to_radians();
        let bulge = (EARTH_RADIUS + geo_box.max_altitude.max(0.0)) * (1.0 - (step * 0.5).cos());

        let mid = (min + max) * 0.5;
        Self {
            center: origin + axes[0] * mid.x + axes[1] * mid.y + axes[2] * mid.z,
            axes,
            half_extents: (max - min) * 0.5 + DVec3::splat(bulge),
        }
    }

    pub fn half_diagonal(&self) -> f64 {
        self.half_extents.length()
    }

    /// True when the whole volume lies on the negative side of `plane`
    /// (`xyz` normal, `w` distance; inside is `n·p + w >= 0`)
    pub fn is_outside(&self, plane: DVec4) -> bool {
        let normal = plane.truncate();
        let reach: f64 = self
            .axes
            .iter()
            .zip(self.half_extents.to_array())
            .map(|(axis, extent)| normal.dot(*axis).abs() * extent)
            .sum();
        normal.dot(self.center) + plane.w < -reach
    }

    /// Apparent screen area and depth through a view-projection matrix.
    ///
    /// Area is `(half diagonal / w)^2`, distance is `z / w` of the center.
    /// A center at or behind the eye plane gets infinite area.
    pub fn screen_metrics(&self, view_projection: &DMat4) -> (f64, f64) {
        let clip = *view_projection * self.center.extend(1.0);
        if clip.w <= f64::EPSILON {
            return (f64::INFINITY, 0.0);
        }
        let extent = self.half_diagonal() / clip.w;
        (extent * extent, clip.z / clip.w)
    }
}

/// The six planes of a [0, 1]-depth view frustum, normalized, pointing inwards
pub fn frustum_planes(view_projection: &DMat4) -> [DVec4; 6] {
    let r0 = view_projection.row(0);
    let r1 = view_projection.row(1);
    let r2 = view_projection.row(2);
    let r3 = view_projection.row(3);
    [r3 + r0, r3 - r0, r3 + r1, r3 - r1, r2, r3 - r2].map(|plane| {
        let length = plane.truncate().length();
        if length > 0.0 { plane / length } else { plane }
    })
}
