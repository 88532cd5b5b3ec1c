//! Map camera: view/projection matrices and the visible ground footprint

use glam::{DMat4, DVec3};
use serde::{Deserialize, Serialize};

use super::geo::{GeoBox, GeoPoint};
use super::projection::{EARTH_RADIUS, Projection};
use super::tile::{clamp_latitude, normalize_longitude};

/// Tile size in pixels (standard OSM tile size)
pub const TILE_SIZE: f64 = 256.0;

/// Steepest view angle (degrees from nadir) still treated as hitting the ground
const MAX_GROUND_ANGLE: f64 = 89.0;

/// Camera orbiting a target point on the surface
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapCamera {
    /// Target position (longitude, latitude)
    pub target: (f64, f64),

    /// Distance from the camera to the target in meters
    pub distance: f64,

    /// Angle from nadir in degrees
    #[serde(default)]
    pub tilt: f64,

    /// Clockwise from north in degrees
    #[serde(default)]
    pub heading: f64,

    /// Vertical field of view in degrees
    #[serde(default = "default_fov")]
    pub fov_y: f64,

    /// Viewport size in pixels
    pub viewport_width: u32,
    pub viewport_height: u32,

    #[serde(default)]
    pub projection: Projection,
}

fn default_fov() -> f64 {
    45.0
}

impl MapCamera {
    pub fn new(
        projection: Projection,
        lon: f64,
        lat: f64,
        distance: f64,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            target: (
                normalize_longitude(lon),
                clamp_latitude(lat, projection.latitude_limit()),
            ),
            distance: distance.max(1.0),
            tilt: 0.0,
            heading: 0.0,
            fov_y: default_fov(),
            viewport_width: width,
            viewport_height: height,
            projection,
        }
    }

    pub fn with_tilt(mut self, tilt: f64) -> Self {
        self.tilt = tilt.clamp(0.0, MAX_GROUND_ANGLE);
        self
    }

    pub fn with_heading(mut self, heading: f64) -> Self {
        self.heading = heading;
        self
    }

    pub fn with_fov(mut self, fov_y: f64) -> Self {
        self.fov_y = fov_y;
        self
    }

    /// Update viewport size
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport_width = width;
        self.viewport_height = height;
    }

    pub fn set_target(&mut self, lon: f64, lat: f64) {
        self.target = (
            normalize_longitude(lon),
            clamp_latitude(lat, self.projection.latitude_limit()),
        );
    }

    pub fn aspect(&self) -> f64 {
        self.viewport_width.max(1) as f64 / self.viewport_height.max(1) as f64
    }

    /// Ground resolution at the target
    pub fn meters_per_pixel(&self) -> f64 {
        let visible_height = 2.0 * self.distance * (self.fov_y.to_radians() * 0.5).tan();
        visible_height / self.viewport_height.max(1) as f64
    }

    /// Pan the target by a pixel delta (screen y grows downwards)
    pub fn pan(&mut self, dx_pixels: f64, dy_pixels: f64) {
        let meters_per_pixel = self.meters_per_pixel();
        let heading = self.heading.to_radians();
        let east = (dx_pixels * heading.cos() + dy_pixels * heading.sin()) * meters_per_pixel;
        let north = (dx_pixels * heading.sin() - dy_pixels * heading.cos()) * meters_per_pixel;

        let cos_lat = self.target.1.to_radians().cos().max(0.01);
        let lon_delta = (east / (EARTH_RADIUS * cos_lat)).to_degrees();
        let lat_delta = (north / EARTH_RADIUS).to_degrees();
        self.set_target(self.target.0 - lon_delta, self.target.1 - lat_delta);
    }

    fn target_world(&self) -> DVec3 {
        self.projection
            .project(GeoPoint::new(self.target.0, self.target.1, 0.0))
    }

    /// Unit view direction and camera up vector in world space
    fn view_axes(&self) -> (DVec3, DVec3) {
        let frame = self
            .projection
            .local_frame(GeoPoint::new(self.target.0, self.target.1, 0.0));
        let (st, ct) = self.tilt.to_radians().sin_cos();
        let (sh, ch) = self.heading.to_radians().sin_cos();
        let forward = frame.east * (st * sh) + frame.north * (st * ch) - frame.up * ct;
        let up = frame.east * (ct * sh) + frame.north * (ct * ch) + frame.up * st;
        (forward, up)
    }

    /// Camera position in world space
    pub fn position(&self) -> DVec3 {
        let (forward, _) = self.view_axes();
        self.target_world() - forward * self.distance
    }

    /// Height of the camera above the surface
    pub fn altitude(&self) -> f64 {
        self.projection.altitude_of(self.position()).max(0.0)
    }

    /// Distance from the camera to the horizon of a sphere of earth radius
    pub fn horizon_distance(&self) -> f64 {
        let h = self.altitude();
        (h * (2.0 * EARTH_RADIUS + h)).sqrt()
    }

    pub fn near_far(&self) -> (f64, f64) {
        let near = (self.altitude() * 0.1).max(1.0);
        let far = (self.horizon_distance() + self.distance).max(near * 2.0);
        (near, far)
    }

    /// Inverse world matrix
    pub fn view_matrix(&self) -> DMat4 {
        let (_, up) = self.view_axes();
        DMat4::look_at_rh(self.position(), self.target_world(), up)
    }

    /// Perspective projection with a [0, 1] depth range
    pub fn projection_matrix(&self) -> DMat4 {
        let (near, far) = self.near_far();
        DMat4::perspective_rh(self.fov_y.to_radians(), self.aspect(), near, far)
    }

    pub fn view_projection(&self) -> DMat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Radius around the camera nadir, in world units, that the view can reach
    /// on the ground; derived from field of view, altitude and tilt.
    pub fn ground_footprint_radius(&self) -> f64 {
        let h = self.altitude();
        let (_, far) = self.near_far();
        let half_v = self.fov_y.to_radians() * 0.5;
        let half_h = (half_v.tan() * self.aspect()).atan();

        let far_angle = self.tilt.to_radians() + half_v;
        if far_angle >= MAX_GROUND_ANGLE.to_radians() {
            return far;
        }
        let forward = h * far_angle.tan();
        let slant = h.hypot(forward);
        let half_width = slant * half_h.tan();
        forward.hypot(half_width).min(far)
    }

    /// Geographic extent of what the camera can see.
    ///
    /// Planar projections return the ground footprint with unwrapped
    /// longitudes (the box may extend past ±180°); a sphere returns the cap
    /// bounded by the horizon. `None` when no extent can be derived.
    pub fn visible_world_box(&self) -> Option<GeoBox> {
        self.visible_world_box_for(&self.view_projection())
    }

    /// [`visible_world_box`](Self::visible_world_box) as seen through an
    /// arbitrary view-projection matrix
    pub fn visible_world_box_for(&self, view_projection: &DMat4) -> Option<GeoBox> {
        if self.viewport_height == 0 || self.viewport_width == 0 {
            return None;
        }
        let geo_box = if self.projection.is_spherical() {
            self.horizon_cap()
        } else {
            self.planar_footprint(view_projection)?
        };
        (!geo_box.is_degenerate()).then_some(geo_box)
    }

    fn horizon_cap(&self) -> GeoBox {
        let nadir = self.projection.unproject(self.position());
        let h = self.altitude();
        let radius = (EARTH_RADIUS / (EARTH_RADIUS + h)).clamp(-1.0, 1.0).acos().to_degrees();

        let south = nadir.latitude - radius;
        let north = nadir.latitude + radius;
        if south <= -90.0 || north >= 90.0 {
            return GeoBox::new(-180.0, south.max(-90.0), 180.0, north.min(90.0));
        }
        let sin_dlon = radius.to_radians().sin() / nadir.latitude.to_radians().cos();
        let dlon = sin_dlon.clamp(-1.0, 1.0).asin().to_degrees();
        if sin_dlon >= 1.0 || nadir.longitude - dlon < -180.0 || nadir.longitude + dlon > 180.0 {
            return GeoBox::new(-180.0, south, 180.0, north);
        }
        GeoBox::new(nadir.longitude - dlon, south, nadir.longitude + dlon, north)
    }

    fn planar_footprint(&self, view_projection: &DMat4) -> Option<GeoBox> {
        let inverse = view_projection.inverse();
        let position = self.position();
        let (_, far) = self.near_far();

        let mut hits = vec![GeoPoint::new(self.target.0, self.target.1, 0.0)];
        for ndc_y in [-1.0, 0.0, 1.0] {
            for ndc_x in [-1.0, 0.0, 1.0] {
                let near_point = inverse.project_point3(DVec3::new(ndc_x, ndc_y, 0.0));
                let far_point = inverse.project_point3(DVec3::new(ndc_x, ndc_y, 1.0));
                let direction = (far_point - near_point).normalize_or_zero();

                let ground = if direction.z < -1e-9 {
                    let t = -position.z / direction.z;
                    position + direction * t.min(far)
                } else {
                    position + direction * far
                };
                hits.push(
                    self.projection
                        .unproject(DVec3::new(ground.x, ground.y, 0.0)),
                );
            }
        }

        let limit = self.projection.latitude_limit();
        let mut geo_box = GeoBox::from_points(hits)?;
        geo_box.south = clamp_latitude(geo_box.south, limit);
        geo_box.north = clamp_latitude(geo_box.north, limit);
        Some(geo_box.with_altitude_range(0.0, 0.0))
    }
}

impl Default for MapCamera {
    fn default() -> Self {
        // Default to Seoul from 50km
        Self::new(Projection::Mercator, 126.9780, 37.5665, 50_000.0, 800, 600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_down_camera_sits_above_target() {
        let camera = MapCamera::new(Projection::Mercator, 0.0, 0.0, 10_000.0, 800, 600);
        let position = camera.position();
        assert!(position.x.abs() < 1e-6);
        assert!(position.y.abs() < 1e-6);
        assert!((position.z - 10_000.0).abs() < 1e-6);
        assert!((camera.altitude() - 10_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_target_projects_to_screen_center() {
        let camera = MapCamera::new(Projection::Spherical, 30.0, 45.0, 2_000_000.0, 800, 600)
            .with_tilt(30.0)
            .with_heading(60.0);
        let target = Projection::Spherical.project(GeoPoint::new(30.0, 45.0, 0.0));
        let ndc = camera.view_projection().project_point3(target);
        assert!(ndc.x.abs() < 1e-9 && ndc.y.abs() < 1e-9);
        assert!((0.0..=1.0).contains(&ndc.z));
    }

    #[test]
    fn test_planar_footprint_contains_target() {
        let camera = MapCamera::new(Projection::Mercator, 10.0, 50.0, 100_000.0, 800, 600);
        let geo_box = camera.visible_world_box().unwrap();
        assert!(geo_box.west < 10.0 && geo_box.east > 10.0);
        assert!(geo_box.south < 50.0 && geo_box.north > 50.0);
        assert!(geo_box.longitude_span() < 10.0);
    }

    #[test]
    fn test_tilt_extends_footprint() {
        let flat = MapCamera::new(Projection::Mercator, 0.0, 0.0, 100_000.0, 800, 600);
        let tilted = flat.clone().with_tilt(60.0);
        assert!(tilted.ground_footprint_radius() > flat.ground_footprint_radius());
        assert!(
            tilted.visible_world_box().unwrap().north > flat.visible_world_box().unwrap().north
        );
    }

    #[test]
    fn test_narrow_field_of_view_shrinks_footprint() {
        let camera = MapCamera::new(Projection::Mercator, 0.0, 0.0, 1_000_000.0, 800, 600);
        let narrow = camera.clone().with_fov(1.0);
        let wide_box = camera.visible_world_box().unwrap();
        let narrow_box = camera
            .visible_world_box_for(&(narrow.projection_matrix() * camera.view_matrix()))
            .unwrap();
        assert!(narrow_box.longitude_span() < wide_box.longitude_span() * 0.1);
        assert_eq!(narrow.visible_world_box(), Some(narrow_box));
    }

    #[test]
    fn test_high_planar_camera_sees_past_the_antimeridian() {
        let camera = MapCamera::new(Projection::Mercator, 170.0, 0.0, 30_000_000.0, 800, 600);
        let geo_box = camera.visible_world_box().unwrap();
        assert!(geo_box.east > 180.0);
    }

    #[test]
    fn test_horizon_cap_covers_pole() {
        let camera = MapCamera::new(Projection::Spherical, 0.0, 80.0, 5_000_000.0, 800, 600);
        let geo_box = camera.visible_world_box().unwrap();
        assert_eq!(geo_box.west, -180.0);
        assert_eq!(geo_box.east, 180.0);
        assert_eq!(geo_box.north, 90.0);
    }

    #[test]
    fn test_empty_viewport_has_no_world_box() {
        let mut camera = MapCamera::default();
        camera.set_viewport(0, 0);
        assert!(camera.visible_world_box().is_none());
    }

    #[test]
    fn test_pan_moves_target() {
        let mut camera = MapCamera::new(Projection::Mercator, 0.0, 0.0, 10_000.0, 800, 600);
        camera.pan(100.0, 0.0);
        assert!(camera.target.0 < 0.0);
        assert!(camera.target.1.abs() < 1e-9);
        camera.pan(0.0, 100.0);
        assert!(camera.target.1 > 0.0);
    }
}
