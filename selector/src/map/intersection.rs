//! Visibility tests applied to candidate tiles

use glam::{DMat4, DVec4};

use super::geo::GeoBox;
use super::volume::{TileVolume, frustum_planes};

/// Decides whether a candidate tile can be visible
pub trait TileIntersection {
    /// `geo_box` is already shifted by the tile's world offset; `volume` is
    /// its world-space bounding volume.
    fn intersects(&self, geo_box: &GeoBox, volume: &TileVolume) -> bool;
}

/// 2D overlap against the visible world region
#[derive(Clone, Copy, Debug)]
pub struct GeoBoxIntersection {
    world_box: GeoBox,
}

impl GeoBoxIntersection {
    pub fn new(world_box: GeoBox) -> Self {
        Self { world_box }
    }
}

impl TileIntersection for GeoBoxIntersection {
    fn intersects(&self, geo_box: &GeoBox, _volume: &TileVolume) -> bool {
        geo_box.intersects(&self.world_box)
    }
}

/// Oriented-box test against the six frustum planes
#[derive(Clone, Copy, Debug)]
pub struct ObbIntersection {
    planes: [DVec4; 6],
}

impl ObbIntersection {
    pub fn new(view_projection: &DMat4) -> Self {
        Self {
            planes: frustum_planes(view_projection),
        }
    }
}

impl TileIntersection for ObbIntersection {
    fn intersects(&self, _geo_box: &GeoBox, volume: &TileVolume) -> bool {
        self.planes.iter().all(|plane| !volume.is_outside(*plane))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::camera::MapCamera;
    use crate::map::projection::Projection;

    #[test]
    fn test_geo_box_intersection_uses_world_box() {
        let test = GeoBoxIntersection::new(GeoBox::new(-10.0, -10.0, 10.0, 10.0));
        let inside = GeoBox::new(0.0, 0.0, 5.0, 5.0);
        let touching = GeoBox::new(10.0, 0.0, 20.0, 5.0);
        let volume = TileVolume::from_geo_box(Projection::Mercator, &inside);
        assert!(test.intersects(&inside, &volume));
        assert!(!test.intersects(&touching, &volume));
    }

    #[test]
    fn test_obb_intersection_rejects_far_side_of_globe() {
        let camera = MapCamera::new(Projection::Spherical, 0.0, 0.0, 1_000_000.0, 800, 600);
        let test = ObbIntersection::new(&camera.view_projection());

        let front = GeoBox::new(-1.0, -1.0, 1.0, 1.0);
        let back = GeoBox::new(179.0, -1.0, 180.0, 1.0);
        let front_volume = TileVolume::from_geo_box(Projection::Spherical, &front);
        let back_volume = TileVolume::from_geo_box(Projection::Spherical, &back);
        assert!(test.intersects(&front, &front_volume));
        assert!(!test.intersects(&back, &back_volume));
    }
}
