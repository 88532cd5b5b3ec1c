//! Tiling schemes: tile bounds and subdivision

use std::f64::consts::PI;

use super::geo::GeoBox;
use super::projection::Projection;
use super::tile::TileKey;

/// Partitioning of the world into a tree of tiles
pub trait TilingScheme {
    /// Identity used to match elevation sources against the scheme in use
    fn name(&self) -> &str;

    /// Projection the scheme's tiles are laid out in
    fn projection(&self) -> Projection;

    fn geo_box(&self, tile_key: &TileKey) -> GeoBox;

    /// Children of a tile; fixed branching factor, no duplicates
    fn sub_tile_keys(&self, tile_key: &TileKey) -> Vec<TileKey>;
}

/// How tile rows map to latitudes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RowLayout {
    /// Web Mercator rows, row 0 at the north
    Mercator,
    /// Rows evenly spaced in latitude, row 0 at the south
    Geographic,
}

/// Single-root quadtree over the whole world
#[derive(Clone, Debug)]
pub struct QuadTreeTilingScheme {
    name: String,
    projection: Projection,
    layout: RowLayout,
}

impl QuadTreeTilingScheme {
    /// OSM-compatible Web Mercator tiles
    pub fn web_mercator() -> Self {
        Self {
            name: "web-mercator".to_string(),
            projection: Projection::Mercator,
            layout: RowLayout::Mercator,
        }
    }

    /// Equirectangular lat/lon quadtree
    pub fn geographic() -> Self {
        Self {
            name: "geographic".to_string(),
            projection: Projection::Equirectangular,
            layout: RowLayout::Geographic,
        }
    }

    /// Lat/lon quadtree rendered on a sphere
    pub fn spherical() -> Self {
        Self {
            name: "geographic-sphere".to_string(),
            projection: Projection::Spherical,
            layout: RowLayout::Geographic,
        }
    }

    fn row_to_latitude(&self, row: u32, level: u32) -> f64 {
        let n = (1_u64 << level) as f64;
        match self.layout {
            RowLayout::Mercator => (PI * (1.0 - 2.0 * row as f64 / n)).sinh().atan().to_degrees(),
            RowLayout::Geographic => row as f64 / n * 180.0 - 90.0,
        }
    }
}

impl TilingScheme for QuadTreeTilingScheme {
    fn name(&self) -> &str {
        &self.name
    }

    fn projection(&self) -> Projection {
        self.projection
    }

    fn geo_box(&self, tile_key: &TileKey) -> GeoBox {
        let n = (1_u64 << tile_key.level) as f64;
        let west = tile_key.column as f64 / n * 360.0 - 180.0;
        let east = (tile_key.column + 1) as f64 / n * 360.0 - 180.0;
        let a = self.row_to_latitude(tile_key.row, tile_key.level);
        let b = self.row_to_latitude(tile_key.row + 1, tile_key.level);
        GeoBox::new(west, a.min(b), east, a.max(b))
    }

    fn sub_tile_keys(&self, tile_key: &TileKey) -> Vec<TileKey> {
        tile_key.children().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::projection::MERCATOR_LATITUDE_LIMIT;

    #[test]
    fn test_web_mercator_root_box() {
        let scheme = QuadTreeTilingScheme::web_mercator();
        let root = scheme.geo_box(&TileKey::root());
        assert_eq!(root.west, -180.0);
        assert_eq!(root.east, 180.0);
        assert!((root.north - MERCATOR_LATITUDE_LIMIT).abs() < 1e-6);
        assert!((root.south + MERCATOR_LATITUDE_LIMIT).abs() < 1e-6);
    }

    #[test]
    fn test_web_mercator_row_zero_is_north() {
        let scheme = QuadTreeTilingScheme::web_mercator();
        let north = scheme.geo_box(&TileKey::new(1, 0, 0));
        assert!(north.south.abs() < 1e-9);
        assert!(north.north > 85.0);
    }

    #[test]
    fn test_geographic_children_partition_parent() {
        let scheme = QuadTreeTilingScheme::geographic();
        let parent = TileKey::new(2, 1, 3);
        let parent_box = scheme.geo_box(&parent);
        let children = scheme.sub_tile_keys(&parent);
        assert_eq!(children.len(), 4);

        let area: f64 = children
            .iter()
            .map(|k| {
                let b = scheme.geo_box(k);
                assert!(b.west >= parent_box.west && b.east <= parent_box.east);
                assert!(b.south >= parent_box.south && b.north <= parent_box.north);
                b.longitude_span() * b.latitude_span()
            })
            .sum();
        let parent_area = parent_box.longitude_span() * parent_box.latitude_span();
        assert!((area - parent_area).abs() < 1e-9);
    }
}
