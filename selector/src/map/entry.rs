//! Per-tile record produced while selecting tiles

use super::tile::{TileKey, TileOffsetKey};

/// A tile reached by the traversal, at one world-wrap offset
#[derive(Clone, Debug, PartialEq)]
pub struct TileEntry {
    pub tile_key: TileKey,
    pub offset: i32,
    /// Estimated on-screen area in squared clip-space units
    pub area: f64,
    /// Projected depth (z / w) of the tile's center
    pub distance: f64,
    pub min_elevation: f64,
    pub max_elevation: f64,
}

impl TileEntry {
    pub fn new(
        tile_key: TileKey,
        offset: i32,
        area: f64,
        distance: f64,
        min_elevation: f64,
        max_elevation: f64,
    ) -> Self {
        Self {
            tile_key,
            offset,
            area,
            distance,
            min_elevation,
            max_elevation,
        }
    }

    /// Root entries always carry infinite area so they are split at least once
    pub fn root(tile_key: TileKey, offset: i32) -> Self {
        Self::new(tile_key, offset, f64::INFINITY, 0.0, 0.0, 0.0)
    }

    pub fn offset_key(&self) -> TileOffsetKey {
        TileOffsetKey::new(&self.tile_key, self.offset)
    }
}
