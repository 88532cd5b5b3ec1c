//! Per-source subdivision policies

use std::collections::HashSet;

use super::tile::TileKey;

/// Subdivision policy of one data source
pub trait DataSource {
    /// Whether `tile_key` should be split when rendering at `zoom_level`
    fn should_subdivide(&self, zoom_level: u32, tile_key: &TileKey) -> bool;
}

/// Splits tiles until they reach the requested zoom level, capped at `max_level`
#[derive(Clone, Copy, Debug)]
pub struct ZoomLimitedDataSource {
    pub max_level: u32,
}

impl ZoomLimitedDataSource {
    pub fn new(max_level: u32) -> Self {
        Self { max_level }
    }
}

impl DataSource for ZoomLimitedDataSource {
    fn should_subdivide(&self, zoom_level: u32, tile_key: &TileKey) -> bool {
        tile_key.level < zoom_level.min(self.max_level)
    }
}

/// Never splits the listed tiles; defers to `inner` for every other tile
pub struct ExcludedTilesDataSource<D> {
    excluded: HashSet<TileKey>,
    inner: D,
}

impl<D: DataSource> ExcludedTilesDataSource<D> {
    pub fn new(inner: D, excluded: impl IntoIterator<Item = TileKey>) -> Self {
        Self {
            excluded: excluded.into_iter().collect(),
            inner,
        }
    }
}

impl<D: DataSource> DataSource for ExcludedTilesDataSource<D> {
    fn should_subdivide(&self, zoom_level: u32, tile_key: &TileKey) -> bool {
        !self.excluded.contains(tile_key) && self.inner.should_subdivide(zoom_level, tile_key)
    }
}

/// Policy given by a closure
pub struct FnDataSource<F>(pub F);

impl<F> DataSource for FnDataSource<F>
where
    F: Fn(u32, &TileKey) -> bool,
{
    fn should_subdivide(&self, zoom_level: u32, tile_key: &TileKey) -> bool {
        (self.0)(zoom_level, tile_key)
    }
}
