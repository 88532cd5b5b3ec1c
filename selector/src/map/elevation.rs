//! Elevation ranges used to refine tile volumes

use super::scheme::TilingScheme;
use super::tile::TileKey;

/// Whether an elevation range is backed by loaded data
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalculationStatus {
    Final,
    /// Derived from coarser or missing data; may change later
    Approximate,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElevationRange {
    pub min: f64,
    pub max: f64,
    pub status: CalculationStatus,
}

impl ElevationRange {
    pub fn new(min: f64, max: f64, status: CalculationStatus) -> Self {
        Self { min, max, status }
    }
}

/// Supplier of per-tile elevation bounds
pub trait ElevationRangeSource {
    /// Scheme the ranges are keyed by
    fn tiling_scheme(&self) -> &dyn TilingScheme;

    /// Elevation bounds of a tile, `None` when nothing is known yet
    fn elevation_range(&self, tile_key: &TileKey) -> Option<ElevationRange>;
}
