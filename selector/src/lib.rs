//! View-dependent tile selection for tiled map and globe renderers

pub mod config;
pub mod map;

pub use config::SelectionOptions;
pub use map::MapSystem;
pub use map::camera::MapCamera;
pub use map::data_source::{
    DataSource, ExcludedTilesDataSource, FnDataSource, ZoomLimitedDataSource,
};
pub use map::elevation::{CalculationStatus, ElevationRange, ElevationRangeSource};
pub use map::entry::TileEntry;
pub use map::frustum::FrustumIntersection;
pub use map::geo::{GeoBox, GeoPoint};
pub use map::projection::Projection;
pub use map::scheme::{QuadTreeTilingScheme, TilingScheme};
pub use map::selection::{TileSelection, ZoomLevelTileMap};
pub use map::tile::{TileKey, TileOffsetKey};
