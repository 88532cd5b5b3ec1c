//! Map view: camera, tiling and per-frame tile selection

pub mod camera;
pub mod data_source;
pub mod elevation;
pub mod entry;
pub mod frustum;
pub mod geo;
pub mod intersection;
pub mod projection;
pub mod scheme;
pub mod selection;
pub mod tile;
pub mod volume;

use camera::MapCamera;
use data_source::DataSource;
use elevation::ElevationRangeSource;
use frustum::FrustumIntersection;
use scheme::TilingScheme;
use selection::TileSelection;

use crate::config::SelectionOptions;

/// Camera plus the tile selection derived from it
pub struct MapSystem {
    pub camera: MapCamera,
    frustum: FrustumIntersection,

    /// Tiles selected by the last update
    selection: TileSelection,
}

impl MapSystem {
    pub fn new(camera: MapCamera, options: SelectionOptions) -> Self {
        Self {
            camera,
            frustum: FrustumIntersection::new(options),
            selection: TileSelection::default(),
        }
    }

    /// Refresh the view from the camera and select tiles (call each frame)
    pub fn update(
        &mut self,
        tiling_scheme: &dyn TilingScheme,
        elevation_range_source: Option<&dyn ElevationRangeSource>,
        zoom_levels: &[u32],
        data_sources: &[&dyn DataSource],
    ) -> &TileSelection {
        self.frustum.update_frustum(&self.camera, None);
        self.selection = self.frustum.compute(
            tiling_scheme,
            elevation_range_source,
            zoom_levels,
            data_sources,
        );
        &self.selection
    }

    pub fn selection(&self) -> &TileSelection {
        &self.selection
    }

    pub fn frustum(&self) -> &FrustumIntersection {
        &self.frustum
    }

    /// Handle viewport resize
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_viewport(width, height);
    }

    /// Pan the map by pixel delta
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.camera.pan(dx, dy);
    }

    /// Set target position
    pub fn set_target(&mut self, lon: f64, lat: f64) {
        self.camera.set_target(lon, lat);
    }
}
