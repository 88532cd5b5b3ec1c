//! Scene files: camera, options and layers for one selection run

use std::fs;
use std::path::Path;

use anyhow::{Context, ensure};
use serde::Deserialize;
use tile_selector::{
    DataSource, ExcludedTilesDataSource, MapCamera, QuadTreeTilingScheme, SelectionOptions,
    TileKey, TilingScheme, ZoomLimitedDataSource,
};

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemeKind {
    #[default]
    WebMercator,
    Geographic,
    Spherical,
}

impl SchemeKind {
    pub fn build(self) -> QuadTreeTilingScheme {
        match self {
            SchemeKind::WebMercator => QuadTreeTilingScheme::web_mercator(),
            SchemeKind::Geographic => QuadTreeTilingScheme::geographic(),
            SchemeKind::Spherical => QuadTreeTilingScheme::spherical(),
        }
    }
}

/// One data source and the zoom level it renders at
#[derive(Clone, Debug, Deserialize)]
pub struct Layer {
    pub name: String,
    pub zoom_level: u32,
    pub max_level: u32,
    #[serde(default)]
    pub excluded: Vec<TileKey>,
}

impl Layer {
    pub fn data_source(&self) -> Box<dyn DataSource> {
        let source = ZoomLimitedDataSource::new(self.max_level);
        if self.excluded.is_empty() {
            Box::new(source)
        } else {
            Box::new(ExcludedTilesDataSource::new(source, self.excluded.iter().copied()))
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Scene {
    pub camera: MapCamera,
    #[serde(default)]
    pub options: SelectionOptions,
    #[serde(default)]
    pub tiling_scheme: SchemeKind,
    pub layers: Vec<Layer>,
}

impl Scene {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read scene {}", path.display()))?;
        let scene: Scene = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse scene {}", path.display()))?;
        scene.validate()?;
        Ok(scene)
    }

    fn validate(&self) -> anyhow::Result<()> {
        self.options.validate()?;
        ensure!(!self.layers.is_empty(), "scene has no layers");
        ensure!(
            self.camera.viewport_height > 0 && self.camera.viewport_width > 0,
            "camera viewport must not be empty"
        );
        ensure!(
            self.camera.projection == self.tiling_scheme.build().projection(),
            "camera projection {:?} does not match tiling scheme {:?}",
            self.camera.projection,
            self.tiling_scheme
        );
        Ok(())
    }
}
