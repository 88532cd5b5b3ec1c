//! Tile selection options

use anyhow::{Context, ensure};
use serde::{Deserialize, Serialize};

use crate::map::camera::TILE_SIZE;
use crate::map::tile::MAX_WRAP_OFFSET;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionOptions {
    /// Seed extra world copies on horizontally wrapping projections
    pub tile_wrapping_enabled: bool,

    /// Stop splitting tiles whose screen area is already below the target
    pub mixed_lod: bool,

    /// Desired on-screen tile footprint in pixels
    pub desired_tile_pixel_size: f64,

    /// Most world copies seeded on each side of the central one
    pub max_wrap_offset: i32,
}

impl Default for SelectionOptions {
    fn default() -> Self {
        Self {
            tile_wrapping_enabled: true,
            mixed_lod: false,
            desired_tile_pixel_size: TILE_SIZE,
            max_wrap_offset: 2,
        }
    }
}

impl SelectionOptions {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let options: SelectionOptions =
            serde_json::from_str(json).context("invalid selection options")?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.desired_tile_pixel_size.is_finite() && self.desired_tile_pixel_size > 0.0,
            "desired_tile_pixel_size must be positive, got {}",
            self.desired_tile_pixel_size
        );
        ensure!(
            (0..=MAX_WRAP_OFFSET).contains(&self.max_wrap_offset),
            "max_wrap_offset must be within 0..={}, got {}",
            MAX_WRAP_OFFSET,
            self.max_wrap_offset
        );
        Ok(())
    }

    /// Screen-space area a tile should cover at the given viewport height
    pub fn target_tile_area(&self, viewport_height: u32) -> f64 {
        assert!(viewport_height > 0, "viewport height must be positive");
        let ratio = self.desired_tile_pixel_size / viewport_height as f64;
        ratio * ratio
    }
}
