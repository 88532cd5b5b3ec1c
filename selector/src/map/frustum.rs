//! View-dependent tile selection
//!
//! [`FrustumIntersection`] keeps the view state of the last camera update
//! and, on [`FrustumIntersection::compute`], walks the tile tree from the
//! seeded roots to find the visible tiles for every requested zoom level.

use std::collections::BTreeMap;
use std::sync::Arc;

use glam::DMat4;

use crate::config::SelectionOptions;

use super::camera::MapCamera;
use super::data_source::DataSource;
use super::elevation::{CalculationStatus, ElevationRangeSource};
use super::entry::TileEntry;
use super::geo::{GEO_BOX_EPSILON, GeoBox};
use super::intersection::{GeoBoxIntersection, ObbIntersection, TileIntersection};
use super::projection::Projection;
use super::scheme::TilingScheme;
use super::selection::{TileSelection, TraversalStats, ZoomLevelTileMap};
use super::tile::{MAX_TILE_LEVEL, MAX_WRAP_OFFSET, TileKey};
use super::volume::TileVolume;

/// Tile selection engine.
///
/// Holds the view captured by [`update_frustum`](Self::update_frustum)
/// (view-projection matrix, visible world box, seeded roots) and runs the
/// quadtree traversal in [`compute`](Self::compute).
pub struct FrustumIntersection {
    options: SelectionOptions,
    projection: Projection,
    viewport_height: u32,
    view_projection: DMat4,
    world_box: Option<GeoBox>,
    root_tile_entries: Vec<Arc<TileEntry>>,
}

impl FrustumIntersection {
    pub fn new(options: SelectionOptions) -> Self {
        Self {
            options,
            projection: Projection::default(),
            viewport_height: 0,
            view_projection: DMat4::IDENTITY,
            world_box: None,
            root_tile_entries: Vec::new(),
        }
    }

    pub fn view_projection(&self) -> DMat4 {
        self.view_projection
    }

    /// Visible world region captured by the last update
    pub fn world_box(&self) -> Option<GeoBox> {
        self.world_box
    }

    /// Replace the visible world region until the next frustum update
    pub fn set_world_box(&mut self, world_box: Option<GeoBox>) {
        self.world_box = world_box;
    }

    pub fn root_tile_entries(&self) -> &[Arc<TileEntry>] {
        &self.root_tile_entries
    }

    fn wrapping_active(&self, projection: Projection) -> bool {
        self.options.tile_wrapping_enabled && projection.wraps_horizontally()
    }

    /// Capture the camera's view for the next [`compute`](Self::compute) and
    /// reseed the root tiles.
    pub fn update_frustum(&mut self, camera: &MapCamera, projection_override: Option<DMat4>) {
        let projection_matrix = projection_override.unwrap_or_else(|| camera.projection_matrix());
        self.view_projection = projection_matrix * camera.view_matrix();
        self.projection = camera.projection;
        self.viewport_height = camera.viewport_height;

        let wrapping = self.wrapping_active(camera.projection);
        self.world_box = camera
            .visible_world_box_for(&self.view_projection)
            .map(|mut world_box| {
                if !wrapping {
                    world_box.west = world_box.west.max(-180.0);
                    world_box.east = world_box.east.min(180.0);
                }
                world_box
            });

        self.root_tile_entries = self
            .compute_roots(camera)
            .into_iter()
            .map(Arc::new)
            .collect();
        log::debug!(
            "frustum updated: world box {:?}, {} root tiles",
            self.world_box,
            self.root_tile_entries.len()
        );
    }

    /// Level-0 entries to start the traversal from, one per world copy the
    /// view can reach.
    ///
    /// Copies follow the captured world box; without one they follow the
    /// camera's ground footprint. Offsets never exceed `max_wrap_offset` nor
    /// what a [`TileOffsetKey`](super::tile::TileOffsetKey) can encode.
    pub fn compute_roots(&self, camera: &MapCamera) -> Vec<TileEntry> {
        let root = TileKey::root();
        if !self.wrapping_active(camera.projection) {
            return vec![TileEntry::root(root, 0)];
        }

        // Copy `o` covers longitudes [360 * o - 180, 360 * o + 180)
        let (west, east) = match self.world_box {
            Some(world_box) => (world_box.west, world_box.east - GEO_BOX_EPSILON),
            None => {
                let degrees_per_unit = 360.0 / camera.projection.world_width();
                let nadir = camera.position().x * degrees_per_unit;
                let reach = camera.ground_footprint_radius() * degrees_per_unit;
                (nadir - reach, nadir + reach)
            }
        };

        let limit = self.options.max_wrap_offset.clamp(0, MAX_WRAP_OFFSET);
        if limit != self.options.max_wrap_offset {
            log::warn!(
                "max_wrap_offset {} outside 0..={}, using {}",
                self.options.max_wrap_offset,
                MAX_WRAP_OFFSET,
                limit
            );
        }
        let copy_of = |longitude: f64| {
            (((longitude + 180.0) / 360.0).floor() as i32).clamp(-limit, limit)
        };

        let first = copy_of(west);
        (first..=copy_of(east).max(first))
            .map(|offset| TileEntry::root(root, offset))
            .collect()
    }

    /// Select the visible tiles for every zoom level.
    ///
    /// `zoom_levels[i]` is paired with `data_sources[i]`. A tile is split when
    /// any source asks for it at its paired zoom level.
    pub fn compute(
        &self,
        tiling_scheme: &dyn TilingScheme,
        elevation_range_source: Option<&dyn ElevationRangeSource>,
        zoom_levels: &[u32],
        data_sources: &[&dyn DataSource],
    ) -> TileSelection {
        debug_assert_eq!(
            zoom_levels.len(),
            data_sources.len(),
            "every zoom level needs a data source"
        );

        let Some(world_box) = self.world_box.filter(|b| !b.is_degenerate()) else {
            log::debug!("no visible world region, selection is empty");
            return TileSelection {
                tile_key_entries: zoom_levels
                    .iter()
                    .map(|&zoom| (zoom, ZoomLevelTileMap::new()))
                    .collect(),
                calculation_final: true,
            };
        };

        let elevation = elevation_range_source.filter(|source| {
            let matches = source.tiling_scheme().name() == tiling_scheme.name();
            if !matches {
                log::warn!(
                    "elevation source uses tiling scheme {}, expected {}; ignoring it",
                    source.tiling_scheme().name(),
                    tiling_scheme.name()
                );
            }
            matches
        });
        let elevation_mismatched = elevation_range_source.is_some() && elevation.is_none();
        let intersection: Box<dyn TileIntersection> =
            if self.projection.is_spherical() || elevation.is_some() {
                Box::new(ObbIntersection::new(&self.view_projection))
            } else {
                Box::new(GeoBoxIntersection::new(world_box))
            };

        let mut context = TraversalContext::new(
            self,
            tiling_scheme,
            elevation,
            intersection,
            zoom_levels,
            data_sources,
        );
        // Without usable elevation the 2D prune is only an approximation
        if elevation_mismatched {
            context.calculation_final = false;
        }
        context.seed(&self.root_tile_entries);
        context.run();
        context.finish()
    }
}

/// State owned by one `compute` call
struct TraversalContext<'a> {
    frustum: &'a FrustumIntersection,
    tiling_scheme: &'a dyn TilingScheme,
    elevation: Option<&'a dyn ElevationRangeSource>,
    intersection: Box<dyn TileIntersection>,
    zoom_levels: &'a [u32],
    data_sources: &'a [&'a dyn DataSource],
    target_tile_area: f64,
    maps: BTreeMap<u32, ZoomLevelTileMap>,
    stack: Vec<Arc<TileEntry>>,
    calculation_final: bool,
    stats: TraversalStats,
}

impl<'a> TraversalContext<'a> {
    fn new(
        frustum: &'a FrustumIntersection,
        tiling_scheme: &'a dyn TilingScheme,
        elevation: Option<&'a dyn ElevationRangeSource>,
        intersection: Box<dyn TileIntersection>,
        zoom_levels: &'a [u32],
        data_sources: &'a [&'a dyn DataSource],
    ) -> Self {
        Self {
            frustum,
            tiling_scheme,
            elevation,
            intersection,
            zoom_levels,
            data_sources,
            target_tile_area: frustum.options.target_tile_area(frustum.viewport_height),
            maps: zoom_levels
                .iter()
                .map(|&zoom| (zoom, ZoomLevelTileMap::new()))
                .collect(),
            stack: Vec::new(),
            calculation_final: true,
            stats: TraversalStats::default(),
        }
    }

    fn seed(&mut self, roots: &[Arc<TileEntry>]) {
        for root in roots {
            let key = root.offset_key();
            for map in self.maps.values_mut() {
                map.insert(key, Arc::clone(root));
            }
            self.stack.push(Arc::clone(root));
        }
    }

    fn run(&mut self) {
        while let Some(entry) = self.stack.pop() {
            self.visit(&entry);
        }
    }

    fn visit(&mut self, entry: &TileEntry) {
        self.stats.visited += 1;

        let requested = self
            .zoom_levels
            .iter()
            .zip(self.data_sources)
            .any(|(&zoom, source)| source.should_subdivide(zoom, &entry.tile_key));
        if !requested {
            return;
        }
        if entry.tile_key.level >= MAX_TILE_LEVEL {
            log::warn!(
                "{} @ {}: subdivision requested past level {}",
                entry.tile_key,
                entry.offset,
                MAX_TILE_LEVEL
            );
            self.stats.lod_stopped += 1;
            return;
        }
        if self.frustum.options.mixed_lod && entry.area < self.target_tile_area {
            log::trace!("{} @ {}: area {} below target", entry.tile_key, entry.offset, entry.area);
            self.stats.lod_stopped += 1;
            return;
        }
        self.stats.subdivided += 1;

        // Finer children replace this tile wherever the zoom level asks for more detail
        let key = entry.offset_key();
        for (&zoom, map) in self.maps.iter_mut() {
            if entry.tile_key.level < zoom {
                map.remove(&key);
            }
        }

        for child_key in self.tiling_scheme.sub_tile_keys(&entry.tile_key) {
            let Some(child) = self.make_child(child_key, entry.offset) else {
                self.stats.pruned += 1;
                continue;
            };
            let child_offset_key = child.offset_key();
            for (&zoom, map) in self.maps.iter_mut() {
                if zoom >= child_key.level {
                    map.insert(child_offset_key, Arc::clone(&child));
                }
            }
            self.stack.push(child);
        }
    }

    /// Entry for a visible child, `None` when the child is culled
    fn make_child(&mut self, tile_key: TileKey, offset: i32) -> Option<Arc<TileEntry>> {
        let mut geo_box = self.tiling_scheme.geo_box(&tile_key).shifted(offset);
        if let Some(source) = self.elevation {
            match source.elevation_range(&tile_key) {
                Some(range) => {
                    geo_box = geo_box.with_altitude_range(range.min, range.max);
                    if range.status == CalculationStatus::Approximate {
                        self.calculation_final = false;
                    }
                }
                None => self.calculation_final = false,
            }
        }

        let volume = TileVolume::from_geo_box(self.frustum.projection, &geo_box);
        if !self.intersection.intersects(&geo_box, &volume) {
            log::trace!("{} @ {}: outside view", tile_key, offset);
            return None;
        }

        let (area, distance) = volume.screen_metrics(&self.frustum.view_projection);
        Some(Arc::new(TileEntry::new(
            tile_key,
            offset,
            area,
            distance,
            geo_box.min_altitude,
            geo_box.max_altitude,
        )))
    }

    fn finish(self) -> TileSelection {
        log::debug!(
            "selected tiles for zoom levels {:?}: {:?}, final: {}",
            self.maps.keys().collect::<Vec<_>>(),
            self.stats,
            self.calculation_final
        );
        TileSelection {
            tile_key_entries: self.maps,
            calculation_final: self.calculation_final,
        }
    }
}
