//! tile-probe: run one tile selection pass for a scene file and report it

mod scene;

use std::path::PathBuf;

use clap::Parser;
use log::{info, warn};
use tile_selector::{DataSource, MapSystem, TileSelection};

use scene::Scene;

#[derive(Debug, Parser)]
#[command(name = "tile-probe", about = "Report the tiles a camera view selects")]
struct Args {
    /// Scene description (JSON)
    scene: PathBuf,

    /// Tiles listed per zoom level, nearest first
    #[arg(long, default_value_t = 16)]
    limit: usize,

    /// Override the scene's mixed-LOD setting
    #[arg(long)]
    mixed_lod: Option<bool>,

    /// Print the selection as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut scene = Scene::load(&args.scene)?;
    if let Some(mixed_lod) = args.mixed_lod {
        scene.options.mixed_lod = mixed_lod;
    }

    let tiling_scheme = scene.tiling_scheme.build();
    let sources: Vec<Box<dyn DataSource>> = scene.layers.iter().map(|l| l.data_source()).collect();
    let source_refs: Vec<&dyn DataSource> = sources.iter().map(|s| s.as_ref()).collect();
    let zoom_levels: Vec<u32> = scene.layers.iter().map(|l| l.zoom_level).collect();

    let mut system = MapSystem::new(scene.camera.clone(), scene.options.clone());
    system.update(&tiling_scheme, None, &zoom_levels, &source_refs);

    let selection = system.selection();
    info!(
        "{} tiles over {} zoom levels, world box {:?}",
        selection.len(),
        selection.tile_key_entries.len(),
        system.frustum().world_box()
    );
    if !selection.calculation_final {
        warn!("selection used approximate data");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report(selection, args.limit))?);
    } else {
        print_text(selection, &scene, args.limit);
    }
    Ok(())
}

fn print_text(selection: &TileSelection, scene: &Scene, limit: usize) {
    for (zoom, map) in &selection.tile_key_entries {
        let layers: Vec<&str> = scene
            .layers
            .iter()
            .filter(|l| l.zoom_level == *zoom)
            .map(|l| l.name.as_str())
            .collect();
        println!("zoom {zoom} [{}]: {} tiles", layers.join(", "), map.len());
        for entry in selection.sorted_by_distance(*zoom).iter().take(limit) {
            println!(
                "  {:<14} offset {:>2}  area {:>10.4}  distance {:.4}",
                entry.tile_key.to_string(),
                entry.offset,
                entry.area,
                entry.distance
            );
        }
    }
}

#[derive(serde::Serialize)]
struct ZoomReport {
    zoom_level: u32,
    tile_count: usize,
    nearest: Vec<TileReport>,
}

#[derive(serde::Serialize)]
struct TileReport {
    tile: tile_selector::TileKey,
    offset: i32,
    area: f64,
    distance: f64,
}

fn report(selection: &TileSelection, limit: usize) -> Vec<ZoomReport> {
    selection
        .tile_key_entries
        .iter()
        .map(|(&zoom_level, map)| ZoomReport {
            zoom_level,
            tile_count: map.len(),
            nearest: selection
                .sorted_by_distance(zoom_level)
                .iter()
                .take(limit)
                .map(|e| TileReport {
                    tile: e.tile_key,
                    offset: e.offset,
                    area: e.area,
                    distance: e.distance,
                })
                .collect(),
        })
        .collect()
}
