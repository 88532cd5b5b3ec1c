//! End-to-end selection scenarios

use std::collections::HashSet;

use tile_selector::{
    DataSource, FnDataSource, FrustumIntersection, GeoBox, MapCamera, Projection,
    QuadTreeTilingScheme, SelectionOptions, TileKey, TileSelection, TilingScheme,
    ZoomLimitedDataSource,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn frustum_for(options: SelectionOptions, camera: &MapCamera) -> FrustumIntersection {
    let mut frustum = FrustumIntersection::new(options);
    frustum.update_frustum(camera, None);
    frustum
}

fn no_wrap() -> SelectionOptions {
    SelectionOptions {
        tile_wrapping_enabled: false,
        ..SelectionOptions::default()
    }
}

fn keys_at(selection: &TileSelection, zoom: u32) -> HashSet<(TileKey, i32)> {
    selection
        .entries(zoom)
        .expect("zoom level requested")
        .values()
        .map(|e| (e.tile_key, e.offset))
        .collect()
}

#[test]
fn test_full_globe_selects_every_level_two_tile() {
    init_logging();
    let camera = MapCamera::new(Projection::Mercator, 0.0, 0.0, 1e8, 512, 512);
    let mut frustum = frustum_for(no_wrap(), &camera);
    frustum.set_world_box(Some(GeoBox::new(-180.0, -90.0, 180.0, 90.0)));

    let up_to_two = FnDataSource(|_: u32, key: &TileKey| key.level < 2);
    let selection = frustum.compute(
        &QuadTreeTilingScheme::web_mercator(),
        None,
        &[2],
        &[&up_to_two],
    );

    let expected: HashSet<_> = (0..4)
        .flat_map(|row| (0..4).map(move |column| (TileKey::new(2, row, column), 0)))
        .collect();
    assert_eq!(keys_at(&selection, 2), expected);
    assert!(selection.calculation_final);
}

#[test]
fn test_degenerate_world_box_yields_empty_maps() {
    init_logging();
    let camera = MapCamera::new(Projection::Mercator, 0.0, 0.0, 1e6, 512, 512);
    let mut frustum = frustum_for(SelectionOptions::default(), &camera);
    frustum.set_world_box(Some(GeoBox::zero()));

    let source = ZoomLimitedDataSource::new(10);
    let selection = frustum.compute(
        &QuadTreeTilingScheme::web_mercator(),
        None,
        &[3, 7],
        &[&source, &source],
    );

    assert_eq!(selection.tile_key_entries.len(), 2);
    assert!(selection.entries(3).unwrap().is_empty());
    assert!(selection.entries(7).unwrap().is_empty());
    assert!(selection.calculation_final);
}

#[test]
fn test_compute_is_deterministic() {
    init_logging();
    let camera = MapCamera::new(Projection::Mercator, 170.0, 20.0, 3_000_000.0, 1024, 768)
        .with_tilt(40.0)
        .with_heading(80.0);
    let frustum = frustum_for(SelectionOptions::default(), &camera);
    let scheme = QuadTreeTilingScheme::web_mercator();
    let imagery = ZoomLimitedDataSource::new(6);
    let labels = ZoomLimitedDataSource::new(4);
    let sources: [&dyn DataSource; 2] = [&imagery, &labels];

    let first = frustum.compute(&scheme, None, &[6, 4], &sources);
    let second = frustum.compute(&scheme, None, &[6, 4], &sources);

    for zoom in [4, 6] {
        let a = first.entries(zoom).unwrap();
        let b = second.entries(zoom).unwrap();
        assert_eq!(a.len(), b.len());
        for (key, entry) in a {
            assert_eq!(b.get(key).map(|e| e.as_ref()), Some(entry.as_ref()));
        }
    }
}

#[test]
fn test_wrapped_view_selects_both_world_copies() {
    init_logging();
    let camera = MapCamera::new(Projection::Mercator, 179.0, 0.0, 5_000_000.0, 800, 600);
    let frustum = frustum_for(SelectionOptions::default(), &camera);
    let scheme = QuadTreeTilingScheme::web_mercator();
    let source = ZoomLimitedDataSource::new(5);
    let selection = frustum.compute(&scheme, None, &[5], &[&source]);

    let world_box = frustum.world_box().unwrap();
    assert!(world_box.east > 180.0);

    let offsets: HashSet<i32> = keys_at(&selection, 5).iter().map(|(_, o)| *o).collect();
    assert!(offsets.contains(&0));
    assert!(offsets.contains(&1));

    for (key, offset) in keys_at(&selection, 5) {
        assert!(scheme.geo_box(&key).shifted(offset).intersects(&world_box));
    }
}

#[test]
fn test_partition_holds_for_mixed_sources() {
    init_logging();
    let camera = MapCamera::new(Projection::Mercator, -30.0, 10.0, 8_000_000.0, 800, 600)
        .with_tilt(55.0);
    let options = SelectionOptions {
        mixed_lod: true,
        ..SelectionOptions::default()
    };
    let frustum = frustum_for(options, &camera);
    let deep = ZoomLimitedDataSource::new(9);
    let shallow = ZoomLimitedDataSource::new(3);
    let selection = frustum.compute(
        &QuadTreeTilingScheme::web_mercator(),
        None,
        &[9, 3],
        &[&deep, &shallow],
    );

    for map in selection.tile_key_entries.values() {
        for a in map.values() {
            for b in map.values() {
                assert!(!(a.offset == b.offset && a.tile_key.is_ancestor_of(&b.tile_key)));
            }
        }
    }
    assert!(selection.entries(3).unwrap().values().all(|e| e.tile_key.level <= 3));
}
