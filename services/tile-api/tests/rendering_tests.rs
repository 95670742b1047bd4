//! End-to-end render pipeline tests, decoding the PNG output.

use point_store::{IndexConfig, IndexKind, Point, PointStore};
use renderer::ColorRamp;
use test_utils::{bbox, clustered_points, uniform_points};
use tile_api::rendering::render_tile;
use tile_common::TileCoord;

fn store_of(raw: &[(f64, f64)], kind: IndexKind) -> PointStore {
    PointStore::build(
        raw.iter().map(|&(x, y)| Point::new(x, y)),
        kind,
        &IndexConfig::default(),
    )
}

fn decode(png: &[u8]) -> image::RgbaImage {
    image::load_from_memory_with_format(png, image::ImageFormat::Png)
        .expect("decodable PNG")
        .to_rgba8()
}

#[test]
fn test_render_is_deterministic() {
    let raw = clustered_points(50_000, &[(-8_235_000.0, 4_970_000.0)], 50_000.0, 17);
    let store = store_of(&raw, IndexKind::Grid);
    let ramp = ColorRamp::density();

    for coord in [TileCoord::new(0, 0, 0), TileCoord::new(8, 75, 96), TileCoord::new(11, 602, 770)] {
        let a = render_tile(&store, &coord, &ramp).unwrap();
        let b = render_tile(&store, &coord, &ramp).unwrap();
        assert_eq!(a, b, "tile {}", coord);
    }
}

#[test]
fn test_index_kinds_render_identical_tiles() {
    let raw = clustered_points(30_000, &[(-8_235_000.0, 4_970_000.0)], 80_000.0, 4);
    let ramp = ColorRamp::density();
    let grid = store_of(&raw, IndexKind::Grid);
    let rtree = store_of(&raw, IndexKind::RTree);
    let scan = store_of(&raw, IndexKind::Scan);

    for coord in [TileCoord::new(3, 2, 3), TileCoord::new(9, 150, 192), TileCoord::new(12, 1205, 1540)] {
        let expected = render_tile(&scan, &coord, &ramp).unwrap();
        assert_eq!(render_tile(&grid, &coord, &ramp).unwrap(), expected, "grid {}", coord);
        assert_eq!(render_tile(&rtree, &coord, &ramp).unwrap(), expected, "rtree {}", coord);
    }
}

#[test]
fn test_world_tile_with_points_near_origin() {
    let store = store_of(&[(-100.0, -100.0), (0.0, 0.0), (100.0, 100.0)], IndexKind::Grid);
    let ramp = ColorRamp::density();

    let png = render_tile(&store, &TileCoord::new(0, 0, 0), &ramp).unwrap();
    let img = decode(&png);
    assert_eq!(img.dimensions(), (256, 256));

    let mut opaque = 0;
    for (x, y, px) in img.enumerate_pixels() {
        if px.0[3] > 0 {
            opaque += 1;
            assert!((127..=128).contains(&x) && (127..=128).contains(&y), "pixel at {},{}", x, y);
            assert_eq!(px.0, [255, 255, 0, 255]);
        }
    }
    assert!(opaque >= 1);

    let empty = store_of(&[], IndexKind::Grid);
    let baseline = render_tile(&empty, &TileCoord::new(0, 0, 0), &ramp).unwrap();
    assert_ne!(png, baseline);
}

#[test]
fn test_empty_tiles_are_transparent_and_identical() {
    let raw = uniform_points(10_000, bbox::ORIGIN_KM, 2);
    let store = store_of(&raw, IndexKind::Grid);
    let ramp = ColorRamp::density();

    // Far from the data near the origin.
    let a = render_tile(&store, &TileCoord::new(10, 100, 100), &ramp).unwrap();
    let b = render_tile(&store, &TileCoord::new(10, 900, 40), &ramp).unwrap();

    assert_eq!(a, b);
    assert!(decode(&a).pixels().all(|p| p.0[3] == 0));
}

#[test]
fn test_out_of_range_tile_renders_transparent() {
    let raw = uniform_points(1_000, bbox::WORLD, 9);
    let store = store_of(&raw, IndexKind::Grid);
    let ramp = ColorRamp::density();

    for coord in [TileCoord::new(2, 9, 1), TileCoord::new(2, 1, 9), TileCoord::new(3, u32::MAX, u32::MAX)] {
        let png = render_tile(&store, &coord, &ramp).unwrap();
        assert!(decode(&png).pixels().all(|p| p.0[3] == 0), "tile {}", coord);
    }
}

#[test]
fn test_dense_tile_uses_full_ramp() {
    let raw = clustered_points(100_000, &[(0.0, 0.0)], 2_000_000.0, 23);
    let store = store_of(&raw, IndexKind::Grid);
    let img = decode(&render_tile(&store, &TileCoord::new(2, 1, 1), &ColorRamp::density()).unwrap());

    let has = |rgba: [u8; 4]| img.pixels().any(|p| p.0 == rgba);
    assert!(has([0, 0, 255, 255]), "lowest count should be blue");
    assert!(has([255, 0, 0, 255]), "highest count should be red");
}
