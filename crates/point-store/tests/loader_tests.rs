//! Tests for loading the CSV dataset from disk.

use point_store::{load_csv, IndexConfig, IndexKind, PointStore};
use test_utils::{write_points_csv, world_points};
use tile_common::{BoundingBox, TileError};

#[test]
fn test_load_csv_roundtrip_into_store() {
    let raw = world_points(1000, 42);
    let file = write_points_csv(&raw).unwrap();

    let columns = load_csv(file.path()).unwrap();
    assert_eq!(columns.len(), 1000);

    let store = PointStore::build(columns.iter(), IndexKind::Grid, &IndexConfig::default());
    let everything = BoundingBox::new(-2.1e7, -2.1e7, 2.1e7, 2.1e7);
    assert_eq!(store.count_range(&everything), 1000);
}

#[test]
fn test_missing_dataset_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stored.csv");

    match load_csv(&path) {
        Err(TileError::DatasetMissing(p)) => assert!(p.ends_with("stored.csv")),
        other => panic!("expected DatasetMissing, got {:?}", other),
    }
}

#[test]
fn test_malformed_dataset_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.csv");
    std::fs::write(&path, "X,Y\n1,2\n3,not-a-number\n").unwrap();

    match load_csv(&path) {
        Err(TileError::DatasetMalformed(msg)) => assert!(msg.contains("line 3"), "{}", msg),
        other => panic!("expected DatasetMalformed, got {:?}", other),
    }
}
