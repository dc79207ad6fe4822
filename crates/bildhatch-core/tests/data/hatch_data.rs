use bildhatch_core::{
    reverse_polyline, HatchCluster, HatchData, LineCollection, MoveType, Point, Rgb,
};
use image::RgbImage;
use std::sync::Arc;

fn stroke(x0: f64, x1: f64, color: Rgb) -> Vec<Point> {
    vec![Point::jump(x0, 0.0, color), Point::draw(x1, 0.0, color)]
}

#[test]
fn test_collection_counts() {
    let red = Rgb::new(255, 0, 0);
    let mut collection = LineCollection::new(red);
    collection.polylines.push(stroke(0.0, 1.0, red));
    collection.polylines.push(stroke(2.0, 3.0, red));

    assert_eq!(collection.len(), 2);
    assert_eq!(collection.point_count(), 4);
    assert!(collection.points().all(|p| p.color == red));
    assert!(collection.validate().is_ok());
}

#[test]
fn test_reversed_stroke_is_still_valid() {
    let mut line = stroke(0.0, 5.0, Rgb::BLACK);
    line.insert(1, Point::draw(2.5, 1.0, Rgb::BLACK));
    reverse_polyline(&mut line);

    let collection = LineCollection::with_polylines(Rgb::BLACK, vec![line]);
    assert!(collection.validate().is_ok());
    let first = &collection.polylines[0][0];
    assert_eq!(first.x, 5.0);
    assert_eq!(first.move_type, MoveType::Jump);
}

#[test]
fn test_hatch_data_aggregates_clusters() {
    let matrix = Arc::new(RgbImage::new(4, 3));
    let mut left = HatchCluster::new(Arc::clone(&matrix), (1.5, 1.0));
    left.data
        .push(LineCollection::with_polylines(Rgb::BLACK, vec![stroke(0.0, 1.0, Rgb::BLACK)]));
    let right = HatchCluster::new(matrix, (1.5, 1.0));

    let data = HatchData::new(vec![left, right], "Image: FixedMeander with Fixed Lines");
    assert_eq!(data.clusters[0].dimensions(), (4, 3));
    assert_eq!(data.collection_count(), 1);
    assert_eq!(data.point_count(), 2);
    assert!(!data.is_empty());
}

#[test]
fn test_serialized_cluster_drops_pixels() {
    let cluster = HatchCluster::new(Arc::new(RgbImage::new(2, 2)), (0.5, 0.5));
    let json = serde_json::to_string(&cluster).unwrap();
    let restored: HatchCluster = serde_json::from_str(&json).unwrap();
    assert!(restored.input_matrix.is_none());
    assert_eq!(restored.cluster_center_for_hatch, (0.5, 0.5));
}
