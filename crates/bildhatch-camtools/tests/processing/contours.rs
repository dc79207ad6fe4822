//! DXF import and traced outlines

use bildhatch_camtools::{contours_from_dxf, contours_from_pixels, HatchError};
use bildhatch_core::{MoveType, Rgb};
use dxf::entities::{Arc, Circle, Entity, EntityType, Line};
use dxf::{Drawing, Point};
use std::fs::File;

fn write_drawing(drawing: &Drawing) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let mut file = File::create(dir.path().join("part.dxf")).unwrap();
    drawing.save(&mut file).unwrap();
    dir
}

#[test]
fn test_dxf_entities_are_shifted_to_origin() {
    let mut drawing = Drawing::new();
    drawing.add_entity(Entity::new(EntityType::Line(Line::new(
        Point::new(2.0, 3.0, 0.0),
        Point::new(12.0, 3.0, 0.0),
    ))));
    drawing.add_entity(Entity::new(EntityType::Circle(Circle::new(
        Point::new(7.0, 8.0, 0.0),
        2.0,
    ))));
    drawing.add_entity(Entity::new(EntityType::Arc(Arc::new(
        Point::new(7.0, 8.0, 0.0),
        2.0,
        0.0,
        180.0,
    ))));
    let dir = write_drawing(&drawing);

    let data = contours_from_dxf(dir.path().join("part.dxf")).unwrap();
    assert_eq!(data.hatch_type, "DXF_Imported");
    assert_eq!(data.clusters.len(), 1);

    let lines = &data.clusters[0].data[0].polylines;
    let counts: Vec<usize> = lines.iter().map(|l| l.len()).collect();
    assert_eq!(counts, vec![2, 101, 51]);

    let line = &lines[0];
    assert!((line[0].x).abs() < 1e-9 && (line[0].y).abs() < 1e-9);
    assert!((line[1].x - 10.0).abs() < 1e-9);

    let circle = &lines[1];
    assert!((circle[0].x - 7.0).abs() < 1e-9 && (circle[0].y - 5.0).abs() < 1e-9);
    assert_eq!(circle[0].position(), circle[100].position());

    for line in lines {
        assert_eq!(line[0].move_type, MoveType::Jump);
        assert!(line[1..].iter().all(|p| p.move_type == MoveType::Draw));
        assert!(line.iter().all(|p| p.color == Rgb::BLACK));
    }
}

#[test]
fn test_dxf_without_geometry_is_rejected() {
    let dir = write_drawing(&Drawing::new());
    let err = contours_from_dxf(dir.path().join("part.dxf")).unwrap_err();
    assert!(matches!(err, HatchError::NoHatchProduced(_)));
}

#[test]
fn test_missing_dxf_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = contours_from_dxf(dir.path().join("missing.dxf")).unwrap_err();
    assert!(matches!(err, HatchError::Io(_)));
}

#[test]
fn test_traced_outline_is_closed() {
    let triangle = vec![(0, 9), (9, 9), (0, 0)];
    let data = contours_from_pixels(&[triangle], 10, 10, 10.0);
    let line = &data.clusters[0].data[0].polylines[0];
    assert_eq!(line.len(), 4);
    assert_eq!(line[0].position(), line[3].position());
    // bottom-left pixel of a 10x10 image
    assert_eq!((line[0].x, line[0].y), (-0.5, -0.5));
}
