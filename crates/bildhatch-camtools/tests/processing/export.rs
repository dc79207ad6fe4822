//! Session flow from a worker job to exported point files

use bildhatch_camtools::{
    HatchDistance, HatchParameters, HatchSession, HatchWorker, ImageHatcher, SessionChange,
    SpeedPowerSettings,
};
use bildhatch_core::{HatchPattern, ProcessingSettings};
use image::RgbImage;
use std::fs;
use std::sync::Arc;

#[test]
fn test_hatch_queue_and_export() {
    let img = Arc::new(RgbImage::from_pixel(10, 10, image::Rgb([0, 0, 0])));
    let params = HatchParameters {
        pattern: HatchPattern::Radial,
        distance: HatchDistance::Fixed { um: 1000.0 },
        pixel_per_mm: 1.0,
        seed: Some(6),
        ..HatchParameters::default()
    };
    let worker = HatchWorker::new();
    let outcome = worker
        .start(ImageHatcher::new(img, params).unwrap())
        .unwrap()
        .wait();

    let mut session = HatchSession::new();
    let changes = session.apply_outcome(outcome).unwrap();
    assert!(matches!(
        changes.as_slice(),
        [SessionChange::HatchDataReplaced { .. }]
    ));

    let processing = ProcessingSettings {
        offset: [5.0, 5.0, 0.0],
        iterations: 2,
        ..ProcessingSettings::default()
    };
    session
        .queue_block(&SpeedPowerSettings::default(), processing)
        .unwrap();
    assert_eq!(
        session.blocks()[0].label(),
        "2x Image: Radial with Fixed Lines"
    );

    let dir = tempfile::tempdir().unwrap();
    let paths = session.export(dir.path(), "plate").unwrap();
    assert_eq!(paths.len(), 2);

    let points = fs::read_to_string(&paths[0]).unwrap();
    let live = session.hatch_data().unwrap();
    assert_eq!(points.lines().count(), live.point_count());
    for line in points.lines() {
        let fields: Vec<&str> = line.split(' ').collect();
        assert_eq!(fields.len(), 4);
        // the image spans -5..5 mm around the origin, shifted by 5 mm
        let x: f64 = fields[0].parse().unwrap();
        assert!((-0.5..=10.5).contains(&x));
        assert!(fields[3] == "0" || fields[3] == "1");
    }
    assert!(points.lines().next().unwrap().ends_with(" 1"));

    let index = fs::read_to_string(&paths[1]).unwrap();
    assert_eq!(index, "0 0 0 plate_block-1.txt 1\n");
}

#[test]
fn test_export_of_empty_queue_fails() {
    let dir = tempfile::tempdir().unwrap();
    assert!(HatchSession::new().export(dir.path(), "x").is_err());
}
