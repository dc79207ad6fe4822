//! End-to-end hatching of small synthetic images

use bildhatch_camtools::{HatchDistance, HatchError, HatchOutcome, HatchParameters, ImageHatcher};
use bildhatch_core::{CancellationToken, HatchData, HatchPattern, MoveType, Rgb};
use image::RgbImage;
use std::sync::Arc;

const RED: Rgb = Rgb::new(255, 0, 0);

fn params() -> HatchParameters {
    HatchParameters {
        pattern: HatchPattern::FixedMeander,
        angle_deg: 0.0,
        distance: HatchDistance::Fixed { um: 1000.0 },
        step_mm: 0.1,
        white_threshold: 254.0,
        pixel_per_mm: 1.0,
        seed: Some(11),
        ..HatchParameters::default()
    }
}

fn run(img: RgbImage, params: HatchParameters) -> Result<HatchData, HatchError> {
    let hatcher = ImageHatcher::new(Arc::new(img), params)?;
    match hatcher.hatch(&CancellationToken::new())? {
        HatchOutcome::Finished(data) => Ok(data),
        HatchOutcome::Cancelled => panic!("nothing cancelled this run"),
    }
}

#[test]
fn test_red_corner_on_white() {
    let mut img = RgbImage::from_pixel(4, 4, image::Rgb([255, 255, 255]));
    for x in 0..2 {
        for y in 0..2 {
            img.put_pixel(x, y, image::Rgb(RED.channels()));
        }
    }

    let data = run(img, params()).unwrap();
    assert_eq!(data.clusters.len(), 1);
    assert_eq!(data.collection_count(), 1);

    let collection = &data.clusters[0].data[0];
    assert_eq!(collection.color, RED);
    assert_eq!(collection.polylines.len(), 2);
    for line in &collection.polylines {
        assert_eq!(line.len(), 2);
        assert!(((line[1].x - line[0].x).abs() - 2.0).abs() < 0.2);
        assert_eq!(line[0].y, line[1].y);
        // the red block is the top half of the image
        assert!(line[0].y > 0.0);
    }
}

#[test]
fn test_white_threshold_boundary() {
    let gray = || RgbImage::from_pixel(6, 6, image::Rgb([128, 128, 128]));

    let err = run(
        gray(),
        HatchParameters {
            white_threshold: 127.0,
            ..params()
        },
    )
    .unwrap_err();
    assert!(matches!(err, HatchError::NoHatchProduced(_)));

    let data = run(
        gray(),
        HatchParameters {
            white_threshold: 128.0,
            ..params()
        },
    )
    .unwrap();
    assert_eq!(data.collection_count(), 1);
}

#[test]
fn test_collections_follow_color_order() {
    let mut img = RgbImage::from_pixel(8, 8, image::Rgb([0, 0, 0]));
    for x in 0..8 {
        img.put_pixel(x, 0, image::Rgb([200, 10, 10]));
        img.put_pixel(x, 7, image::Rgb([60, 60, 60]));
    }
    let data = run(img, params()).unwrap();
    let colors: Vec<Rgb> = data.collections().map(|c| c.color).collect();
    assert_eq!(
        colors,
        vec![Rgb::new(200, 10, 10), Rgb::new(60, 60, 60), Rgb::BLACK]
    );
    assert_eq!(data.hatch_type, "Image: FixedMeander with Fixed Lines");
}

#[test]
fn test_meander_rows_alternate() {
    let img = RgbImage::from_pixel(10, 10, image::Rgb([0, 0, 0]));
    let data = run(img, params()).unwrap();
    let lines = &data.clusters[0].data[0].polylines;
    assert_eq!(lines.len(), 10);
    for pair in lines.windows(2) {
        let forward = |l: &Vec<bildhatch_core::Point>| l[0].x < l[l.len() - 1].x;
        assert_ne!(forward(&pair[0]), forward(&pair[1]));
        assert_eq!(pair[1][0].move_type, MoveType::Jump);
    }
}
