//! Cylinder jobs: projection and segmentation

use bildhatch_camtools::{HatchDistance, HatchError, HatchOutcome, HatchParameters, ImageHatcher};
use bildhatch_core::{CancellationToken, HatchData, HatchMode, HatchPattern, MoveType};
use image::RgbImage;
use std::sync::Arc;

fn params(hatch_mode: HatchMode, radius: f64) -> HatchParameters {
    HatchParameters {
        pattern: HatchPattern::FixedMeander,
        angle_deg: 0.0,
        distance: HatchDistance::Fixed { um: 500.0 },
        hatch_mode,
        cylinder_radius_mm: radius,
        step_mm: 0.05,
        pixel_per_mm: 5.0,
        seed: Some(2),
        ..HatchParameters::default()
    }
}

fn run(width: u32, params: HatchParameters) -> Result<HatchData, HatchError> {
    let img = Arc::new(RgbImage::from_pixel(width, 20, image::Rgb([0, 0, 0])));
    match ImageHatcher::new(img, params)?.hatch(&CancellationToken::new())? {
        HatchOutcome::Finished(data) => Ok(data),
        HatchOutcome::Cancelled => panic!("nothing cancelled this run"),
    }
}

#[test]
fn test_points_stay_on_cylinder_surface() {
    let radius = 30.0;
    for mode in [HatchMode::CylEquidistRad, HatchMode::CylEquidistX] {
        let data = run(40, params(mode, radius)).unwrap();
        assert_eq!(data.clusters.len(), 1);
        assert!(data.hatch_type.ends_with(&format!("and {mode}")));
        for p in data.collections().flat_map(|c| c.points()) {
            let r = p.x.hypot(p.z + radius);
            assert!((r - radius).abs() < 1e-9, "{mode}: r = {r}");
        }
    }
}

#[test]
fn test_two_point_strokes_are_resampled() {
    let data = run(40, params(HatchMode::CylEquidistRad, 30.0)).unwrap();
    // 8 mm straight rows become curves with ~0.1 mm nodes
    for line in data.collections().flat_map(|c| c.polylines.iter()) {
        assert!(line.len() > 50);
    }
}

#[test]
fn test_strokes_close_where_image_leaves_the_surface() {
    // 8 mm image on R = 2 mm: the outer columns lie beyond the cylinder's
    // silhouette, so every row is cut at x = ±R
    let radius = 2.0;
    let data = run(40, params(HatchMode::CylEquidistX, radius)).unwrap();
    assert_eq!(data.clusters.len(), 1);

    let mut rows = Vec::new();
    for line in data.collections().flat_map(|c| c.polylines.iter()) {
        assert_eq!(line[0].move_type, MoveType::Jump);
        assert_eq!(line[line.len() - 1].move_type, MoveType::Draw);
        for p in line {
            assert!(p.x.abs() <= radius + 1e-9, "x = {}", p.x);
            // never wraps onto the back half
            assert!(p.z >= -radius - 1e-9, "z = {}", p.z);
        }
        let chord = (line[0].x - line[line.len() - 1].x).abs();
        assert!(chord > 1.9 * radius, "chord {chord}");
        rows.push((line[0].y * 1000.0).round() as i64);
    }

    // one stroke per scan row
    assert!(!rows.is_empty());
    let count = rows.len();
    rows.sort_unstable();
    rows.dedup();
    assert_eq!(rows.len(), count);
}

#[test]
fn test_wide_image_is_segmented() {
    // 200 mm on R = 34: 337° against a 120° segment limit
    let data = run(1000, params(HatchMode::CylEquidistRad, 34.0)).unwrap();
    assert_eq!(data.clusters.len(), 3);
    let rotations: Vec<f64> = data.clusters.iter().map(|c| c.ref_position.rotation).collect();
    assert!(rotations[0] > 0.0);
    // the middle strip is centered up to half a pixel
    assert!(rotations[1].abs() < 1.0);
    assert!(rotations[2] < 0.0);
}

#[test]
fn test_wrap_beyond_full_turn_fails_before_hatching() {
    let err = run(1100, params(HatchMode::CylEquidistX, 34.0)).unwrap_err();
    assert!(matches!(err, HatchError::CylinderWrapExceeded { .. }));
}
