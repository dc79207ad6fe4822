//! Invariants that hold for every pattern and partition

use bildhatch_camtools::partition::{
    image_angle_deg, max_segment_angle_deg, partition_clusters, strip_bounds,
};
use bildhatch_camtools::sampling::round_half_up;
use bildhatch_camtools::{HatchDistance, HatchOutcome, HatchParameters, ImageHatcher};
use bildhatch_core::{
    CancellationToken, HatchData, HatchMode, HatchPattern, MoveType, Point, Rgb,
};
use image::RgbImage;
use proptest::prelude::*;
use std::sync::Arc;

const BANDS: [Rgb; 3] = [Rgb::new(20, 40, 60), Rgb::new(120, 0, 0), Rgb::new(0, 0, 0)];

/// 30x30 image of three horizontal color bands
fn banded() -> RgbImage {
    RgbImage::from_fn(30, 30, |_, y| image::Rgb(BANDS[(y / 10) as usize].channels()))
}

fn hatch(img: &RgbImage, pattern: HatchPattern) -> HatchData {
    let params = HatchParameters {
        pattern,
        angle_deg: 30.0,
        distance: HatchDistance::Fixed { um: 2500.0 },
        step_mm: 0.25,
        pixel_per_mm: 1.0,
        seed: Some(5),
        ..HatchParameters::default()
    };
    let hatcher = ImageHatcher::new(Arc::new(img.clone()), params).unwrap();
    match hatcher.hatch(&CancellationToken::new()).unwrap() {
        HatchOutcome::Finished(data) => data,
        HatchOutcome::Cancelled => panic!("{pattern} was cancelled"),
    }
}

#[test]
fn test_polylines_are_valid_for_every_pattern() {
    let img = banded();
    for pattern in HatchPattern::ALL {
        let data = hatch(&img, pattern);
        assert_eq!(data.collection_count(), 3, "{pattern}");
        for collection in data.collections() {
            for line in &collection.polylines {
                assert!(line.len() >= 2, "{pattern}");
                assert_eq!(line[0].move_type, MoveType::Jump, "{pattern}");
                assert!(
                    line[1..].iter().all(|p| p.move_type == MoveType::Draw),
                    "{pattern}"
                );
                assert!(line.iter().all(|p| p.color == collection.color), "{pattern}");
            }
        }
    }
}

#[test]
fn test_traced_samples_land_on_their_color() {
    let img = banded();
    let (w, h) = img.dimensions();
    let (ox, oy) = ((w as f64 - 1.0) / 2.0, (h as f64 - 1.0) / 2.0);

    for pattern in [HatchPattern::Circular, HatchPattern::Spiral] {
        let data = hatch(&img, pattern);
        for collection in data.collections() {
            for line in &collection.polylines {
                // every point but the boundary point is a matching sample
                for p in &line[..line.len() - 1] {
                    let col = round_half_up(ox + p.x);
                    let row = h as i64 - 1 - round_half_up(oy + p.y);
                    let pixel = img.get_pixel(col as u32, row as u32);
                    assert_eq!(Rgb::from(*pixel), collection.color, "{pattern}");
                }
            }
        }
    }
}

/// Whether the pixel under `p` has `color`, allowing for samples on a pixel edge
fn lands_on(img: &RgbImage, p: &Point, color: Rgb) -> bool {
    const EDGE: [f64; 3] = [0.0, -1e-6, 1e-6];
    let (w, h) = img.dimensions();
    let (ox, oy) = ((w as f64 - 1.0) / 2.0, (h as f64 - 1.0) / 2.0);
    for ex in EDGE {
        for ey in EDGE {
            let col = round_half_up(ox + p.x + ex);
            let row = h as i64 - 1 - round_half_up(oy + p.y + ey);
            if col < 0 || row < 0 || col >= w as i64 || row >= h as i64 {
                continue;
            }
            if Rgb::from(*img.get_pixel(col as u32, row as u32)) == color {
                return true;
            }
        }
    }
    false
}

#[test]
fn test_straight_strokes_start_on_their_color() {
    let img = banded();

    for pattern in [
        HatchPattern::FixedMeander,
        HatchPattern::CrossedMeander,
        HatchPattern::Radial,
    ] {
        let data = hatch(&img, pattern);
        let mut strokes = 0;
        let mut jumps_on_color = 0;
        for collection in data.collections() {
            for line in &collection.polylines {
                // the scan's first sample is the jump, or the far end once reversed
                let first = &line[0];
                let last = &line[line.len() - 1];
                let jump_hits = lands_on(&img, first, collection.color);
                assert!(
                    jump_hits || lands_on(&img, last, collection.color),
                    "{pattern}: stroke ({:.2}, {:.2}) -> ({:.2}, {:.2}) misses {}",
                    first.x,
                    first.y,
                    last.x,
                    last.y,
                    collection.color
                );
                strokes += 1;
                jumps_on_color += usize::from(jump_hits);
            }
        }
        assert!(strokes > 0, "{pattern}");
        assert!(jumps_on_color > 0, "{pattern}");
    }
}

#[test]
fn test_flat_job_keeps_full_image() {
    let img = Arc::new(banded());
    let clusters = partition_clusters(img, 1.0, HatchMode::Flat, 0.0, None).unwrap();
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].dimensions(), (30, 30));
}

proptest! {
    #[test]
    fn strips_cover_width_without_overlap(width in 1u32..5000, count in 1u32..64) {
        let count = count.min(width);
        let bounds = strip_bounds(width, count);
        prop_assert_eq!(bounds.len(), count as usize);
        prop_assert_eq!(bounds[0].0, 0);
        prop_assert_eq!(bounds[bounds.len() - 1].1, width);
        for pair in bounds.windows(2) {
            prop_assert_eq!(pair[0].1, pair[1].0);
            prop_assert!(pair[0].0 < pair[0].1);
        }
    }

    #[test]
    fn cylinder_clusters_cover_image(
        width in 1u32..800,
        pixel_per_mm in 0.5f64..20.0,
        radius in 18.0f64..400.0,
    ) {
        let img = Arc::new(RgbImage::new(width, 2));
        let angle = image_angle_deg(width, pixel_per_mm, radius);
        let result =
            partition_clusters(img, pixel_per_mm, HatchMode::CylEquidistRad, radius, None);

        if angle > 360.0 {
            prop_assert!(result.is_err());
        } else {
            let clusters = result.unwrap();
            let covered: u32 = clusters.iter().map(|c| c.dimensions().0).sum();
            prop_assert_eq!(covered, width);
            if angle <= max_segment_angle_deg(radius) {
                prop_assert_eq!(clusters.len(), 1);
            }
            prop_assert!(clusters.iter().all(|c| c.cylinder_radius == radius));
        }
    }
}
