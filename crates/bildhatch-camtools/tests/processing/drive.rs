//! Drive modes applied to hatched images

use bildhatch_camtools::pricing::{SpeedPowerSettings, ValueMode, ValueRange};
use bildhatch_camtools::{
    build_process_block, HatchDistance, HatchError, HatchOutcome, HatchParameters, ImageHatcher,
    PostProcessError,
};
use bildhatch_core::{
    CancellationToken, HatchData, HatchPattern, MoveType, PostProcessingMode, ProcessingSettings,
};
use image::RgbImage;
use std::sync::Arc;

fn hatched() -> HatchData {
    let img = Arc::new(RgbImage::from_pixel(20, 10, image::Rgb([0, 0, 0])));
    let params = HatchParameters {
        pattern: HatchPattern::FixedMeander,
        angle_deg: 0.0,
        distance: HatchDistance::Fixed { um: 500.0 },
        pixel_per_mm: 2.0,
        seed: Some(8),
        ..HatchParameters::default()
    };
    match ImageHatcher::new(img, params)
        .unwrap()
        .hatch(&CancellationToken::new())
        .unwrap()
    {
        HatchOutcome::Finished(data) => data,
        HatchOutcome::Cancelled => panic!("nothing cancelled this run"),
    }
}

fn speed(feed: f64) -> SpeedPowerSettings {
    SpeedPowerSettings {
        speed: ValueRange {
            mode: ValueMode::Constant,
            min: feed,
            max: feed,
            structure_count: 1,
        },
        ..SpeedPowerSettings::default()
    }
}

fn mode(post_processing: PostProcessingMode) -> ProcessingSettings {
    ProcessingSettings {
        post_processing,
        ..ProcessingSettings::default()
    }
}

#[test]
fn test_constant_drive_run_in_is_one_mm_at_25() {
    let source = hatched();
    let block = build_process_block(
        &source,
        &speed(25.0),
        None,
        mode(PostProcessingMode::ConstantDrive),
    )
    .unwrap();

    let lines: Vec<_> = block.data.collections().flat_map(|c| c.polylines.iter()).collect();
    assert!(!lines.is_empty());
    for line in lines {
        let n = line.len();
        assert!((line[0].distance_to(&line[1]) - 1.0).abs() < 1e-9);
        assert!((line[n - 2].distance_to(&line[n - 1]) - 1.0).abs() < 1e-9);
        assert_eq!(line[0].move_type, MoveType::Jump);
        assert_eq!(line[n - 1].move_type, MoveType::Jump);
        assert!(line[1..n - 1].iter().all(|p| p.speed == Some(25.0)));
    }
}

#[test]
fn test_over_drive_stretches_stroke_end() {
    let source = hatched();
    let constant = build_process_block(
        &source,
        &speed(60.0),
        None,
        mode(PostProcessingMode::ConstantDrive),
    )
    .unwrap();
    let over =
        build_process_block(&source, &speed(60.0), None, mode(PostProcessingMode::OverDrive))
            .unwrap();

    let a = &constant.data.clusters[0].data[0].polylines[0];
    let b = &over.data.clusters[0].data[0].polylines[0];
    let shift = a[a.len() - 2].distance_to(&b[b.len() - 2]);
    let expected = 0.24484 + (0.10634 - 0.24484) / (1.0 + (60.0f64 / 27.3937).powf(5.82549));
    assert!((shift - expected).abs() < 1e-9);
    // run-out of max(1, 0.04 * 60) = 2.4 mm beyond the stretched end
    assert!((b[b.len() - 2].distance_to(&b[b.len() - 1]) - 2.4).abs() < 1e-9);
}

#[test]
fn test_maximize_lines_keeps_straight_strokes() {
    let source = hatched();
    let block = build_process_block(
        &source,
        &SpeedPowerSettings::default(),
        None,
        mode(PostProcessingMode::MaximizeLines),
    )
    .unwrap();
    assert_eq!(block.data.point_count(), source.point_count());
}

#[test]
fn test_drive_without_speed_is_rejected() {
    let source = Arc::new(hatched());
    let err = bildhatch_camtools::post_process(
        &source,
        &mode(PostProcessingMode::ConstantDrive),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        HatchError::PostProcess(PostProcessError::MissingSpeed { collection: 0 })
    ));
}
