//! Starting a job while another one runs

use bildhatch_camtools::{
    HatchDistance, HatchParameters, HatchWorker, ImageHatcher, JobEvent, JobOutcome,
};
use bildhatch_core::HatchPattern;
use image::RgbImage;
use std::sync::Arc;

fn hatcher(size: u32, step_mm: f64) -> ImageHatcher {
    let img = Arc::new(RgbImage::from_pixel(size, size, image::Rgb([30, 30, 30])));
    let params = HatchParameters {
        pattern: HatchPattern::Circular,
        distance: HatchDistance::Fixed { um: 200.0 },
        step_mm,
        pixel_per_mm: 10.0,
        seed: Some(4),
        ..HatchParameters::default()
    };
    ImageHatcher::new(img, params).unwrap()
}

#[test]
fn test_new_job_supersedes_running_one() {
    let worker = HatchWorker::new();
    let first = worker.start(hatcher(400, 0.001)).unwrap();
    assert!(matches!(first.next_event(), Some(JobEvent::Progress(_))));

    let second = worker.start(hatcher(20, 0.1)).unwrap();
    assert_ne!(first.id(), second.id());

    // the first job was cancelled and joined before the second was spawned
    assert!(first.wait().is_cancelled());
    match second.wait() {
        JobOutcome::Finished(data) => assert_eq!(data.collection_count(), 1),
        other => panic!("unexpected {other:?}"),
    }
    worker.cancel();
    assert!(!worker.is_running());
}
