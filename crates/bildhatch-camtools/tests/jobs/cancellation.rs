//! Cooperative cancellation of running jobs

use bildhatch_camtools::{HatchDistance, HatchParameters, HatchWorker, ImageHatcher, JobEvent};
use bildhatch_core::HatchPattern;
use image::RgbImage;
use std::sync::Arc;

const STRIPES: [[u8; 3]; 5] = [
    [0, 0, 0],
    [40, 80, 120],
    [200, 0, 0],
    [0, 150, 0],
    [90, 90, 90],
];

/// 500x500 image of five vertical color stripes
fn large_hatcher() -> ImageHatcher {
    let img = RgbImage::from_fn(500, 500, |x, _| image::Rgb(STRIPES[(x / 100) as usize]));
    let params = HatchParameters {
        pattern: HatchPattern::FixedMeander,
        angle_deg: 30.0,
        distance: HatchDistance::Fixed { um: 100.0 },
        step_mm: 0.005,
        pixel_per_mm: 10.0,
        seed: Some(9),
        ..HatchParameters::default()
    };
    ImageHatcher::new(Arc::new(img), params).unwrap()
}

#[test]
fn test_cancel_mid_run_discards_work() {
    let worker = HatchWorker::new();
    let handle = worker.start(large_hatcher()).unwrap();

    let mut progress = Vec::new();
    let mut finished = 0;
    let mut cancelled = 0;
    while let Some(event) = handle.next_event() {
        match event {
            JobEvent::Progress(p) => {
                progress.push(p);
                handle.cancel();
            }
            JobEvent::Finished(_) => finished += 1,
            JobEvent::Cancelled => cancelled += 1,
            JobEvent::Failed(err) => panic!("job failed: {err}"),
        }
    }

    assert_eq!(finished, 0);
    assert_eq!(cancelled, 1);
    assert!(!progress.is_empty());
    assert!(progress.windows(2).all(|w| w[0] <= w[1]));
    assert!(progress.iter().all(|&p| p < 100));
    worker.cancel();
    assert!(!worker.is_running());
}

#[test]
fn test_worker_cancel_reaches_running_job() {
    let worker = HatchWorker::new();
    let handle = worker.start(large_hatcher()).unwrap();
    assert!(matches!(handle.next_event(), Some(JobEvent::Progress(_))));
    worker.cancel();
    assert!(handle.wait().is_cancelled());
}

#[test]
fn test_near_axis_angle_ends_promptly() {
    use std::sync::mpsc;
    use std::time::Duration;

    for angle_deg in [1e-7, 90.0 - 1e-7] {
        let img = RgbImage::from_pixel(20, 20, image::Rgb([0, 0, 0]));
        let params = HatchParameters {
            pattern: HatchPattern::FixedMeander,
            angle_deg,
            distance: HatchDistance::Fixed { um: 1000.0 },
            step_mm: 0.1,
            pixel_per_mm: 10.0,
            seed: Some(1),
            ..HatchParameters::default()
        };
        let worker = HatchWorker::new();
        let handle = worker
            .start(ImageHatcher::new(Arc::new(img), params).unwrap())
            .unwrap();

        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let _ = tx.send(handle.wait());
        });
        let outcome = match rx.recv_timeout(Duration::from_secs(10)) {
            Ok(outcome) => outcome,
            Err(_) => {
                // dropping the worker would join the stuck thread
                std::mem::forget(worker);
                panic!("angle {angle_deg}: no terminal event within 10 s");
            }
        };
        match outcome {
            bildhatch_camtools::JobOutcome::Finished(data) => {
                assert_eq!(data.collection_count(), 1)
            }
            other => panic!("angle {angle_deg}: unexpected {other:?}"),
        }
    }
}
