//! Archimedean spiral hatching
//!
//! One turn per spacing: the radius grows linearly from `avg - d/2` to
//! `avg + d/2` while the angle sweeps a full circle. Runs crossing from one
//! turn into the next stay a single polyline.

use bildhatch_core::Polyline;
use std::f64::consts::TAU;

use super::circular::MAX_ANGLE_STEP;
use super::{linspace_at, Scan};
use crate::sampling::StrokeStyle;

/// Walk all turns; `None` if cancelled
pub(crate) fn scan(scan: &Scan<'_>, progress: &mut dyn FnMut(f64)) -> Option<Vec<Polyline>> {
    let distance = scan.settings.distance_px;
    let step = scan.settings.step_px;
    let max_radius = scan.max_radius();
    let (cx, cy) = scan.origin;

    let mut lines = Vec::new();
    let mut builder = scan.builder(StrokeStyle::Trace);
    let mut avg_radius = distance / 2.0;
    let mut turn = 0usize;

    while avg_radius + distance / 2.0 <= max_radius {
        if scan.cancel.is_cancelled() {
            return None;
        }

        let angle_step = (step / avg_radius).min(MAX_ANGLE_STEP);
        let samples = (TAU / angle_step).ceil() as usize;
        let inner = avg_radius - distance / 2.0;
        let outer = avg_radius + distance / 2.0;
        // sample 0 of a later turn repeats the last sample of the previous one
        let first = if turn == 0 { 0 } else { 1 };
        for i in first..samples {
            let angle = linspace_at(0.0, TAU, samples, i);
            let radius = linspace_at(inner, outer, samples, i);
            let (sin, cos) = angle.sin_cos();
            scan.sample(&mut builder, cx + radius * cos, cy + radius * sin);
        }
        builder.drain_into(&mut lines, false);

        avg_radius += distance;
        turn += 1;
        progress((avg_radius / max_radius).min(1.0));
    }

    builder.finish_scan(cx, cy);
    builder.drain_into(&mut lines, false);
    Some(lines)
}
