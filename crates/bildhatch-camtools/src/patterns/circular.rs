//! Concentric ring hatching
//!
//! Rings start just outside the origin and grow by one spacing until they
//! clear the farthest image corner. Each ring starts at a random angle so
//! ring seams do not line up radially.

use bildhatch_core::Polyline;
use rand::rngs::StdRng;
use rand::Rng;
use std::f64::consts::TAU;

use super::{linspace_at, Scan};
use crate::sampling::StrokeStyle;

/// Coarsest angular step of a ring
pub(crate) const MAX_ANGLE_STEP: f64 = TAU / 36.0;

/// Walk all rings; `None` if cancelled
pub(crate) fn scan(
    scan: &Scan<'_>,
    rng: &mut StdRng,
    progress: &mut dyn FnMut(f64),
) -> Option<Vec<Polyline>> {
    let distance = scan.settings.distance_px;
    let step = scan.settings.step_px;
    let max_radius = scan.max_radius();
    let (cx, cy) = scan.origin;

    let mut lines = Vec::new();
    let mut builder = scan.builder(StrokeStyle::Trace);
    let mut radius = distance / 10.0;

    while radius <= max_radius {
        if scan.cancel.is_cancelled() {
            return None;
        }

        let angle_step = (step / radius).min(MAX_ANGLE_STEP);
        let start = rng.gen_range(0.0..20.0_f64).floor().to_radians();
        let samples = (TAU / angle_step).ceil() as usize;
        for i in 0..samples {
            let angle = linspace_at(start, start + TAU, samples, i);
            let (sin, cos) = angle.sin_cos();
            scan.sample(&mut builder, cx + radius * cos, cy + radius * sin);
        }
        builder.finish_scan(cx, cy);
        builder.drain_into(&mut lines, false);

        radius += distance;
        progress((radius / max_radius).min(1.0));
    }

    Some(lines)
}
