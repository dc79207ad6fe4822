//! Radial hatching
//!
//! Rays leave the origin at evenly spaced angles chosen so neighbouring rays
//! are at most one spacing apart at the outer radius. Every second ray is
//! emitted inward.

use bildhatch_core::Polyline;
use std::f64::consts::TAU;

use super::Scan;
use crate::sampling::StrokeStyle;

/// Walk all rays; `None` if cancelled
pub(crate) fn scan(scan: &Scan<'_>, progress: &mut dyn FnMut(f64)) -> Option<Vec<Polyline>> {
    let distance = scan.settings.distance_px;
    let step = scan.settings.step_px;
    let max_radius = scan.max_radius();
    let (cx, cy) = scan.origin;

    let angle_step = 2.0 * (distance / max_radius).atan();
    let rays = (TAU / angle_step).ceil() as usize;

    let mut lines = Vec::new();
    let mut builder = scan.builder(StrokeStyle::Endpoints);

    for ray in 0..rays {
        if scan.cancel.is_cancelled() {
            return None;
        }

        let (sin, cos) = (TAU * ray as f64 / rays as f64).sin_cos();
        let mut k = 0.0;
        let (mut x, mut y) = (cx, cy);
        while (x - cx).hypot(y - cy) <= max_radius {
            scan.sample(&mut builder, x, y);
            k += 1.0;
            x = cx + k * step * cos;
            y = cy + k * step * sin;
        }
        if builder.is_open() {
            let (x_end, _) = scan.remap.apply(x);
            builder.finish_scan(x_end, y);
        }
        builder.drain_into(&mut lines, ray % 2 == 1);

        progress((ray + 1) as f64 / rays as f64);
    }

    Some(lines)
}
