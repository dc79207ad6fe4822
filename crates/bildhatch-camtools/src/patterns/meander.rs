//! Meander (boustrophedon) hatching
//!
//! Parallel scan lines at angle θ. Line starts first climb the right (or
//! left, for θ > 90°) edge of a bounding box one start spacing larger than
//! the image (at most one diagonal), then walk along its top edge. Every second line is emitted in
//! reverse so consecutive strokes chain without returning to a fixed side.

use bildhatch_core::Polyline;

use super::Scan;
use crate::sampling::StrokeStyle;

/// Walk all scan lines at `angle_deg`; `None` if cancelled
pub(crate) fn scan(
    scan: &Scan<'_>,
    angle_deg: f64,
    progress: &mut dyn FnMut(f64),
) -> Option<Vec<Polyline>> {
    let theta = angle_deg.rem_euclid(180.0);
    let (sin, cos) = theta.to_radians().sin_cos();
    let distance = scan.settings.distance_px;
    let step = scan.settings.step_px;
    let width = scan.grid.width();
    let height = scan.grid.height();

    let mut x_done = false;
    let mut y_done = false;
    // spacing of line starts along the box edges
    let (step_x, step_y, max_lines) = if theta == 0.0 {
        x_done = true;
        (1.0, distance, height / distance)
    } else if theta == 90.0 {
        y_done = true;
        (distance, 1.0, width / distance)
    } else {
        let step_y = (distance / cos).abs();
        let step_x = (distance / sin).abs();
        (step_x, step_y, height / step_y + width / step_x)
    };

    // Near-axis angles make one start spacing huge; lines beyond a diagonal
    // of the image never cross it, so the box margin stops there.
    let margin_limit = width.hypot(height) + distance;
    let pad_y = step_y.min(margin_limit).ceil();
    let pad_x = step_x.min(margin_limit).ceil();
    let min_y = -pad_y;
    let max_y = height + pad_y;
    let min_x = -pad_x;
    let max_x = width + pad_x;

    let (mut start_x, mut start_y, incline) = if cos >= 0.0 {
        (max_x, min_y, -1.0)
    } else {
        (min_x, min_y, 1.0)
    };
    let dx = -cos * step;
    let dy = -sin * step;

    let mut lines = Vec::new();
    let mut builder = scan.builder(StrokeStyle::Endpoints);
    let mut line_index = 0usize;

    loop {
        if scan.cancel.is_cancelled() {
            return None;
        }

        // starts above the box slide down their own line in whole steps
        let mut k = if start_y > max_y && sin > 0.0 {
            ((start_y - max_y) / (sin * step)).floor()
        } else {
            0.0
        };
        let mut x = start_x + k * dx;
        let mut y = start_y + k * dy;
        while (x >= min_x || incline > 0.0) && (x <= max_x || incline < 0.0) && y >= min_y {
            scan.sample(&mut builder, x, y);
            k += 1.0;
            x = start_x + k * dx;
            y = start_y + k * dy;
        }
        if builder.is_open() {
            let (x_end, _) = scan.remap.apply(x);
            builder.finish_scan(x_end, y);
        }
        builder.drain_into(&mut lines, line_index % 2 == 1);
        line_index += 1;

        if !y_done {
            start_y += step_y;
            if start_y >= max_y {
                y_done = true;
            }
        } else if !x_done {
            if start_y < max_y {
                start_y = max_y + 1.0;
            }
            start_x += incline * step_x;
            if (incline < 0.0 && start_x <= min_x) || (incline > 0.0 && start_x >= max_x) {
                x_done = true;
            }
        } else {
            break;
        }

        progress((line_index as f64 / max_lines).min(1.0));
    }

    progress(1.0);
    Some(lines)
}
