//! Pixel sampling primitives shared by all hatch patterns
//!
//! Patterns walk positions in pixel space where y grows upward (row 0 of the
//! source image is the top). Every sample is rounded to a pixel, compared
//! against the target color and fed into a [`StrokeBuilder`] that turns runs
//! of matching samples into polylines.

use bildhatch_core::{reverse_polyline, HatchMode, MoveType, Point, Polyline, Rgb};
use image::RgbImage;
use std::f64::consts::FRAC_PI_2;

/// Round to the nearest integer, ties toward positive infinity
///
/// `2.5 -> 3`, `-2.5 -> -2`. Hatch fill symmetry depends on this exact rule,
/// so `f64::round` (ties away from zero) must not be substituted.
#[inline(always)]
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Read-only view of an RGB matrix with y pointing up
#[derive(Debug, Clone, Copy)]
pub struct PixelGrid<'a> {
    data: &'a [u8],
    width: i64,
    height: i64,
}

impl<'a> PixelGrid<'a> {
    /// Wrap an image without copying it
    pub fn new(image: &'a RgbImage) -> Self {
        Self {
            data: image.as_raw(),
            width: image.width() as i64,
            height: image.height() as i64,
        }
    }

    /// Width in pixels
    pub fn width(&self) -> f64 {
        self.width as f64
    }

    /// Height in pixels
    pub fn height(&self) -> f64 {
        self.height as f64
    }

    /// Whether the pixel nearest to `(x, y)` lies inside the grid and has `color`
    #[inline(always)]
    pub fn matches(&self, x: f64, y: f64, color: Rgb) -> bool {
        let col = round_half_up(x);
        let row = round_half_up(y);
        if col < 0 || row < 0 || col >= self.width || row >= self.height {
            return false;
        }
        let idx = (((self.height - 1 - row) * self.width + col) * 3) as usize;
        self.data[idx] == color.r && self.data[idx + 1] == color.g && self.data[idx + 2] == color.b
    }
}

/// Cylinder compensation applied to sample x positions
///
/// For [`HatchMode::CylEquidistX`] an x offset `d` from the origin is
/// replaced by the arc length `R * asin(d / R)`. Positions further than `R`
/// from the origin are not on the cylinder; they are clamped to the quarter
/// circumference and reported as off-surface.
#[derive(Debug, Clone, Copy)]
pub struct CylinderRemap {
    center_x: f64,
    radius: f64,
    enabled: bool,
}

impl CylinderRemap {
    /// Remap for a hatch mode, `radius` in pixels
    pub fn new(hatch_mode: HatchMode, center_x: f64, radius: f64) -> Self {
        Self {
            center_x,
            radius,
            enabled: hatch_mode == HatchMode::CylEquidistX && radius > 0.0,
        }
    }

    /// Remapped x and whether the position lies on the cylinder
    #[inline(always)]
    pub fn apply(&self, x: f64) -> (f64, bool) {
        if !self.enabled {
            return (x, true);
        }
        let d = x - self.center_x;
        if d.abs() > self.radius {
            (self.center_x + d.signum() * self.radius * FRAC_PI_2, false)
        } else {
            ((d / self.radius).asin() * self.radius + self.center_x, true)
        }
    }
}

/// How much of a matching run is recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeStyle {
    /// Straight scans: only the run's start and its boundary point
    Endpoints,
    /// Curved scans: every matching sample
    Trace,
}

/// Accumulates matching samples into polylines
///
/// A run opens with a jump at its first matching sample and closes with a
/// draw at the midpoint between its last matching sample and the sample that
/// ended it. Runs that close with fewer than two points are dropped.
#[derive(Debug)]
pub struct StrokeBuilder {
    color: Rgb,
    origin: (f64, f64),
    pixel_per_mm: f64,
    style: StrokeStyle,
    open: Polyline,
    prev: (f64, f64),
    finished: Vec<Polyline>,
}

impl StrokeBuilder {
    /// Builder emitting points in mm relative to `origin` (pixel space, y up)
    pub fn new(color: Rgb, origin: (f64, f64), pixel_per_mm: f64, style: StrokeStyle) -> Self {
        Self {
            color,
            origin,
            pixel_per_mm,
            style,
            open: Vec::new(),
            prev: origin,
            finished: Vec::new(),
        }
    }

    #[inline(always)]
    fn point(&self, x: f64, y: f64, move_type: MoveType) -> Point {
        Point::new(
            (x - self.origin.0) / self.pixel_per_mm,
            (y - self.origin.1) / self.pixel_per_mm,
            0.0,
            move_type,
            self.color,
        )
    }

    /// Record one sample
    #[inline(always)]
    pub fn sample(&mut self, x: f64, y: f64, hit: bool) {
        if hit {
            if self.open.is_empty() {
                self.open.push(self.point(x, y, MoveType::Jump));
            } else if self.style == StrokeStyle::Trace {
                self.open.push(self.point(x, y, MoveType::Draw));
            }
        } else if !self.open.is_empty() {
            self.close_towards(x, y);
        }
        self.prev = (x, y);
    }

    /// Close a run that is still open when the scan ends at `(x, y)`
    ///
    /// `(x, y)` is the position the scan would have sampled next.
    pub fn finish_scan(&mut self, x: f64, y: f64) {
        if self.open.is_empty() {
            return;
        }
        match self.style {
            StrokeStyle::Endpoints => self.close_towards(x, y),
            StrokeStyle::Trace => self.flush(),
        }
    }

    /// Close the run at the midpoint between the last sample and `(x, y)`
    fn close_towards(&mut self, x: f64, y: f64) {
        let mid_x = (x + self.prev.0) / 2.0;
        let mid_y = (y + self.prev.1) / 2.0;
        let boundary = self.point(mid_x, mid_y, MoveType::Draw);
        self.open.push(boundary);
        self.flush();
    }

    fn flush(&mut self) {
        let polyline = std::mem::take(&mut self.open);
        if polyline.len() >= 2 {
            self.finished.push(polyline);
        }
    }

    /// Whether a run is currently open
    pub fn is_open(&self) -> bool {
        !self.open.is_empty()
    }

    /// Move finished polylines out, in scan order or reversed
    ///
    /// Reversed output also reverses each polyline so the scan can be walked
    /// back-to-front without a travel move to the far end.
    pub fn drain_into(&mut self, out: &mut Vec<Polyline>, reversed: bool) {
        if reversed {
            for mut polyline in self.finished.drain(..).rev() {
                reverse_polyline(&mut polyline);
                out.push(polyline);
            }
        } else {
            out.append(&mut self.finished);
        }
    }
}
