//! Scanline hatching engine
//!
//! Every pattern walks a parametric locus over the pixel grid at a fixed
//! step, tests the nearest pixel of each sample against one target color and
//! turns runs of matching samples into polylines. Coordinates are pixels
//! while scanning and millimeters relative to the hatch origin in the result.

pub mod circular;
pub mod meander;
pub mod radial;
pub mod spiral;

use bildhatch_core::{CancellationToken, HatchMode, HatchPattern, LineCollection, Polyline, Rgb};
use image::RgbImage;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::sampling::{CylinderRemap, PixelGrid, StrokeBuilder, StrokeStyle};

/// Geometry of one hatch pass, all lengths in pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSettings {
    /// Pattern to walk
    pub pattern: HatchPattern,
    /// Pattern angle in degrees, used by fixed and crossed meanders
    pub angle_deg: f64,
    /// Spacing between neighbouring scan lines, rings or spiral turns
    pub distance_px: f64,
    /// Sampling step along the locus
    pub step_px: f64,
    /// Output scale
    pub pixel_per_mm: f64,
    /// Surface compensation
    pub hatch_mode: HatchMode,
    /// Cylinder radius, ignored for flat work
    pub cylinder_radius_px: f64,
}

/// Result of hatching one color
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// At least one polyline was produced
    Lines(LineCollection),
    /// No sample matched the color
    Empty,
    /// The cancellation token fired; nothing was produced
    Cancelled,
}

/// State shared by the pattern walkers of one color
pub(crate) struct Scan<'a> {
    pub grid: PixelGrid<'a>,
    /// Hatch origin in pixel space with y pointing up
    pub origin: (f64, f64),
    pub color: Rgb,
    pub settings: &'a ScanSettings,
    pub remap: CylinderRemap,
    pub cancel: &'a CancellationToken,
}

impl Scan<'_> {
    pub fn builder(&self, style: StrokeStyle) -> StrokeBuilder {
        StrokeBuilder::new(self.color, self.origin, self.settings.pixel_per_mm, style)
    }

    /// Test the sample at `(x, y)` and feed it to `builder`
    #[inline(always)]
    pub fn sample(&self, builder: &mut StrokeBuilder, x: f64, y: f64) {
        let (x, on_surface) = self.remap.apply(x);
        let hit = on_surface && self.grid.matches(x, y, self.color);
        builder.sample(x, y, hit);
    }

    /// Radius around the origin that encloses the whole grid plus one spacing
    pub fn max_radius(&self) -> f64 {
        let (ox, oy) = self.origin;
        let w = self.grid.width();
        let h = self.grid.height();
        let farthest = [(-0.5, -0.5), (w - 0.5, -0.5), (-0.5, h - 0.5), (w - 0.5, h - 0.5)]
            .iter()
            .map(|(cx, cy)| (cx - ox).hypot(cy - oy))
            .fold(0.0, f64::max);
        farthest.ceil() + self.settings.distance_px.ceil()
    }
}

/// `i`-th of `n` evenly spaced values from `start` to `end` inclusive
#[inline(always)]
pub(crate) fn linspace_at(start: f64, end: f64, n: usize, i: usize) -> f64 {
    if n <= 1 {
        start
    } else {
        start + (end - start) * i as f64 / (n - 1) as f64
    }
}

/// Hatch one color of a cluster
///
/// `origin` is the hatch origin in image pixel coordinates (row 0 at the
/// top). `progress` receives the completed fraction of this color in
/// `0.0..=1.0`.
pub fn hatch(
    matrix: &RgbImage,
    origin: (f64, f64),
    color: Rgb,
    settings: &ScanSettings,
    rng: &mut StdRng,
    progress: &mut dyn FnMut(f64),
    cancel: &CancellationToken,
) -> ScanOutcome {
    if !(settings.distance_px > 0.0 && settings.step_px > 0.0) {
        tracing::warn!(
            "Skipping color {} with degenerate spacing {} / step {}",
            color,
            settings.distance_px,
            settings.step_px
        );
        return ScanOutcome::Empty;
    }

    let origin = (origin.0, matrix.height() as f64 - 1.0 - origin.1);
    let scan = Scan {
        grid: PixelGrid::new(matrix),
        origin,
        color,
        settings,
        remap: CylinderRemap::new(settings.hatch_mode, origin.0, settings.cylinder_radius_px),
        cancel,
    };

    let polylines: Option<Vec<Polyline>> = match settings.pattern {
        HatchPattern::FixedMeander => meander::scan(&scan, settings.angle_deg, progress),
        HatchPattern::RandomMeander => {
            let angle = rng.gen_range(0.0..180.0_f64).floor();
            meander::scan(&scan, angle, progress)
        }
        HatchPattern::CrossedMeander => {
            let first = meander::scan(&scan, settings.angle_deg, &mut |f: f64| progress(f / 2.0));
            first.and_then(|mut lines| {
                let second = meander::scan(&scan, settings.angle_deg + 90.0, &mut |f: f64| {
                    progress(0.5 + f / 2.0)
                })?;
                lines.extend(second);
                Some(lines)
            })
        }
        HatchPattern::Circular => circular::scan(&scan, rng, progress),
        HatchPattern::Spiral => spiral::scan(&scan, progress),
        HatchPattern::Radial => radial::scan(&scan, progress),
    };

    match polylines {
        None => ScanOutcome::Cancelled,
        Some(lines) if lines.is_empty() => ScanOutcome::Empty,
        Some(lines) => ScanOutcome::Lines(LineCollection::with_polylines(color, lines)),
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_linspace_endpoints() {
        assert_eq!(linspace_at(0.0, 1.0, 5, 0), 0.0);
        assert_eq!(linspace_at(0.0, 1.0, 5, 4), 1.0);
        assert_eq!(linspace_at(0.0, 1.0, 5, 2), 0.5);
        assert_eq!(linspace_at(3.0, 9.0, 1, 0), 3.0);
    }

    #[test]
    fn test_absent_color_is_empty() {
        let img = solid(8, 8, Rgb::WHITE);
        for pattern in HatchPattern::ALL {
            let outcome = run(&img, Rgb::BLACK, &settings(pattern, 1.0, 0.25));
            assert_eq!(outcome, ScanOutcome::Empty, "{pattern}");
        }
    }

    #[test]
    fn test_every_pattern_covers_solid_image() {
        let img = solid(12, 9, Rgb::BLACK);
        for pattern in HatchPattern::ALL {
            match run(&img, Rgb::BLACK, &settings(pattern, 1.0, 0.25)) {
                ScanOutcome::Lines(collection) => {
                    assert!(!collection.is_empty(), "{pattern}");
                    assert!(collection.validate().is_ok(), "{pattern}");
                }
                other => panic!("{pattern}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_cancelled_token_stops_before_work() {
        use rand::SeedableRng;
        let img = solid(16, 16, Rgb::BLACK);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut rng = StdRng::seed_from_u64(1);
        for pattern in HatchPattern::ALL {
            let outcome = hatch(
                &img,
                (7.5, 7.5),
                Rgb::BLACK,
                &settings(pattern, 1.0, 0.5),
                &mut rng,
                &mut |_: f64| {},
                &cancel,
            );
            assert_eq!(outcome, ScanOutcome::Cancelled, "{pattern}");
        }
    }

    #[test]
    fn test_zero_step_is_rejected_without_looping() {
        let img = solid(4, 4, Rgb::BLACK);
        let outcome = run(&img, Rgb::BLACK, &settings(HatchPattern::Spiral, 1.0, 0.0));
        assert_eq!(outcome, ScanOutcome::Empty);
    }
}
