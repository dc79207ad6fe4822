//! Cluster partitioner
//!
//! On a cylinder the laser head can only stay within focus over a limited
//! arc. Images subtending more than that arc are split into vertical strips
//! that are engraved one after another, rotating the cylinder in between.

use bildhatch_core::{GeometryError, HatchCluster, HatchMode, RefPosition};
use image::RgbImage;
use std::f64::consts::PI;
use std::sync::Arc;

use crate::error::{HatchError, HatchResult};

/// Fixed distance between laser head and cylinder surface in mm
pub const LASER_WORKING_DISTANCE_MM: f64 = 17.0;

/// Largest arc in degrees that stays within the working distance tolerance
pub fn max_segment_angle_deg(radius_mm: f64) -> f64 {
    let ratio = ((radius_mm - LASER_WORKING_DISTANCE_MM) / radius_mm).clamp(-1.0, 1.0);
    2.0 * ratio.acos().to_degrees()
}

/// Arc in degrees subtended by an image of `width_px` pixels
pub fn image_angle_deg(width_px: u32, pixel_per_mm: f64, radius_mm: f64) -> f64 {
    let width_mm = width_px as f64 / pixel_per_mm;
    width_mm / (2.0 * PI * radius_mm) * 360.0
}

/// Pixel column ranges `[start, end)` of `count` equal-width strips
pub fn strip_bounds(width: u32, count: u32) -> Vec<(u32, u32)> {
    let count = count.max(1) as u64;
    let width = width as u64;
    (0..count)
        .map(|k| ((k * width / count) as u32, ((k + 1) * width / count) as u32))
        .collect()
}

/// Default hatch origin of a region: its pixel center
pub fn default_origin(width: u32, height: u32) -> (f64, f64) {
    (
        (width as f64 - 1.0) / 2.0,
        (height as f64 - 1.0) / 2.0,
    )
}

/// Split an image into the clusters it is engraved as
///
/// Flat jobs and cylinder jobs that fit into one segment produce a single
/// cluster over the whole image, centered at `origin` if given. Larger
/// cylinder jobs produce left-to-right strips, each centered on itself.
pub fn partition_clusters(
    matrix: Arc<RgbImage>,
    pixel_per_mm: f64,
    hatch_mode: HatchMode,
    cylinder_radius_mm: f64,
    origin: Option<(f64, f64)>,
) -> HatchResult<Vec<HatchCluster>> {
    let (width, height) = matrix.dimensions();

    if !hatch_mode.is_cylindrical() {
        let origin = origin.unwrap_or_else(|| default_origin(width, height));
        return Ok(vec![HatchCluster::new(matrix, origin)]);
    }

    if cylinder_radius_mm <= 0.0 || !cylinder_radius_mm.is_finite() {
        return Err(GeometryError::InvalidRadius {
            radius: cylinder_radius_mm,
        }
        .into());
    }

    let image_angle = image_angle_deg(width, pixel_per_mm, cylinder_radius_mm);
    if image_angle > 360.0 {
        return Err(HatchError::CylinderWrapExceeded {
            angle_deg: image_angle,
            radius_mm: cylinder_radius_mm,
        });
    }

    let max_angle = max_segment_angle_deg(cylinder_radius_mm);
    if image_angle <= max_angle {
        let origin = origin.unwrap_or_else(|| default_origin(width, height));
        let mut cluster = HatchCluster::new(matrix, origin);
        cluster.cylinder_radius = cylinder_radius_mm;
        return Ok(vec![cluster]);
    }

    let count = (image_angle / max_angle).ceil() as u32;
    tracing::debug!(
        "Splitting {:.1}° image into {} segments of at most {:.1}°",
        image_angle,
        count,
        max_angle
    );

    let clusters = strip_bounds(width, count)
        .into_iter()
        .map(|(x0, x1)| {
            let strip_width = x1 - x0;
            let strip = image::imageops::crop_imm(&*matrix, x0, 0, strip_width, height)
                .to_image();
            let mid_px = (x0 + x1) as f64 / 2.0;
            let offset_mm = (mid_px - width as f64 / 2.0) / pixel_per_mm;
            let rotation = -offset_mm / (2.0 * PI * cylinder_radius_mm) * 360.0;

            let mut cluster =
                HatchCluster::new(Arc::new(strip), default_origin(strip_width, height));
            cluster.ref_position = RefPosition::rotated(rotation);
            cluster.cylinder_radius = cylinder_radius_mm;
            cluster
        })
        .collect();

    Ok(clusters)
}
