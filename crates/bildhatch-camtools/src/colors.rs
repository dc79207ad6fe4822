//! Color clustering
//!
//! Extracts the distinct solid colors of an image region.

use bildhatch_core::Rgb;
use image::RgbImage;
use std::collections::HashSet;

/// Distinct colors of `image`, brightest first
///
/// Colors are ordered by channel sum descending; equal sums fall back to the
/// packed `0xRRGGBB` value, descending, so the order is stable across runs.
pub fn sorted_unique_colors(image: &RgbImage) -> Vec<Rgb> {
    let mut seen: HashSet<u32> = HashSet::new();
    for px in image.as_raw().chunks_exact(3) {
        seen.insert((px[0] as u32) << 16 | (px[1] as u32) << 8 | px[2] as u32);
    }

    let mut colors: Vec<Rgb> = seen.into_iter().map(Rgb::from_packed).collect();
    colors.sort_unstable_by(|a, b| {
        b.sum()
            .cmp(&a.sum())
            .then_with(|| b.packed().cmp(&a.packed()))
    });
    colors
}
