//! Image Hatching Tool
//!
//! Converts a color image into per-color hatch toolpaths. Each distinct
//! color of each cluster is hatched on its own; colors brighter than the
//! white threshold are treated as background. Images are processed from
//! bottom to top to match device coordinate space where Y increases upward.

use bildhatch_core::{
    CancellationToken, HatchCluster, HatchData, HatchMode, HatchPattern, MaterialPalette,
    PaletteError, Rgb,
};
use image::{DynamicImage, RgbImage};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::colors::sorted_unique_colors;
use crate::cylindrical::project_cluster;
use crate::error::{HatchError, HatchResult, ParameterError, ParameterResult};
use crate::partition::partition_clusters;
use crate::patterns::{self, ScanOutcome, ScanSettings};
use crate::progress::{job_fraction, ProgressTracker};

/// Line spacing selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode")]
pub enum HatchDistance {
    /// Same spacing for every color
    Fixed {
        /// Spacing in micrometers
        um: f64,
    },
    /// Spacing interpolated by brightness, dark colors densest
    ColorRanged {
        /// Spacing for black in micrometers
        min_um: f64,
        /// Spacing for white in micrometers
        max_um: f64,
    },
}

impl HatchDistance {
    /// Spacing in micrometers for a color
    pub fn for_color(&self, color: Rgb) -> f64 {
        match *self {
            Self::Fixed { um } => um,
            Self::ColorRanged { min_um, max_um } => {
                min_um + color.sum() as f64 / 765.0 * (max_um - min_um)
            }
        }
    }

    fn validate(&self) -> ParameterResult<()> {
        let check = |name: &str, value: f64| {
            if value > 0.0 && value <= MAX_DISTANCE_UM {
                Ok(())
            } else {
                Err(ParameterError::OutOfRange {
                    name: name.to_string(),
                    value,
                    min: 0.0,
                    max: MAX_DISTANCE_UM,
                })
            }
        };
        match *self {
            Self::Fixed { um } => check("hatch_distance_um", um),
            Self::ColorRanged { min_um, max_um } => {
                check("hatch_distance_min_um", min_um)?;
                check("hatch_distance_max_um", max_um)?;
                if min_um > max_um {
                    return Err(ParameterError::InvalidValue {
                        name: "hatch_distance".to_string(),
                        reason: format!("minimum {min_um} µm exceeds maximum {max_um} µm"),
                    });
                }
                Ok(())
            }
        }
    }
}

impl Default for HatchDistance {
    fn default() -> Self {
        Self::ColorRanged {
            min_um: 300.0,
            max_um: 700.0,
        }
    }
}

impl fmt::Display for HatchDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed { .. } => write!(f, "Fixed"),
            Self::ColorRanged { .. } => write!(f, "ColorRanged"),
        }
    }
}

const MAX_DISTANCE_UM: f64 = 100_000.0;

/// Image hatching parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HatchParameters {
    /// Pattern used for every color
    pub pattern: HatchPattern,
    /// Pattern angle in degrees for fixed and crossed meanders
    pub angle_deg: f64,
    /// Line spacing
    pub distance: HatchDistance,
    /// Flat or cylindrical work
    pub hatch_mode: HatchMode,
    /// Cylinder radius in millimeters
    pub cylinder_radius_mm: f64,
    /// Sampling step along a scan in millimeters
    pub step_mm: f64,
    /// Colors with a mean channel value above this are not engraved
    pub white_threshold: f64,
    /// Resolution in pixels per millimeter
    pub pixel_per_mm: f64,
    /// Hatch origin in image pixel coordinates, image center if unset
    pub origin: Option<(f64, f64)>,
    /// Seed for random angles and ring offsets, fresh entropy if unset
    pub seed: Option<u64>,
}

impl Default for HatchParameters {
    fn default() -> Self {
        Self {
            pattern: HatchPattern::default(),
            angle_deg: 45.0,
            distance: HatchDistance::default(),
            hatch_mode: HatchMode::Flat,
            cylinder_radius_mm: 100.0,
            step_mm: 0.1,
            white_threshold: 254.0,
            pixel_per_mm: 10.0,
            origin: None,
            seed: None,
        }
    }
}

impl HatchParameters {
    /// Check numeric ranges before any work is done
    pub fn validate(&self) -> ParameterResult<()> {
        fn range(name: &str, value: f64, min: f64, max: f64) -> ParameterResult<()> {
            if value >= min && value <= max {
                Ok(())
            } else {
                Err(ParameterError::OutOfRange {
                    name: name.to_string(),
                    value,
                    min,
                    max,
                })
            }
        }

        range("step_mm", self.step_mm, 0.001, 10.0)?;
        range("pixel_per_mm", self.pixel_per_mm, 0.01, 1000.0)?;
        range("white_threshold", self.white_threshold, 0.0, 255.0)?;
        if !self.angle_deg.is_finite() {
            return Err(ParameterError::InvalidValue {
                name: "angle_deg".to_string(),
                reason: "angle must be finite".to_string(),
            });
        }
        if self.hatch_mode.is_cylindrical() {
            range("cylinder_radius_mm", self.cylinder_radius_mm, 1.0, 10_000.0)?;
        }
        self.distance.validate()
    }

    /// Description stored on the produced hatch data
    pub fn hatch_type(&self) -> String {
        let mut hatch_type = format!("Image: {} with {} Lines", self.pattern, self.distance);
        if self.hatch_mode.is_cylindrical() {
            hatch_type.push_str(&format!(" and {}", self.hatch_mode));
        }
        hatch_type
    }
}

/// Terminal state of a synchronous hatching run
#[derive(Debug, Clone)]
pub enum HatchOutcome {
    /// All clusters were hatched
    Finished(HatchData),
    /// The token fired; partial results were discarded
    Cancelled,
}

/// Hatching tool for color images
#[derive(Debug, Clone)]
pub struct ImageHatcher {
    clusters: Vec<HatchCluster>,
    params: HatchParameters,
    palette: Option<MaterialPalette>,
    size_px: (u32, u32),
}

impl ImageHatcher {
    /// Create a new hatcher from an image file
    pub fn from_file<P: AsRef<Path>>(path: P, params: HatchParameters) -> HatchResult<Self> {
        let img = image::open(path.as_ref())?;
        Self::from_image(img, params)
    }

    /// Create a new hatcher from a DynamicImage
    pub fn from_image(img: DynamicImage, params: HatchParameters) -> HatchResult<Self> {
        Self::new(Arc::new(img.to_rgb8()), params)
    }

    /// Create a new hatcher over an RGB matrix
    ///
    /// Validates the parameters and partitions the image. Cylinder jobs
    /// that would wrap more than once fail here.
    pub fn new(matrix: Arc<RgbImage>, params: HatchParameters) -> HatchResult<Self> {
        params.validate()?;
        let size_px = matrix.dimensions();
        let clusters = partition_clusters(
            matrix,
            params.pixel_per_mm,
            params.hatch_mode,
            params.cylinder_radius_mm,
            params.origin,
        )?;

        Ok(Self {
            clusters,
            params,
            palette: None,
            size_px,
        })
    }

    /// Take spacing, pattern and angle per color from a material palette
    pub fn with_palette(mut self, palette: MaterialPalette) -> HatchResult<Self> {
        if palette.is_empty() {
            return Err(PaletteError::NoParameterFound {
                palette: palette.name,
            }
            .into());
        }
        self.palette = Some(palette);
        Ok(self)
    }

    /// Clusters the image is hatched as
    pub fn clusters(&self) -> &[HatchCluster] {
        &self.clusters
    }

    /// Parameters in use
    pub fn params(&self) -> &HatchParameters {
        &self.params
    }

    /// Get the output dimensions in millimeters
    pub fn output_size_mm(&self) -> (f64, f64) {
        (
            self.size_px.0 as f64 / self.params.pixel_per_mm,
            self.size_px.1 as f64 / self.params.pixel_per_mm,
        )
    }

    /// Description stored on the produced hatch data
    pub fn hatch_type(&self) -> String {
        match &self.palette {
            Some(palette) => {
                let mut hatch_type = format!("Image: Automatic from {}", palette.name);
                if self.params.hatch_mode.is_cylindrical() {
                    hatch_type.push_str(&format!(" and {}", self.params.hatch_mode));
                }
                hatch_type
            }
            None => self.params.hatch_type(),
        }
    }

    /// Scan geometry for one color of a cluster
    fn scan_settings(&self, cluster: &HatchCluster, color: Rgb) -> HatchResult<ScanSettings> {
        let (distance_um, pattern, angle_deg) = match &self.palette {
            Some(palette) => {
                let entry = palette.find_paramset_by_color(color)?;
                (entry.hatch_distance_um, entry.hatch_pattern, entry.hatch_angle)
            }
            None => (
                self.params.distance.for_color(color),
                self.params.pattern,
                self.params.angle_deg,
            ),
        };
        let ppmm = self.params.pixel_per_mm;

        Ok(ScanSettings {
            pattern,
            angle_deg,
            distance_px: distance_um / 1000.0 * ppmm,
            step_px: self.params.step_mm * ppmm,
            pixel_per_mm: ppmm,
            hatch_mode: self.params.hatch_mode,
            cylinder_radius_px: cluster.cylinder_radius * ppmm,
        })
    }

    /// Hatch every cluster
    pub fn hatch(&self, cancel: &CancellationToken) -> HatchResult<HatchOutcome> {
        self.hatch_with_progress(cancel, |_| {})
    }

    /// Hatch every cluster with progress callback
    ///
    /// `progress_callback` receives whole percentages, each larger than the
    /// previous one.
    pub fn hatch_with_progress<F>(
        &self,
        cancel: &CancellationToken,
        progress_callback: F,
    ) -> HatchResult<HatchOutcome>
    where
        F: FnMut(u8),
    {
        let seed = self
            .params
            .seed
            .unwrap_or_else(|| rand::thread_rng().next_u64());
        let mut rng = StdRng::seed_from_u64(seed);
        let mut tracker = ProgressTracker::new(progress_callback);
        let n_clusters = self.clusters.len();

        tracing::info!(
            "Hatching {} cluster(s): {} (seed {})",
            n_clusters,
            self.hatch_type(),
            seed
        );

        let mut hatched = Vec::with_capacity(n_clusters);
        for (cluster_idx, cluster) in self.clusters.iter().enumerate() {
            if cancel.is_cancelled() {
                tracing::info!("Hatching cancelled before cluster {}", cluster_idx);
                return Ok(HatchOutcome::Cancelled);
            }

            let mut out = HatchCluster {
                data: Vec::new(),
                ..cluster.clone()
            };
            let Some(matrix) = cluster.input_matrix.as_deref() else {
                hatched.push(out);
                continue;
            };

            let colors = sorted_unique_colors(matrix);
            let n_colors = colors.len();
            tracing::debug!(
                "Cluster {}: {}x{} px, {} color(s)",
                cluster_idx,
                matrix.width(),
                matrix.height(),
                n_colors
            );

            for (color_idx, &color) in colors.iter().enumerate() {
                if cancel.is_cancelled() {
                    tracing::info!("Hatching cancelled in cluster {}", cluster_idx);
                    return Ok(HatchOutcome::Cancelled);
                }

                if color.exceeds_white_threshold(self.params.white_threshold) {
                    tracing::debug!(
                        "Skipping color {} above white threshold {}",
                        color,
                        self.params.white_threshold
                    );
                    tracker.update(job_fraction(cluster_idx, n_clusters, color_idx, n_colors, 1.0));
                    continue;
                }

                let settings = self.scan_settings(cluster, color)?;
                let outcome = patterns::hatch(
                    matrix,
                    cluster.cluster_center_for_hatch,
                    color,
                    &settings,
                    &mut rng,
                    &mut |f: f64| {
                        tracker.update(job_fraction(cluster_idx, n_clusters, color_idx, n_colors, f))
                    },
                    cancel,
                );

                match outcome {
                    ScanOutcome::Lines(collection) => out.data.push(collection),
                    ScanOutcome::Empty => {
                        tracing::debug!("Color {} produced no strokes", color);
                    }
                    ScanOutcome::Cancelled => {
                        tracing::info!("Hatching cancelled in cluster {}", cluster_idx);
                        return Ok(HatchOutcome::Cancelled);
                    }
                }
                tracker.update(job_fraction(cluster_idx, n_clusters, color_idx, n_colors, 1.0));
            }

            if self.params.hatch_mode.is_cylindrical() && !out.data.is_empty() {
                project_cluster(&mut out)?;
            }
            tracing::debug!(
                "Cluster {} finished with {} collection(s)",
                cluster_idx,
                out.data.len()
            );
            hatched.push(out);
        }

        let data = HatchData::new(hatched, self.hatch_type());
        if data.collection_count() == 0 {
            return Err(HatchError::NoHatchProduced(
                "every color was skipped or produced no strokes".to_string(),
            ));
        }

        tracker.update(1.0);
        tracing::info!(
            "Hatching finished: {} collection(s), {} point(s)",
            data.collection_count(),
            data.point_count()
        );
        Ok(HatchOutcome::Finished(data))
    }
}
