//! Hatching engine errors
//!
//! Failures of hatch generation, parameter validation and toolpath
//! post-processing. Each kind has its own enum, folded into [`HatchError`].

use bildhatch_core::{GeometryError, PaletteError};
use std::io;
use thiserror::Error;

/// Errors that can occur while generating hatch data.
#[derive(Error, Debug)]
pub enum HatchError {
    /// The image would wrap around the cylinder more than once.
    #[error("Image spans {angle_deg:.1}° on a cylinder of radius {radius_mm} mm (maximum 360°)")]
    CylinderWrapExceeded { angle_deg: f64, radius_mm: f64 },

    /// Every color was skipped or produced no strokes.
    #[error("No hatch produced: {0}")]
    NoHatchProduced(String),

    /// Hatch or pricing parameters were rejected before any work started.
    #[error("Parameter error: {0}")]
    Parameter(#[from] ParameterError),

    /// The material palette could not supply parameters.
    #[error("Palette error: {0}")]
    Palette(#[from] PaletteError),

    /// Hatch data violated a geometric invariant.
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// Post-processing rejected the toolpath.
    #[error("Post-processing error: {0}")]
    PostProcess(#[from] PostProcessError),

    /// The worker thread panicked before reporting a result.
    #[error("Hatch job panicked: {0}")]
    JobPanicked(String),

    /// Reading an image or DXF file, or writing an export, failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The source image could not be decoded.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// The DXF file could not be parsed.
    #[error("DXF parse error: {0}")]
    Dxf(#[from] dxf::DxfError),
}

/// Errors related to hatch parameter validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    /// An input the operation depends on is absent.
    #[error("Missing required parameter: {0}")]
    Missing(String),

    /// Numeric value outside its accepted range.
    #[error("Parameter '{name}' out of range: {value} (valid: {min}..{max})")]
    OutOfRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Value that is in range but unusable, e.g. non-finite.
    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: String, reason: String },
}

/// Errors raised while rewriting finished polylines.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PostProcessError {
    /// Drive modes need the feed assigned by pricing.
    #[error("Line collection {collection} has no speed assigned; drive modes require pricing first")]
    MissingSpeed { collection: usize },
}

pub type HatchResult<T> = Result<T, HatchError>;

pub type ParameterResult<T> = Result<T, ParameterError>;

pub type PostProcessResult<T> = Result<T, PostProcessError>;
