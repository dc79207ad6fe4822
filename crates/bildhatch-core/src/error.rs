//! Error handling for BildHatch
//!
//! Provides the error types shared by every layer of the hatching pipeline:
//! - Geometry errors (invariant violations in polyline data)
//! - Palette errors (material profile lookups)
//! - Parse errors (mode and pattern names coming from config or UI)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Geometry error type
///
/// Raised when hatch data violates a structural invariant, for example a
/// polyline that reaches a consumer with fewer points than it can draw.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// A polyline has fewer points than the operation requires
    #[error("Polyline {index} has {points} point(s), at least {required} required")]
    DegeneratePolyline {
        /// Index of the polyline within its line collection.
        index: usize,
        /// Number of points found.
        points: usize,
        /// Minimum number of points the operation needs.
        required: usize,
    },

    /// A polyline does not start with a positioning move
    #[error("Polyline {index} does not start with a jump move")]
    MissingJump {
        /// Index of the polyline within its line collection.
        index: usize,
    },

    /// Cylinder radius must be strictly positive for cylindrical work
    #[error("Invalid cylinder radius: {radius}")]
    InvalidRadius {
        /// The rejected radius in millimeters.
        radius: f64,
    },
}

/// Material palette error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PaletteError {
    /// The palette holds no parameter sets at all
    #[error("No parameter found: palette '{palette}' is empty")]
    NoParameterFound {
        /// Name of the palette that was searched.
        palette: String,
    },

    /// A palette file could not be read or decoded
    #[error("Failed to load palette: {reason}")]
    LoadFailed {
        /// Why the palette could not be loaded.
        reason: String,
    },
}

/// Parse error type
///
/// Returned when a textual mode name does not match any known variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Unknown hatch pattern name
    #[error("Unknown hatch pattern: {0}")]
    UnknownPattern(String),

    /// Unknown hatch mode name
    #[error("Unknown hatch mode: {0}")]
    UnknownHatchMode(String),

    /// Unknown post-processing (drive) mode name
    #[error("Post-processing mode not recognized: {0}")]
    UnknownPostProcessing(String),

    /// Unknown laser mode name
    #[error("Laser mode not recognized: {0}")]
    UnknownLaserMode(String),

    /// Unknown calibration test structure name
    #[error("Unknown test structure: {0}")]
    UnknownTestStructure(String),
}

/// Main error type for BildHatch core
///
/// A unified error type that can represent any error from the core layer.
#[derive(Error, Debug)]
pub enum Error {
    /// Geometry error
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Palette error
    #[error(transparent)]
    Palette(#[from] PaletteError),

    /// Parse error
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a geometry invariant violation
    pub fn is_geometry_error(&self) -> bool {
        matches!(self, Error::Geometry(_))
    }

    /// Check if this is a palette error
    pub fn is_palette_error(&self) -> bool {
        matches!(self, Error::Palette(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
