//! Hatching and processing mode selections
//!
//! Each mode has a canonical display name (the one shown in the UI and
//! written to configuration files) and parses case-insensitively from it.

use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Geometric pattern used to cover a solid color region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HatchPattern {
    /// Parallel back-and-forth lines at the configured angle
    FixedMeander,
    /// Parallel back-and-forth lines at an angle drawn once per color
    RandomMeander,
    /// Two meander passes, the second rotated by 90 degrees
    CrossedMeander,
    /// Concentric rings around the hatch origin
    Circular,
    /// One continuous spiral around the hatch origin
    Spiral,
    /// Rays emanating from the hatch origin
    Radial,
}

impl HatchPattern {
    /// All patterns in UI order
    pub const ALL: [HatchPattern; 6] = [
        Self::FixedMeander,
        Self::RandomMeander,
        Self::CrossedMeander,
        Self::Circular,
        Self::Spiral,
        Self::Radial,
    ];

    /// Whether the user-supplied angle has any effect on this pattern
    pub fn uses_angle(&self) -> bool {
        matches!(self, Self::FixedMeander | Self::CrossedMeander)
    }

    /// Whether the pattern walks straight scan lines
    pub fn is_meander(&self) -> bool {
        matches!(
            self,
            Self::FixedMeander | Self::RandomMeander | Self::CrossedMeander
        )
    }
}

impl Default for HatchPattern {
    fn default() -> Self {
        Self::FixedMeander
    }
}

impl fmt::Display for HatchPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FixedMeander => write!(f, "FixedMeander"),
            Self::RandomMeander => write!(f, "RandomMeander"),
            Self::CrossedMeander => write!(f, "CrossedMeander"),
            Self::Circular => write!(f, "Circular"),
            Self::Spiral => write!(f, "Spiral"),
            Self::Radial => write!(f, "Radial"),
        }
    }
}

impl FromStr for HatchPattern {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '_', '-'], "").as_str() {
            "fixedmeander" => Ok(Self::FixedMeander),
            "randommeander" => Ok(Self::RandomMeander),
            "crossedmeander" => Ok(Self::CrossedMeander),
            "circular" => Ok(Self::Circular),
            "spiral" => Ok(Self::Spiral),
            "radial" => Ok(Self::Radial),
            _ => Err(ParseError::UnknownPattern(s.to_string())),
        }
    }
}

/// Surface the hatch is laid out for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HatchMode {
    /// Planar workpiece
    Flat,
    /// Cylinder, compensated while scanning so spacing stays uniform on the surface
    CylEquidistX,
    /// Cylinder, flat hatch wrapped onto the surface afterwards
    CylEquidistRad,
}

impl HatchMode {
    /// Whether the job targets a cylinder
    pub fn is_cylindrical(&self) -> bool {
        !matches!(self, Self::Flat)
    }
}

impl Default for HatchMode {
    fn default() -> Self {
        Self::Flat
    }
}

impl fmt::Display for HatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flat => write!(f, "Flat"),
            Self::CylEquidistX => write!(f, "CylEquidistX"),
            Self::CylEquidistRad => write!(f, "CylEquidistRad"),
        }
    }
}

impl FromStr for HatchMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "flat" => Ok(Self::Flat),
            "cylequidistx" => Ok(Self::CylEquidistX),
            "cylequidistrad" => Ok(Self::CylEquidistRad),
            _ => Err(ParseError::UnknownHatchMode(s.to_string())),
        }
    }
}

/// Motion smoothing applied to finished polylines before export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostProcessingMode {
    /// Leave polylines untouched
    None,
    /// Merge nearly collinear points
    MaximizeLines,
    /// Laser-off run-in and run-out around every stroke
    ConstantDrive,
    /// Run-in and run-out plus speed-dependent endpoint shift
    OverDrive,
}

impl PostProcessingMode {
    /// Whether the mode synthesizes acceleration segments
    pub fn is_drive_mode(&self) -> bool {
        matches!(self, Self::ConstantDrive | Self::OverDrive)
    }
}

impl Default for PostProcessingMode {
    fn default() -> Self {
        Self::None
    }
}

impl fmt::Display for PostProcessingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::MaximizeLines => write!(f, "Maximize Lines"),
            Self::ConstantDrive => write!(f, "Constant Drive"),
            Self::OverDrive => write!(f, "Over Drive"),
        }
    }
}

impl FromStr for PostProcessingMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['_', '-'], " ").as_str() {
            "none" => Ok(Self::None),
            "maximize lines" | "maximizelines" => Ok(Self::MaximizeLines),
            "constant drive" | "constantdrive" => Ok(Self::ConstantDrive),
            "over drive" | "overdrive" => Ok(Self::OverDrive),
            _ => Err(ParseError::UnknownPostProcessing(s.to_string())),
        }
    }
}

/// Laser power regulation of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaserMode {
    /// Fixed power while the beam is on (M3)
    Constant,
    /// Power scaled with actual feed (M4)
    Variable,
}

impl Default for LaserMode {
    fn default() -> Self {
        Self::Constant
    }
}

impl fmt::Display for LaserMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant => write!(f, "constant"),
            Self::Variable => write!(f, "variable"),
        }
    }
}

impl FromStr for LaserMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "constant" | "m3" => Ok(Self::Constant),
            "variable" | "m4" => Ok(Self::Variable),
            _ => Err(ParseError::UnknownLaserMode(s.to_string())),
        }
    }
}
