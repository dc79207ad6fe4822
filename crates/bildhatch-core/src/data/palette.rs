//! Material palette module
//!
//! A palette maps reference colors to laser parameters for one
//! laser/material combination. Automatic hatching and pricing look up the
//! entry whose color is closest to the color being processed.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::Rgb;
use crate::error::{PaletteError, Result};
use crate::params::{HatchPattern, LaserMode, PostProcessingMode};

/// Parameters for one reference color
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HatchParamSet {
    /// Display name of the color
    #[serde(default)]
    pub color_name: String,
    /// Reference color
    pub color: Rgb,
    /// Line spacing in micrometers
    pub hatch_distance_um: f64,
    /// Pattern used for this color
    pub hatch_pattern: HatchPattern,
    /// Pattern angle in degrees
    #[serde(default)]
    pub hatch_angle: f64,
    /// Laser power in percent
    pub laser_power: f64,
    /// Feed in mm/s
    pub speed: f64,
}

/// Parameter sets for one laser/material combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialPalette {
    /// Palette name, usually "laser / material / type"
    pub name: String,
    /// Entries searched by color
    pub entries: Vec<HatchParamSet>,
    /// Post-processing used when exporting with this palette
    #[serde(default)]
    pub post_processing: PostProcessingMode,
    /// Laser regulation used when exporting with this palette
    #[serde(default)]
    pub laser_mode: LaserMode,
    /// Air assist on during the job
    #[serde(default = "default_true")]
    pub air_assist: bool,
    /// Enclosure fan duty in percent
    #[serde(default = "default_fan")]
    pub enclosure_fan: u8,
}

fn default_true() -> bool {
    true
}

fn default_fan() -> u8 {
    100
}

impl MaterialPalette {
    /// Create an empty palette
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
            post_processing: PostProcessingMode::default(),
            laser_mode: LaserMode::default(),
            air_assist: true,
            enclosure_fan: 100,
        }
    }

    /// Add an entry
    pub fn add_entry(&mut self, entry: HatchParamSet) {
        self.entries.push(entry);
    }

    /// Whether the palette has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry with the smallest squared RGB distance to `color`
    ///
    /// Ties resolve to the entry listed first.
    pub fn find_paramset_by_color(
        &self,
        color: Rgb,
    ) -> std::result::Result<&HatchParamSet, PaletteError> {
        self.entries
            .iter()
            .min_by_key(|entry| entry.color.distance_squared(&color))
            .ok_or_else(|| PaletteError::NoParameterFound {
                palette: self.name.clone(),
            })
    }

    /// Load a palette from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let palette: MaterialPalette =
            serde_json::from_str(&content).map_err(|e| PaletteError::LoadFailed {
                reason: format!("{}: {}", path.display(), e),
            })?;
        tracing::debug!(
            "Loaded palette '{}' with {} entries",
            palette.name,
            palette.entries.len()
        );
        Ok(palette)
    }

    /// Save the palette as pretty-printed JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
