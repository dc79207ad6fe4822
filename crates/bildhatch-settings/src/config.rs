//! Job configuration for BildHatch
//!
//! Provides configuration file handling and validation. Supports JSON and
//! TOML file formats; the default file lives in the platform config
//! directory.
//!
//! Configuration is organized into logical sections:
//! - Hatching (pattern, spacing, surface, resolution)
//! - Pricing (speed and power derivation)
//! - Processing (drive mode, laser mode, air assist, offset)
//! - Palette file for automatic mode

use bildhatch_camtools::{HatchParameters, SpeedPowerSettings};
use bildhatch_core::{MaterialPalette, ProcessingSettings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, SettingsError, SettingsResult};

/// File format, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )
            .into()),
        }
    }
}

/// Complete job configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Hatching parameters
    pub hatching: HatchParameters,
    /// Speed and power assignment
    pub pricing: SpeedPowerSettings,
    /// Machine settings of built process blocks
    pub processing: ProcessingSettings,
    /// JSON material palette for automatic mode
    pub palette_file: Option<PathBuf>,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config file location
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("bildhatch")
            .join("config.toml")
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = Format::of(path)?;
        let content = std::fs::read_to_string(path)?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load config from file, or defaults if the file does not exist
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::info!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        self.hatching.validate()?;
        self.pricing.validate()?;

        if self.processing.iterations == 0 {
            return Err(SettingsError::InvalidSetting {
                key: "processing.iterations".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        if self.processing.enclosure_fan > 100 {
            return Err(ConfigError::ValueOutOfRange {
                key: "processing.enclosure_fan".to_string(),
                value: self.processing.enclosure_fan.to_string(),
            }
            .into());
        }

        if self.processing.offset.iter().any(|v| !v.is_finite()) {
            return Err(SettingsError::InvalidSetting {
                key: "processing.offset".to_string(),
                reason: "offsets must be finite".to_string(),
            });
        }

        if self.pricing.uses_palette() && self.palette_file.is_none() {
            return Err(SettingsError::InvalidSetting {
                key: "palette_file".to_string(),
                reason: "palette based pricing needs a palette file".to_string(),
            });
        }

        Ok(())
    }

    /// Load the configured palette, if any
    ///
    /// Relative palette paths resolve against `base_dir`, usually the
    /// directory of the config file.
    pub fn load_palette(&self, base_dir: &Path) -> SettingsResult<Option<MaterialPalette>> {
        let Some(file) = &self.palette_file else {
            return Ok(None);
        };
        let path = if file.is_relative() {
            base_dir.join(file)
        } else {
            file.clone()
        };
        Ok(Some(MaterialPalette::load_from_file(&path)?))
    }
}
