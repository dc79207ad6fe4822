//! Speed and power assignment
//!
//! Hatch data leaves the engine without feeds or laser power. Pricing
//! assigns both per line collection from the collection's color, the
//! collection's position (for test structures) or a material palette.

use bildhatch_core::{HatchData, LineCollection, MaterialPalette, PaletteError};
use serde::{Deserialize, Serialize};

use crate::error::{HatchResult, ParameterError};

/// How a value is derived for a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueMode {
    /// Always the maximum
    #[default]
    Constant,
    /// Interpolated by color brightness
    ColorScaled,
    /// Grid of values over consecutive collections, for calibration plates
    TestStructure,
    /// Taken from the nearest palette entry
    Palette,
}

/// Limits and mode for one value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    /// Derivation mode
    pub mode: ValueMode,
    /// Lower limit
    pub min: f64,
    /// Upper limit
    pub max: f64,
    /// Number of distinct steps in a test structure
    pub structure_count: u32,
}

impl ValueRange {
    fn validate(&self, name: &str) -> Result<(), ParameterError> {
        if !(self.min >= 0.0 && self.min <= self.max) {
            return Err(ParameterError::InvalidValue {
                name: name.to_string(),
                reason: format!("range {}..{} is empty or negative", self.min, self.max),
            });
        }
        if self.mode == ValueMode::TestStructure && self.structure_count == 0 {
            return Err(ParameterError::OutOfRange {
                name: format!("{name}.structure_count"),
                value: 0.0,
                min: 1.0,
                max: f64::from(u32::MAX),
            });
        }
        Ok(())
    }
}

/// Speed and power settings applied when building a process block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedPowerSettings {
    /// Laser power in percent
    pub power: ValueRange,
    /// Feed in mm/s
    pub speed: ValueRange,
    /// Collections with a mean channel value above this are dropped
    pub white_threshold: f64,
}

impl Default for SpeedPowerSettings {
    fn default() -> Self {
        Self {
            power: ValueRange {
                mode: ValueMode::Constant,
                min: 10.0,
                max: 100.0,
                structure_count: 1,
            },
            speed: ValueRange {
                mode: ValueMode::Constant,
                min: 10.0,
                max: 50.0,
                structure_count: 1,
            },
            white_threshold: 254.0,
        }
    }
}

impl SpeedPowerSettings {
    /// Settings that take both values from a palette
    pub fn from_palette(white_threshold: f64) -> Self {
        let mut settings = Self {
            white_threshold,
            ..Self::default()
        };
        settings.power.mode = ValueMode::Palette;
        settings.speed.mode = ValueMode::Palette;
        settings
    }

    /// Whether a palette is needed
    pub fn uses_palette(&self) -> bool {
        self.power.mode == ValueMode::Palette || self.speed.mode == ValueMode::Palette
    }

    /// Check ranges
    pub fn validate(&self) -> Result<(), ParameterError> {
        self.power.validate("power")?;
        self.speed.validate("speed")
    }
}

/// Power for the collection at `index` of a cluster, before palette lookup
fn scaled_power(range: &ValueRange, speed_count: u32, sum: f64, index: usize) -> f64 {
    match range.mode {
        ValueMode::Constant | ValueMode::Palette => range.max,
        ValueMode::ColorScaled => (range.max - (range.max - range.min) * sum / 765.0).trunc(),
        ValueMode::TestStructure => {
            if range.structure_count > 1 {
                let row = (index as f64 / speed_count.max(1) as f64).floor();
                (range.min + (range.max - range.min) * row / (range.structure_count - 1) as f64)
                    .trunc()
            } else {
                range.max
            }
        }
    }
}

/// Speed for the collection at `index` of a cluster, before palette lookup
fn scaled_speed(range: &ValueRange, sum: f64, index: usize) -> f64 {
    match range.mode {
        ValueMode::Constant | ValueMode::Palette => range.max,
        ValueMode::ColorScaled => (range.min + (range.max - range.min) * sum / 765.0).trunc(),
        ValueMode::TestStructure => {
            let count = range.structure_count;
            if count > 1 {
                let column = (index % count as usize) as f64;
                (range.min + (range.max - range.min) * column / (count - 1) as f64).trunc()
            } else {
                range.max
            }
        }
    }
}

/// Assign speed and power to a copy of `data`
///
/// Collections brighter than the white threshold are emptied in place so
/// collection indices stay stable.
pub fn price(
    data: &HatchData,
    settings: &SpeedPowerSettings,
    palette: Option<&MaterialPalette>,
) -> HatchResult<HatchData> {
    settings.validate()?;
    let palette = match (settings.uses_palette(), palette) {
        (true, None) => return Err(ParameterError::Missing("palette".to_string()).into()),
        (true, Some(p)) if p.is_empty() => {
            return Err(PaletteError::NoParameterFound {
                palette: p.name.clone(),
            }
            .into())
        }
        (_, p) => p,
    };

    let mut priced = data.clone();
    for cluster in priced.clusters.iter_mut() {
        for (index, collection) in cluster.data.iter_mut().enumerate() {
            let Some(color) = collection.points().next().map(|p| p.color) else {
                continue;
            };
            if color.exceeds_white_threshold(settings.white_threshold) {
                tracing::debug!("Dropping collection {} of color {} at pricing", index, color);
                *collection = LineCollection::new(collection.color);
                continue;
            }

            let sum = color.sum() as f64;
            let mut power =
                scaled_power(&settings.power, settings.speed.structure_count, sum, index);
            let mut speed = scaled_speed(&settings.speed, sum, index);
            if let Some(palette) = palette.filter(|_| settings.uses_palette()) {
                let entry = palette.find_paramset_by_color(color)?;
                if settings.power.mode == ValueMode::Palette {
                    power = entry.laser_power;
                }
                if settings.speed.mode == ValueMode::Palette {
                    speed = entry.speed;
                }
            }

            for point in collection.polylines.iter_mut().flatten() {
                *point = point.with_speed(speed).with_power(power);
            }
        }
    }
    Ok(priced)
}
