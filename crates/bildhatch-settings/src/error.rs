//! Settings errors
//!
//! Loading a job configuration can fail on the file itself, on its syntax,
//! or on validation of the values it carries.

use bildhatch_camtools::ParameterError;
use std::io;
use thiserror::Error;

/// Failure while reading, writing or validating a configuration
#[derive(Error, Debug)]
pub enum SettingsError {
    /// A value is syntactically fine but unusable for a job
    #[error("Invalid setting '{key}': {reason}")]
    InvalidSetting { key: String, reason: String },

    /// Reading or writing the file failed
    #[error("Config file I/O failed: {0}")]
    Io(#[from] io::Error),

    /// Malformed JSON config or palette
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed TOML, including unknown mode names
    #[error("Malformed TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// The configuration could not be rendered as TOML
    #[error("Cannot write TOML: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Hatching or pricing parameters out of range
    #[error("Parameter error: {0}")]
    Parameter(#[from] ParameterError),

    /// The palette file named by the configuration is unusable
    #[error("Palette error: {0}")]
    Palette(#[from] bildhatch_core::Error),
}

/// Configuration file problems that are not value errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Only `.json` and `.toml` are read and written
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    #[error("Value out of range for '{key}': {value}")]
    ValueOutOfRange { key: String, value: String },
}

pub type SettingsResult<T> = Result<T, SettingsError>;

pub type ConfigResult<T> = Result<T, ConfigError>;
