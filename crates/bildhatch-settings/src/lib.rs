//! BildHatch Settings Crate
//!
//! Handles the persisted job configuration: hatching parameters, pricing,
//! machine processing settings and the material palette to use.

pub mod config;
pub mod error;

pub use config::Config;
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
