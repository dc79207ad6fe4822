//! # BildHatch
//!
//! Raster image hatching for laser engravers on flat and cylindrical work.
//!
//! ## Architecture
//!
//! BildHatch is organized into modular crates:
//!
//! 1. **bildhatch-core** - Toolpath data model, mode types, palettes, cancellation
//! 2. **bildhatch-camtools** - Hatching engine, cylinder projection, drive modes, jobs
//! 3. **bildhatch-settings** - Persisted job configuration
//!
//! This crate ties them together behind a command line front end.

pub mod cli;

pub use bildhatch_core::{
    CancellationToken, HatchCluster, HatchData, HatchMode, HatchPattern, LaserMode,
    LineCollection, MaterialPalette, MoveType, Point, PostProcessingMode, ProcessBlock,
    ProcessingSettings, Rgb,
};

pub use bildhatch_camtools::{
    build_automatic_block, build_process_block, contours_from_dxf, post_process, price,
    txt_lines, write_block_files, HatchDistance, HatchError, HatchParameters, HatchSession,
    HatchWorker, ImageHatcher, JobEvent, JobOutcome, SessionChange, SpeedPowerSettings,
};

pub use bildhatch_settings::{Config, SettingsError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Cargo profile the binary was built with
pub const BUILD_PROFILE: &str = env!("BUILD_PROFILE");

/// Initialize logging with the default configuration
///
/// Human readable output on stderr, filtered by `RUST_LOG` with `info` as
/// the default level.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_names(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
