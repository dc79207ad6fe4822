//! # BildHatch Core
//!
//! Core types for BildHatch.
//! Provides the toolpath data model, mode selections, material palettes,
//! process blocks and the cancellation primitive shared by all crates.

pub mod cancel;
pub mod data;
pub mod error;
pub mod params;
pub mod types;

pub use cancel::CancellationToken;

pub use data::{
    palette::{HatchParamSet, MaterialPalette},
    process_block::{ProcessBlock, ProcessingSettings},
    reverse_polyline, HatchCluster, HatchData, LineCollection, MoveType, Point, Polyline,
    RefPosition, Rgb,
};

pub use error::{Error, GeometryError, PaletteError, ParseError, Result};

pub use params::{HatchMode, HatchPattern, LaserMode, PostProcessingMode};

// Shared job slot
pub use types::{thread_safe_none, ThreadSafeOption};
