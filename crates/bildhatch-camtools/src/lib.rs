//! # BildHatch CAM Tools
//!
//! The hatching engine: turns a raster image into laser toolpaths, one line
//! collection per color, and prepares them for export.
//!
//! ## Pipeline
//!
//! - **Colors**: unique colors sorted brightest first
//! - **Partition**: the image is split into clusters, one per cylinder
//!   segment when engraving onto a cylinder
//! - **Patterns**: meander, circular, spiral and radial scan paths
//! - **Cylindrical**: projection of flat hatch data onto a cylinder
//! - **Worker**: background jobs with progress and cancellation
//!
//! ## Export
//!
//! - **Pricing**: speed and power per collection
//! - **Post-processing**: line merging, constant drive and over-drive
//! - **Block builder**: immutable, export-ready process blocks
//! - **Point export**: plain-text point files
//! - **Contours**: outlines from traced images and DXF drawings
//! - **Test structures**: calibration grids for speed and power
//! - **Session**: live result and block queue

pub mod block_builder;
pub mod colors;
pub mod contours;
pub mod cylindrical;
pub mod error;
pub mod image_hatcher;
pub mod partition;
pub mod patterns;
pub mod point_export;
pub mod post_processor;
pub mod pricing;
pub mod progress;
pub mod sampling;
pub mod session;
pub mod test_structures;
pub mod worker;

// Re-export commonly used items
pub use block_builder::{build_automatic_block, build_process_block, settings_from_palette};
pub use contours::{contours_from_drawing, contours_from_dxf, contours_from_pixels};
pub use error::{
    HatchError, HatchResult, ParameterError, ParameterResult, PostProcessError, PostProcessResult,
};
pub use image_hatcher::{HatchDistance, HatchOutcome, HatchParameters, ImageHatcher};
pub use point_export::{txt_lines, write_block_files};
pub use post_processor::post_process;
pub use pricing::{price, SpeedPowerSettings, ValueMode, ValueRange};
pub use session::{HatchSession, SessionChange};
pub use test_structures::{Orientation, TestStructure, TestStructureLayout};
pub use worker::{HatchWorker, JobEvent, JobHandle, JobOutcome};
