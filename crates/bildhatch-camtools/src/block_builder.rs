//! Process block assembly
//!
//! Turns the live hatch result into an immutable, export-ready block:
//! pricing, then offset, then post-processing. The live data is never
//! modified.

use bildhatch_core::{HatchData, MaterialPalette, ProcessBlock, ProcessingSettings};
use std::sync::Arc;

use crate::error::HatchResult;
use crate::post_processor::post_process;
use crate::pricing::{price, SpeedPowerSettings};

/// Machine settings stored on a palette, with a job specific offset
pub fn settings_from_palette(
    palette: &MaterialPalette,
    offset: [f64; 3],
    iterations: u32,
) -> ProcessingSettings {
    ProcessingSettings {
        post_processing: palette.post_processing,
        laser_mode: palette.laser_mode,
        air_assist: palette.air_assist,
        enclosure_fan: palette.enclosure_fan,
        offset,
        iterations,
    }
}

/// Build a block from hatch data
pub fn build_process_block(
    data: &HatchData,
    pricing: &SpeedPowerSettings,
    palette: Option<&MaterialPalette>,
    settings: ProcessingSettings,
) -> HatchResult<ProcessBlock> {
    let priced = Arc::new(price(data, pricing, palette)?);
    let processed = post_process(&priced, &settings)?;
    let block = ProcessBlock::new(processed, settings);
    tracing::info!(
        "Built process block {} ({}), {} point(s)",
        block.id,
        block.label(),
        block.data.point_count()
    );
    Ok(block)
}

/// Build a block entirely from a palette: values, drive mode and machine state
pub fn build_automatic_block(
    data: &HatchData,
    palette: &MaterialPalette,
    white_threshold: f64,
    offset: [f64; 3],
) -> HatchResult<ProcessBlock> {
    build_process_block(
        data,
        &SpeedPowerSettings::from_palette(white_threshold),
        Some(palette),
        settings_from_palette(palette, offset, 1),
    )
}
