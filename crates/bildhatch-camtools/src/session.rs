//! Hatch session state
//!
//! Holds the live hatch result, the queue of process blocks and the active
//! palette. Every mutation reports what it changed as a list of
//! [`SessionChange`]s so callers refresh exactly the views that depend on it.

use bildhatch_core::{HatchData, MaterialPalette, ProcessBlock, ProcessingSettings};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use crate::block_builder::{build_process_block, settings_from_palette};
use crate::error::{HatchError, HatchResult, ParameterError};
use crate::point_export::write_block_files;
use crate::pricing::SpeedPowerSettings;
use crate::worker::JobOutcome;

/// A change applied to a [`HatchSession`]
#[derive(Debug, Clone, PartialEq)]
pub enum SessionChange {
    /// The live hatch result was replaced
    HatchDataReplaced {
        /// Hatch type of the new result
        hatch_type: String,
    },
    /// The live hatch result was dropped
    HatchDataCleared,
    /// A block was appended to the queue
    BlockQueued { id: Uuid },
    /// A block was removed from the queue
    BlockRemoved { id: Uuid },
    /// A block changed position
    BlockMoved { id: Uuid, from: usize, to: usize },
    /// The queue was emptied
    QueueCleared,
    /// The palette was set or removed
    PaletteChanged,
}

impl SessionChange {
    /// Short description for logging
    pub fn description(&self) -> String {
        match self {
            Self::HatchDataReplaced { hatch_type } => format!("Hatch data replaced ({hatch_type})"),
            Self::HatchDataCleared => "Hatch data cleared".to_string(),
            Self::BlockQueued { id } => format!("Block {id} queued"),
            Self::BlockRemoved { id } => format!("Block {id} removed"),
            Self::BlockMoved { id, from, to } => format!("Block {id} moved {from} -> {to}"),
            Self::QueueCleared => "Queue cleared".to_string(),
            Self::PaletteChanged => "Palette changed".to_string(),
        }
    }
}

/// Live state of one hatching session
#[derive(Debug, Default)]
pub struct HatchSession {
    hatch_data: Option<Arc<HatchData>>,
    blocks: Vec<ProcessBlock>,
    palette: Option<MaterialPalette>,
}

impl HatchSession {
    /// Create an empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Current hatch result
    pub fn hatch_data(&self) -> Option<&Arc<HatchData>> {
        self.hatch_data.as_ref()
    }

    /// Queued blocks in execution order
    pub fn blocks(&self) -> &[ProcessBlock] {
        &self.blocks
    }

    /// Active palette
    pub fn palette(&self) -> Option<&MaterialPalette> {
        self.palette.as_ref()
    }

    fn log(changes: Vec<SessionChange>) -> Vec<SessionChange> {
        for change in &changes {
            tracing::debug!("{}", change.description());
        }
        changes
    }

    /// Replace the live hatch result
    pub fn set_hatch_data(&mut self, data: HatchData) -> Vec<SessionChange> {
        let hatch_type = data.hatch_type.clone();
        self.hatch_data = Some(Arc::new(data));
        Self::log(vec![SessionChange::HatchDataReplaced { hatch_type }])
    }

    /// Drop the live hatch result
    pub fn clear_hatch_data(&mut self) -> Vec<SessionChange> {
        match self.hatch_data.take() {
            Some(_) => Self::log(vec![SessionChange::HatchDataCleared]),
            None => Vec::new(),
        }
    }

    /// Apply the outcome of a worker job
    ///
    /// Only a finished job replaces the live result. Cancelled jobs leave
    /// the session untouched, failures are handed back to the caller.
    pub fn apply_outcome(&mut self, outcome: JobOutcome) -> HatchResult<Vec<SessionChange>> {
        match outcome {
            JobOutcome::Finished(data) => Ok(self.set_hatch_data(data)),
            JobOutcome::Cancelled => Ok(Vec::new()),
            JobOutcome::Failed(err) => Err(err),
        }
    }

    /// Set or remove the palette
    pub fn set_palette(&mut self, palette: Option<MaterialPalette>) -> Vec<SessionChange> {
        if self.palette == palette {
            return Vec::new();
        }
        self.palette = palette;
        Self::log(vec![SessionChange::PaletteChanged])
    }

    /// Build a block from the live result and append it to the queue
    ///
    /// With a palette-priced configuration the palette's machine settings
    /// replace the drive mode, laser mode, air assist and fan of `processing`.
    pub fn queue_block(
        &mut self,
        pricing: &SpeedPowerSettings,
        processing: ProcessingSettings,
    ) -> HatchResult<Vec<SessionChange>> {
        let data = self
            .hatch_data
            .as_ref()
            .ok_or_else(|| HatchError::from(ParameterError::Missing("hatch data".to_string())))?;
        let settings = match (&self.palette, pricing.uses_palette()) {
            (Some(palette), true) => {
                settings_from_palette(palette, processing.offset, processing.iterations)
            }
            _ => processing,
        };
        let block = build_process_block(data, pricing, self.palette.as_ref(), settings)?;
        let id = block.id;
        self.blocks.push(block);
        Ok(Self::log(vec![SessionChange::BlockQueued { id }]))
    }

    /// Append an already built block
    pub fn push_block(&mut self, block: ProcessBlock) -> Vec<SessionChange> {
        let id = block.id;
        self.blocks.push(block);
        Self::log(vec![SessionChange::BlockQueued { id }])
    }

    /// Remove a block by id
    pub fn remove_block(&mut self, id: Uuid) -> Vec<SessionChange> {
        let before = self.blocks.len();
        self.blocks.retain(|b| b.id != id);
        if self.blocks.len() == before {
            return Vec::new();
        }
        Self::log(vec![SessionChange::BlockRemoved { id }])
    }

    /// Move a block to position `to`, clamped to the queue
    pub fn move_block(&mut self, id: Uuid, to: usize) -> Vec<SessionChange> {
        let Some(from) = self.blocks.iter().position(|b| b.id == id) else {
            return Vec::new();
        };
        let to = to.min(self.blocks.len() - 1);
        if from == to {
            return Vec::new();
        }
        let block = self.blocks.remove(from);
        self.blocks.insert(to, block);
        Self::log(vec![SessionChange::BlockMoved { id, from, to }])
    }

    /// Empty the queue
    pub fn clear_queue(&mut self) -> Vec<SessionChange> {
        if self.blocks.is_empty() {
            return Vec::new();
        }
        self.blocks.clear();
        Self::log(vec![SessionChange::QueueCleared])
    }

    /// Write the queue as point files
    pub fn export(&self, dir: &Path, prefix: &str) -> HatchResult<Vec<PathBuf>> {
        if self.blocks.is_empty() {
            return Err(ParameterError::Missing("process blocks".to_string()).into());
        }
        write_block_files(dir, prefix, &self.blocks)
    }
}
