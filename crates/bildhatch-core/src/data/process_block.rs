//! Process blocks
//!
//! A process block is one queued job step: finished toolpath data plus the
//! machine settings it is exported with. The toolpath is held behind an
//! `Arc` so queued blocks never observe later edits to the live result and
//! cloning a block does not copy its point data.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::HatchData;
use crate::params::{LaserMode, PostProcessingMode};

/// Machine settings applied when a block is built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingSettings {
    /// Motion smoothing applied to every polyline
    pub post_processing: PostProcessingMode,
    /// Laser regulation
    pub laser_mode: LaserMode,
    /// Air assist on during the block
    pub air_assist: bool,
    /// Enclosure fan duty in percent
    pub enclosure_fan: u8,
    /// Translation in mm applied to every point
    pub offset: [f64; 3],
    /// Number of times the block is executed
    pub iterations: u32,
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            post_processing: PostProcessingMode::None,
            laser_mode: LaserMode::Constant,
            air_assist: true,
            enclosure_fan: 100,
            offset: [0.0, 0.0, 0.0],
            iterations: 1,
        }
    }
}

/// Immutable, export-ready job step
#[derive(Debug, Clone)]
pub struct ProcessBlock {
    /// Identity of the block within a queue
    pub id: Uuid,
    /// Processed toolpath
    pub data: Arc<HatchData>,
    /// Settings the block was built with
    pub settings: ProcessingSettings,
}

impl ProcessBlock {
    /// Wrap processed data
    pub fn new(data: Arc<HatchData>, settings: ProcessingSettings) -> Self {
        Self {
            id: Uuid::new_v4(),
            data,
            settings,
        }
    }

    /// Queue label, e.g. `"2x Image: Spiral with Fixed Lines"`
    pub fn label(&self) -> String {
        format!("{}x {}", self.settings.iterations, self.data.hatch_type)
    }

    /// Header line describing the machine state of the block
    pub fn summary(&self) -> String {
        format!(
            "Process Block: {} | Laser Mode: {} | Air Assist: {} | Enclosure Fan: {}%",
            self.settings.post_processing,
            self.settings.laser_mode,
            if self.settings.air_assist { "on" } else { "off" },
            self.settings.enclosure_fan
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_uses_iterations_and_type() {
        let data = Arc::new(HatchData::new(Vec::new(), "Contours"));
        let block = ProcessBlock::new(
            data,
            ProcessingSettings {
                iterations: 3,
                ..ProcessingSettings::default()
            },
        );
        assert_eq!(block.label(), "3x Contours");
    }

    #[test]
    fn test_clone_shares_data() {
        let data = Arc::new(HatchData::new(Vec::new(), "x"));
        let block = ProcessBlock::new(Arc::clone(&data), ProcessingSettings::default());
        let copy = block.clone();
        assert!(Arc::ptr_eq(&block.data, &copy.data));
        assert_eq!(copy.id, block.id);
    }

    #[test]
    fn test_summary() {
        let block = ProcessBlock::new(
            Arc::new(HatchData::default()),
            ProcessingSettings {
                post_processing: PostProcessingMode::OverDrive,
                air_assist: false,
                enclosure_fan: 40,
                ..ProcessingSettings::default()
            },
        );
        assert_eq!(
            block.summary(),
            "Process Block: Over Drive | Laser Mode: constant | Air Assist: off | Enclosure Fan: 40%"
        );
    }
}
