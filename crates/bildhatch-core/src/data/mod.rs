//! Data models for hatch toolpaths
//!
//! This module provides:
//! - Colors and motion tags for individual toolpath points
//! - Polylines and per-color line collections
//! - Hatch clusters (image sub-regions with their placement on the workpiece)
//! - The top-level hatch result
//! - Material palettes for automatic parameter selection
//! - Process blocks queued for export

pub mod palette;
pub mod process_block;

use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::error::GeometryError;

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Rgb {
    /// Pure white, the usual background color
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    /// Pure black
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    /// Create a color from its channels
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Sum of the three channels (0..=765)
    pub fn sum(&self) -> u32 {
        self.r as u32 + self.g as u32 + self.b as u32
    }

    /// Mean channel value, used against white thresholds
    pub fn mean(&self) -> f64 {
        self.sum() as f64 / 3.0
    }

    /// Whether the color is bright enough to be treated as background
    pub fn exceeds_white_threshold(&self, threshold: f64) -> bool {
        self.mean() > threshold
    }

    /// Pack into `0x00RRGGBB`
    pub fn packed(&self) -> u32 {
        (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    /// Unpack from `0x00RRGGBB`
    pub fn from_packed(value: u32) -> Self {
        Self::new((value >> 16) as u8, (value >> 8) as u8, value as u8)
    }

    /// Squared euclidean distance in RGB space
    pub fn distance_squared(&self, other: &Rgb) -> u32 {
        let dr = self.r as i32 - other.r as i32;
        let dg = self.g as i32 - other.g as i32;
        let db = self.b as i32 - other.b as i32;
        (dr * dr + dg * dg + db * db) as u32
    }

    /// Channels as an array
    pub fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(value: [u8; 3]) -> Self {
        Self::new(value[0], value[1], value[2])
    }
}

impl From<image::Rgb<u8>> for Rgb {
    fn from(value: image::Rgb<u8>) -> Self {
        Self::from(value.0)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Motion type of a toolpath point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MoveType {
    /// Laser-off positioning move
    #[default]
    Jump = 0,
    /// Laser-on cutting move
    Draw = 1,
}

impl MoveType {
    /// Whether the laser fires during this move
    pub fn is_draw(&self) -> bool {
        matches!(self, Self::Draw)
    }

    /// Flag written by the plain-text point export (1 = laser off)
    pub fn jump_flag(&self) -> u8 {
        match self {
            Self::Jump => 1,
            Self::Draw => 0,
        }
    }
}

/// One toolpath node
///
/// Coordinates are millimeters relative to the hatch origin. Points are
/// values: derive modified copies with the `with_*` builders instead of
/// mutating a point that is already part of a polyline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X position in mm
    pub x: f64,
    /// Y position in mm
    pub y: f64,
    /// Z position in mm
    pub z: f64,
    /// Positioning or cutting move
    pub move_type: MoveType,
    /// Color of the region the point was hatched from
    pub color: Rgb,
    /// Feed in mm/s, assigned by pricing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    /// Laser power in percent, assigned by pricing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<f64>,
}

impl Point {
    /// Create a point without speed or power
    pub fn new(x: f64, y: f64, z: f64, move_type: MoveType, color: Rgb) -> Self {
        Self {
            x,
            y,
            z,
            move_type,
            color,
            speed: None,
            power: None,
        }
    }

    /// Positioning move to a planar location
    pub fn jump(x: f64, y: f64, color: Rgb) -> Self {
        Self::new(x, y, 0.0, MoveType::Jump, color)
    }

    /// Cutting move to a planar location
    pub fn draw(x: f64, y: f64, color: Rgb) -> Self {
        Self::new(x, y, 0.0, MoveType::Draw, color)
    }

    /// Position as an array
    pub fn position(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Copy moved to a new position
    pub fn with_position(self, position: [f64; 3]) -> Self {
        Self {
            x: position[0],
            y: position[1],
            z: position[2],
            ..self
        }
    }

    /// Copy with a different motion type
    pub fn with_move_type(self, move_type: MoveType) -> Self {
        Self { move_type, ..self }
    }

    /// Copy with a different feed
    pub fn with_speed(self, speed: f64) -> Self {
        Self {
            speed: Some(speed),
            ..self
        }
    }

    /// Copy with a different laser power
    pub fn with_power(self, power: f64) -> Self {
        Self {
            power: Some(power),
            ..self
        }
    }

    /// Copy translated by an offset
    pub fn translated(self, offset: [f64; 3]) -> Self {
        Self {
            x: self.x + offset[0],
            y: self.y + offset[1],
            z: self.z + offset[2],
            ..self
        }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// One continuous laser stroke: a jump followed by draws
pub type Polyline = Vec<Point>;

/// Reverse a polyline in place, keeping the jump at the new start
pub fn reverse_polyline(polyline: &mut Polyline) {
    polyline.reverse();
    let last = polyline.len().saturating_sub(1);
    for (i, point) in polyline.iter_mut().enumerate() {
        if i == 0 {
            point.move_type = MoveType::Jump;
        } else if i == last {
            point.move_type = MoveType::Draw;
        }
    }
}

/// Polylines of a single color produced by one pattern pass
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LineCollection {
    /// Color shared by every point of the collection
    pub color: Rgb,
    /// Strokes in walk order
    pub polylines: Vec<Polyline>,
}

impl LineCollection {
    /// Create an empty collection for a color
    pub fn new(color: Rgb) -> Self {
        Self {
            color,
            polylines: Vec::new(),
        }
    }

    /// Create a collection from existing strokes
    pub fn with_polylines(color: Rgb, polylines: Vec<Polyline>) -> Self {
        Self { color, polylines }
    }

    /// Number of polylines
    pub fn len(&self) -> usize {
        self.polylines.len()
    }

    /// Whether the collection holds no polylines
    pub fn is_empty(&self) -> bool {
        self.polylines.is_empty()
    }

    /// Total number of points over all polylines
    pub fn point_count(&self) -> usize {
        self.polylines.iter().map(Vec::len).sum()
    }

    /// Iterate every point in walk order
    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.polylines.iter().flatten()
    }

    /// Check the stroke invariants: at least two points, jump first, draws after
    pub fn validate(&self) -> Result<(), GeometryError> {
        for (index, polyline) in self.polylines.iter().enumerate() {
            if polyline.len() < 2 {
                return Err(GeometryError::DegeneratePolyline {
                    index,
                    points: polyline.len(),
                    required: 2,
                });
            }
            if polyline[0].move_type != MoveType::Jump {
                return Err(GeometryError::MissingJump { index });
            }
        }
        Ok(())
    }

    /// Append the polylines of another collection
    pub fn extend(&mut self, other: LineCollection) {
        self.polylines.extend(other.polylines);
    }
}

/// Placement of a cluster relative to the whole workpiece
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RefPosition {
    /// X offset in mm
    pub x: f64,
    /// Y offset in mm
    pub y: f64,
    /// Z offset in mm
    pub z: f64,
    /// Rotation of the cylinder axis in degrees
    pub rotation: f64,
}

impl RefPosition {
    /// Placement that only rotates the cylinder
    pub fn rotated(rotation: f64) -> Self {
        Self {
            rotation,
            ..Self::default()
        }
    }
}

/// Image sub-region hatched as a unit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HatchCluster {
    /// One collection per hatched color, brightest color first
    pub data: Vec<LineCollection>,
    /// Pixels of this region, row 0 at the top
    #[serde(skip)]
    pub input_matrix: Option<Arc<RgbImage>>,
    /// Where the cluster sits on the workpiece
    pub ref_position: RefPosition,
    /// Hatch origin in pixel coordinates of `input_matrix`
    pub cluster_center_for_hatch: (f64, f64),
    /// Cylinder radius in mm, 0 for flat work
    pub cylinder_radius: f64,
}

impl HatchCluster {
    /// Create a cluster over a pixel region with no hatch data yet
    pub fn new(matrix: Arc<RgbImage>, origin: (f64, f64)) -> Self {
        Self {
            data: Vec::new(),
            input_matrix: Some(matrix),
            ref_position: RefPosition::default(),
            cluster_center_for_hatch: origin,
            cylinder_radius: 0.0,
        }
    }

    /// Create a cluster holding precomputed line collections only
    pub fn from_collections(data: Vec<LineCollection>) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    /// Pixel dimensions of the region, `(0, 0)` without a matrix
    pub fn dimensions(&self) -> (u32, u32) {
        self.input_matrix
            .as_ref()
            .map(|m| m.dimensions())
            .unwrap_or((0, 0))
    }

    /// Total number of points
    pub fn point_count(&self) -> usize {
        self.data.iter().map(LineCollection::point_count).sum()
    }
}

/// Complete result of a hatching or contour run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HatchData {
    /// Clusters in physical order on the workpiece
    pub clusters: Vec<HatchCluster>,
    /// Human readable description of how the data was generated
    #[serde(rename = "type")]
    pub hatch_type: String,
}

impl HatchData {
    /// Create a result from clusters
    pub fn new(clusters: Vec<HatchCluster>, hatch_type: impl Into<String>) -> Self {
        Self {
            clusters,
            hatch_type: hatch_type.into(),
        }
    }

    /// Iterate every line collection of every cluster
    pub fn collections(&self) -> impl Iterator<Item = &LineCollection> {
        self.clusters.iter().flat_map(|c| c.data.iter())
    }

    /// Number of line collections over all clusters
    pub fn collection_count(&self) -> usize {
        self.clusters.iter().map(|c| c.data.len()).sum()
    }

    /// Total number of points
    pub fn point_count(&self) -> usize {
        self.clusters.iter().map(HatchCluster::point_count).sum()
    }

    /// Whether no cluster carries any polyline
    pub fn is_empty(&self) -> bool {
        self.collections().all(LineCollection::is_empty)
    }
}
