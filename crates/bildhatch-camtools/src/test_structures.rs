//! Calibration test structures
//!
//! Generated toolpaths for dialing in speed and power on a new material.
//! Grid structures emit one line collection per field, row by row, so
//! pricing in [`ValueMode::TestStructure`] steps power down the rows and
//! speed across the columns. Coordinates are in mm with the first field at
//! the origin and rows growing towards negative y.
//!
//! [`ValueMode::TestStructure`]: crate::pricing::ValueMode::TestStructure

use bildhatch_core::{HatchCluster, HatchData, LineCollection, ParseError, Polyline, Rgb};
use std::fmt;
use std::str::FromStr;

use crate::contours::stroke;
use crate::error::{ParameterError, ParameterResult};
use crate::pricing::SpeedPowerSettings;

/// Node spacing along filled-square and polyline-structure lines
const NODE_DISTANCE_MM: f64 = 0.1;

/// Edge of the square contours
const CONTOUR_SIZE_MM: f64 = 10.0;
/// Node spacing of the polyline square contour
const CONTOUR_NODE_DISTANCE_MM: f64 = 2.0;

/// Gap between filled squares
const SQUARE_GAP_MM: f64 = 1.0;

/// Edge of one subfield structure field
const FIELD_SIZE_MM: f64 = 25.0;
/// Gap between subfield structure fields
const FIELD_GAP_MM: f64 = 2.0;
/// Subfields per field edge
const SUBFIELDS: usize = 5;
/// Blank margin on one side of each subfield
const SUBFIELD_GAP_MM: f64 = 1.0;
/// Line distance of the first subfield, and the increment per subfield
const SUBFIELD_SPACING_STEP_MM: f64 = 0.005;

/// Length of one polyline structure line
const POLYLINE_LENGTH_MM: f64 = 10.0;
/// Distance between neighboring polyline structure lines
const POLYLINE_SPACING_MM: f64 = 1.0;
/// Gap between polyline structure rows or columns
const POLYLINE_GAP_MM: f64 = 2.0;

/// Direction of the lines in a structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

impl Orientation {
    fn abbreviation(&self) -> &'static str {
        match self {
            Self::Vertical => "Vert.",
            Self::Horizontal => "Horz.",
        }
    }
}

/// Available calibration structures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestStructure {
    /// One 10 mm square, corners only
    SimpleSquareContour,
    /// One 10 mm square with a node every 2 mm
    PolylineSquareContour,
    /// Grid of squares filled with parallel lines
    FilledSquares(Orientation),
    /// Grid of 25 mm fields, each split into 5 x 5 subfields with line
    /// distances from 5 to 125 µm
    SubfieldStructure(Orientation),
    /// Grid of single 10 mm lines with a node every 0.1 mm
    PolylineStructure(Orientation),
}

impl TestStructure {
    /// Every structure, in menu order
    pub const ALL: [TestStructure; 8] = [
        Self::SimpleSquareContour,
        Self::PolylineSquareContour,
        Self::FilledSquares(Orientation::Vertical),
        Self::FilledSquares(Orientation::Horizontal),
        Self::SubfieldStructure(Orientation::Vertical),
        Self::SubfieldStructure(Orientation::Horizontal),
        Self::PolylineStructure(Orientation::Vertical),
        Self::PolylineStructure(Orientation::Horizontal),
    ];

    /// Hatch type recorded on the generated data
    pub fn hatch_type(&self) -> String {
        match self {
            Self::SimpleSquareContour => "Test: Simple Square Contour".to_string(),
            Self::PolylineSquareContour => "Test: Polyline Square Contour".to_string(),
            Self::FilledSquares(_) => "Test: Filled Squares".to_string(),
            Self::SubfieldStructure(_) => "Test: Subfield Structure".to_string(),
            Self::PolylineStructure(o) => {
                format!("Test: {} Polyline Structure", o.abbreviation())
            }
        }
    }

    /// Generate the structure for `layout`
    pub fn generate(&self, layout: &TestStructureLayout) -> ParameterResult<HatchData> {
        layout.validate()?;
        let collections = match *self {
            Self::SimpleSquareContour => vec![black(vec![simple_square()])],
            Self::PolylineSquareContour => vec![black(vec![polyline_square()])],
            Self::FilledSquares(o) => filled_squares(o, layout),
            Self::SubfieldStructure(o) => subfield_structure(o, layout),
            Self::PolylineStructure(o) => polyline_structure(o, layout),
        };
        let data = HatchData::new(
            vec![HatchCluster::from_collections(collections)],
            self.hatch_type(),
        );
        tracing::info!(
            "Generated {} ({} field(s), {} point(s))",
            self,
            data.collection_count(),
            data.point_count()
        );
        Ok(data)
    }
}

impl fmt::Display for TestStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SimpleSquareContour => write!(f, "Simple Square Contour"),
            Self::PolylineSquareContour => write!(f, "Polyline Square Contour"),
            Self::FilledSquares(o) => write!(f, "Filled Squares {}", o.abbreviation()),
            Self::SubfieldStructure(o) => write!(f, "{} Subfield Structure", o.abbreviation()),
            Self::PolylineStructure(o) => write!(f, "{} Polyline Structure", o.abbreviation()),
        }
    }
}

impl FromStr for TestStructure {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s
            .trim()
            .to_lowercase()
            .replace([' ', '_', '-', '.'], "")
            .replace("vertical", "vert")
            .replace("horizontal", "horz");
        let structure = match key.as_str() {
            "simplesquarecontour" => Self::SimpleSquareContour,
            "polylinesquarecontour" => Self::PolylineSquareContour,
            "filledsquaresvert" | "vertfilledsquares" => {
                Self::FilledSquares(Orientation::Vertical)
            }
            "filledsquareshorz" | "horzfilledsquares" => {
                Self::FilledSquares(Orientation::Horizontal)
            }
            "vertsubfieldstructure" => Self::SubfieldStructure(Orientation::Vertical),
            "horzsubfieldstructure" => Self::SubfieldStructure(Orientation::Horizontal),
            "vertpolylinestructure" => Self::PolylineStructure(Orientation::Vertical),
            "horzpolylinestructure" => Self::PolylineStructure(Orientation::Horizontal),
            _ => return Err(ParseError::UnknownTestStructure(s.to_string())),
        };
        Ok(structure)
    }
}

/// Grid size and fill of the grid structures
#[derive(Debug, Clone, PartialEq)]
pub struct TestStructureLayout {
    /// Rows of fields, one per power step
    pub rows: u32,
    /// Columns of fields, one per speed step
    pub columns: u32,
    /// Edge of a filled square in mm
    pub square_size_mm: f64,
    /// Line distance inside a filled square in mm
    pub line_distance_mm: f64,
}

impl Default for TestStructureLayout {
    fn default() -> Self {
        Self {
            rows: 4,
            columns: 4,
            square_size_mm: 10.0,
            line_distance_mm: 0.1,
        }
    }
}

impl TestStructureLayout {
    /// Grid matching the power and speed step counts of `pricing`
    pub fn from_pricing(pricing: &SpeedPowerSettings) -> Self {
        Self {
            rows: pricing.power.structure_count.max(1),
            columns: pricing.speed.structure_count.max(1),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> ParameterResult<()> {
        for (name, value) in [("rows", self.rows), ("columns", self.columns)] {
            if value == 0 {
                return Err(ParameterError::OutOfRange {
                    name: name.to_string(),
                    value: 0.0,
                    min: 1.0,
                    max: f64::from(u32::MAX),
                });
            }
        }
        if !(self.square_size_mm.is_finite() && self.square_size_mm > 0.0) {
            return Err(ParameterError::InvalidValue {
                name: "square_size_mm".to_string(),
                reason: format!("{} is not a positive length", self.square_size_mm),
            });
        }
        if !(self.line_distance_mm > 0.0 && self.line_distance_mm <= self.square_size_mm) {
            return Err(ParameterError::OutOfRange {
                name: "line_distance_mm".to_string(),
                value: self.line_distance_mm,
                min: 0.0,
                max: self.square_size_mm,
            });
        }
        Ok(())
    }

    /// Field positions in pricing order
    fn fields(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        (0..self.rows)
            .flat_map(move |row| (0..self.columns).map(move |col| (row as f64, col as f64)))
    }
}

fn black(polylines: Vec<Polyline>) -> LineCollection {
    LineCollection::with_polylines(Rgb::BLACK, polylines)
}

/// Whole steps of `spacing` in `length`, tolerant of float noise
fn steps(length: f64, spacing: f64) -> usize {
    (length / spacing + 1e-9).floor() as usize
}

fn simple_square() -> Polyline {
    let s = CONTOUR_SIZE_MM;
    stroke([(0.0, 0.0), (s, 0.0), (s, -s), (0.0, -s), (0.0, 0.0)])
}

fn polyline_square() -> Polyline {
    let s = CONTOUR_SIZE_MM;
    let d = CONTOUR_NODE_DISTANCE_MM;
    let nodes = steps(s, d);
    let side = |f: fn(f64) -> (f64, f64)| (1..=nodes).map(move |n| f(n as f64 * d));
    stroke(
        std::iter::once((0.0, 0.0))
            .chain(side(|t| (t, 0.0)))
            .chain(side(|t| (CONTOUR_SIZE_MM, -t)))
            .chain(side(|t| (CONTOUR_SIZE_MM - t, -CONTOUR_SIZE_MM)))
            .chain(side(|t| (0.0, -CONTOUR_SIZE_MM + t))),
    )
}

/// Straight line from `(x, y)` with `nodes` segments of `node_mm` along `(dx, dy)`
fn line(x: f64, y: f64, (dx, dy): (f64, f64), nodes: usize, node_mm: f64) -> Polyline {
    stroke((0..=nodes).map(|n| {
        let t = n as f64 * node_mm;
        (x + dx * t, y + dy * t)
    }))
}

fn filled_squares(orientation: Orientation, layout: &TestStructureLayout) -> Vec<LineCollection> {
    let size = layout.square_size_mm;
    let spacing = layout.line_distance_mm;
    let pitch = size + SQUARE_GAP_MM;
    let nodes = steps(size, NODE_DISTANCE_MM);
    let lines = steps(size, spacing);

    // alternation runs on across fields
    let mut forward = true;
    let mut collections = Vec::with_capacity((layout.rows * layout.columns) as usize);
    for (row, col) in layout.fields() {
        let left = col * pitch;
        let top = -row * pitch;
        let mut polylines = Vec::with_capacity(lines);
        for i in 0..lines {
            let offset = i as f64 * spacing;
            let sign = if forward { 1.0 } else { -1.0 };
            let polyline = match orientation {
                Orientation::Vertical => {
                    let y = if forward { top } else { top - size };
                    line(left + offset, y, (0.0, -sign), nodes, NODE_DISTANCE_MM)
                }
                Orientation::Horizontal => {
                    let x = if forward { left } else { left + size };
                    line(x, top - offset, (sign, 0.0), nodes, NODE_DISTANCE_MM)
                }
            };
            polylines.push(polyline);
            forward = !forward;
        }
        collections.push(black(polylines));
    }
    collections
}

/// Line distance of subfield `index`, 5 µm apart starting at 5 µm
fn subfield_spacing(index: usize) -> f64 {
    SUBFIELD_SPACING_STEP_MM * (index + 1) as f64
}

fn subfield_structure(
    orientation: Orientation,
    layout: &TestStructureLayout,
) -> Vec<LineCollection> {
    let pitch = FIELD_SIZE_MM + FIELD_GAP_MM;
    let sub = FIELD_SIZE_MM / SUBFIELDS as f64;
    let usable = sub - SUBFIELD_GAP_MM;

    let mut forward = true;
    let mut collections = Vec::with_capacity((layout.rows * layout.columns) as usize);
    for (row, col) in layout.fields() {
        let mut polylines = Vec::new();
        for sub_row in 0..SUBFIELDS {
            for sub_col in 0..SUBFIELDS {
                let spacing = subfield_spacing(sub_row * SUBFIELDS + sub_col);
                let left = col * pitch + sub_col as f64 * sub;
                let top = -row * pitch - sub_row as f64 * sub;
                for i in 0..steps(usable, spacing) {
                    let offset = i as f64 * spacing;
                    let sign = if forward { 1.0 } else { -1.0 };
                    let polyline = match orientation {
                        Orientation::Vertical => {
                            let y = if forward { top } else { top - usable };
                            line(left + offset, y, (0.0, -sign), 1, usable)
                        }
                        Orientation::Horizontal => {
                            let x = if forward { left } else { left + usable };
                            line(x, top - offset, (sign, 0.0), 1, usable)
                        }
                    };
                    polylines.push(polyline);
                    forward = !forward;
                }
            }
        }
        collections.push(black(polylines));
    }
    collections
}

fn polyline_structure(
    orientation: Orientation,
    layout: &TestStructureLayout,
) -> Vec<LineCollection> {
    let nodes = steps(POLYLINE_LENGTH_MM, NODE_DISTANCE_MM);
    let pitch = POLYLINE_LENGTH_MM + POLYLINE_GAP_MM;
    layout
        .fields()
        .map(|(row, col)| {
            let polyline = match orientation {
                Orientation::Vertical => {
                    // odd columns run bottom to top
                    let up = col as usize % 2 == 1;
                    let y = -row * pitch - if up { POLYLINE_LENGTH_MM } else { 0.0 };
                    let dy = if up { 1.0 } else { -1.0 };
                    line(col * POLYLINE_SPACING_MM, y, (0.0, dy), nodes, NODE_DISTANCE_MM)
                }
                Orientation::Horizontal => line(
                    col * pitch,
                    -row * POLYLINE_SPACING_MM,
                    (1.0, 0.0),
                    nodes,
                    NODE_DISTANCE_MM,
                ),
            };
            black(vec![polyline])
        })
        .collect()
}
