//! Contour sources
//!
//! Outlines bypass the hatching engine: they are closed or open polylines
//! taken from traced image contours or from a DXF drawing, packaged as a
//! single cluster so downstream processing treats them like hatch data.

use bildhatch_core::{HatchCluster, HatchData, LineCollection, MoveType, Point, Polyline, Rgb};
use std::f64::consts::TAU;
use std::path::Path;

use crate::error::{HatchError, HatchResult};

/// Hatch type of traced image contours
pub const IMAGE_CONTOURS_TYPE: &str = "Contours";
/// Hatch type of DXF imports
pub const DXF_IMPORT_TYPE: &str = "DXF_Imported";

/// Segments of a full DXF circle
const CIRCLE_SEGMENTS: usize = 100;

pub(crate) fn stroke(points: impl IntoIterator<Item = (f64, f64)>) -> Polyline {
    points
        .into_iter()
        .enumerate()
        .map(|(i, (x, y))| {
            let move_type = if i == 0 { MoveType::Jump } else { MoveType::Draw };
            Point::new(x, y, 0.0, move_type, Rgb::BLACK)
        })
        .collect()
}

fn single_cluster(polylines: Vec<Polyline>, hatch_type: &str) -> HatchData {
    let collection = LineCollection::with_polylines(Rgb::BLACK, polylines);
    HatchData::new(vec![HatchCluster::from_collections(vec![collection])], hatch_type)
}

/// Closed outlines from traced pixel contours
///
/// `contours` are pixel polygons with row 0 at the top of an image of
/// `width` x `height` pixels. The result is centered on the image and every
/// outline is closed by repeating its first point. Single-point contours
/// are skipped.
pub fn contours_from_pixels(
    contours: &[Vec<(u32, u32)>],
    width: u32,
    height: u32,
    pixel_per_mm: f64,
) -> HatchData {
    let cx = width as f64 / 2.0;
    let cy = height as f64 / 2.0;
    let to_mm = |&(px, py): &(u32, u32)| {
        (
            (px as f64 - cx) / pixel_per_mm,
            ((height as f64 - py as f64 - 1.0) - cy) / pixel_per_mm,
        )
    };

    let polylines = contours
        .iter()
        .filter(|c| c.len() >= 2)
        .map(|contour| stroke(contour.iter().chain(contour.first()).map(to_mm)))
        .collect();
    single_cluster(polylines, IMAGE_CONTOURS_TYPE)
}

fn circle_points(cx: f64, cy: f64, radius: f64) -> Vec<(f64, f64)> {
    (0..=CIRCLE_SEGMENTS)
        .map(|i| {
            let angle = TAU * (i % CIRCLE_SEGMENTS) as f64 / CIRCLE_SEGMENTS as f64;
            (cx + radius * angle.cos(), cy + radius * angle.sin())
        })
        .collect()
}

/// Counter-clockwise arc from `start_deg` to `end_deg`
fn arc_points(cx: f64, cy: f64, radius: f64, start_deg: f64, end_deg: f64) -> Vec<(f64, f64)> {
    let mut sweep = (end_deg - start_deg).rem_euclid(360.0);
    if sweep == 0.0 {
        sweep = 360.0;
    }
    let segments = ((sweep / 360.0 * CIRCLE_SEGMENTS as f64).round() as usize).max(1);
    (0..=segments)
        .map(|i| {
            let angle = (start_deg + sweep * i as f64 / segments as f64).to_radians();
            (cx + radius * angle.cos(), cy + radius * angle.sin())
        })
        .collect()
}

fn entity_points(entity_type: &dxf::entities::EntityType) -> Option<Vec<(f64, f64)>> {
    use dxf::entities::EntityType;

    match entity_type {
        EntityType::Line(line) => Some(vec![(line.p1.x, line.p1.y), (line.p2.x, line.p2.y)]),
        EntityType::LwPolyline(polyline) => {
            let mut points: Vec<(f64, f64)> = polyline.vertices.iter().map(|v| (v.x, v.y)).collect();
            // Bit 0 (value 1) indicates closed
            if polyline.flags & 1 != 0 {
                points.extend(points.first().copied());
            }
            Some(points)
        }
        EntityType::Polyline(polyline) => {
            let mut points: Vec<(f64, f64)> = polyline
                .vertices()
                .map(|v| (v.location.x, v.location.y))
                .collect();
            if polyline.flags & 1 != 0 {
                points.extend(points.first().copied());
            }
            Some(points)
        }
        EntityType::Circle(circle) => {
            Some(circle_points(circle.center.x, circle.center.y, circle.radius))
        }
        EntityType::Arc(arc) => Some(arc_points(
            arc.center.x,
            arc.center.y,
            arc.radius,
            arc.start_angle,
            arc.end_angle,
        )),
        _ => None,
    }
}

/// Outlines from the entities of a DXF drawing
///
/// Lines, polylines, circles and arcs are read in drawing units (mm) and
/// shifted so the bounding box starts at (0, 0).
pub fn contours_from_drawing(drawing: &dxf::Drawing) -> HatchResult<HatchData> {
    let raw: Vec<Vec<(f64, f64)>> = drawing
        .entities()
        .filter_map(|entity| entity_points(&entity.specific))
        .filter(|points| points.len() >= 2)
        .collect();

    let min_x = raw.iter().flatten().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let min_y = raw.iter().flatten().map(|p| p.1).fold(f64::INFINITY, f64::min);
    if !min_x.is_finite() || !min_y.is_finite() {
        return Err(HatchError::NoHatchProduced(
            "no supported geometry in DXF drawing".to_string(),
        ));
    }

    tracing::debug!("Imported {} DXF outline(s)", raw.len());
    let polylines = raw
        .into_iter()
        .map(|points| stroke(points.into_iter().map(|(x, y)| (x - min_x, y - min_y))))
        .collect();
    Ok(single_cluster(polylines, DXF_IMPORT_TYPE))
}

/// Outlines from a DXF file
pub fn contours_from_dxf<P: AsRef<Path>>(path: P) -> HatchResult<HatchData> {
    let mut file = std::fs::File::open(path.as_ref())?;
    let drawing = dxf::Drawing::load(&mut file)?;
    contours_from_drawing(&drawing)
}
