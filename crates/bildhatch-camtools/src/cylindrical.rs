//! Cylindrical projection
//!
//! Wraps flat hatch data onto a cylinder whose axis runs along y. A point's
//! x is read as arc length on the circumference; the projected point keeps
//! y and drops into negative z as it moves around the cylinder.

use bildhatch_core::{GeometryError, HatchCluster, LineCollection, Point, Polyline};

/// Resampling resolution for single segments in nodes per mm of x travel
const NODES_PER_MM: f64 = 10.0;

/// Wrap one point onto a cylinder of `radius` mm
#[inline]
pub fn project_point(point: &Point, radius: f64) -> Point {
    let angle = point.x / radius;
    point.with_position([
        radius * angle.sin(),
        point.y,
        radius * angle.cos() - radius,
    ])
}

/// Split a single segment into nodes about 0.1 mm apart along x
fn resample_segment(first: &Point, second: &Point) -> Polyline {
    let nodes = ((first.x - second.x).abs() * NODES_PER_MM).max(2.0).ceil() as usize;
    (0..nodes)
        .map(|i| {
            let t = i as f64 / (nodes - 1) as f64;
            let template = if i == 0 { first } else { second };
            template.with_position([
                first.x + (second.x - first.x) * t,
                first.y + (second.y - first.y) * t,
                template.z,
            ])
        })
        .collect()
}

/// Wrap a finished collection onto a cylinder of `radius` mm
///
/// Two-point polylines are resampled first so long chords follow the
/// surface. Polylines with fewer than two points are rejected.
pub fn project_collection(
    collection: &LineCollection,
    radius: f64,
) -> Result<LineCollection, GeometryError> {
    if radius <= 0.0 || !radius.is_finite() {
        return Err(GeometryError::InvalidRadius { radius });
    }

    let polylines = collection
        .polylines
        .iter()
        .enumerate()
        .map(|(index, polyline)| match polyline.as_slice() {
            [] | [_] => Err(GeometryError::DegeneratePolyline {
                index,
                points: polyline.len(),
                required: 2,
            }),
            [first, second] => Ok(resample_segment(first, second)
                .iter()
                .map(|p| project_point(p, radius))
                .collect()),
            points => Ok(points.iter().map(|p| project_point(p, radius)).collect()),
        })
        .collect::<Result<Vec<Polyline>, _>>()?;

    Ok(LineCollection::with_polylines(collection.color, polylines))
}

/// Wrap every collection of a cluster onto its own cylinder radius
pub fn project_cluster(cluster: &mut HatchCluster) -> Result<(), GeometryError> {
    let radius = cluster.cylinder_radius;
    for collection in cluster.data.iter_mut() {
        *collection = project_collection(collection, radius)?;
    }
    Ok(())
}
