//! Toolpath post-processing
//!
//! Rewrites finished polylines before export: translation by a fixed
//! offset, removal of near-collinear vertices, and the drive modes that
//! give the motion controller laser-off run-up and run-out distance around
//! every laser-on stroke.

use bildhatch_core::{
    HatchData, LineCollection, MoveType, Point, Polyline, PostProcessingMode, ProcessingSettings,
};
use std::sync::Arc;

use crate::error::{HatchResult, PostProcessError};

/// Feed of the first positioning move of a driven polyline in mm/s
pub const APPROACH_SPEED: f64 = 100.0;

/// Accumulated deviation from straight after which a vertex is kept
const MAX_MERGE_DEVIATION_DEG: f64 = 1.0;

/// Interior angle below which a vertex gets a run-out/run-in maneuver
const SHARP_VERTEX_DEG: f64 = 170.0;

/// Run-up and overshoot lengths for one feed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveProfile {
    /// Laser-off run-up/run-out in mm
    pub constant_mm: f64,
    /// Laser-on overshoot in mm, used by over drive only
    pub over_mm: f64,
}

impl DriveProfile {
    /// Profile for a feed in mm/s
    ///
    /// The overshoot is a logistic fit to calibration measurements of
    /// horizontal lines.
    pub fn for_speed(speed: f64) -> Self {
        Self {
            constant_mm: (0.04 * speed).max(1.0),
            over_mm: 0.24484 + (0.10634 - 0.24484) / (1.0 + (speed / 27.3937).powf(5.82549)),
        }
    }
}

/// Segment `a -> b` extended on both ends
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Elongation {
    /// `a` shifted back by the overshoot
    pub a_new: [f64; 3],
    /// `a_new` shifted back by the run-up
    pub a_pre: [f64; 3],
    /// `b` shifted forward by the overshoot
    pub b_new: [f64; 3],
    /// `b_new` shifted forward by the run-out
    pub b_post: [f64; 3],
}

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn norm(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

fn along(p: [f64; 3], dir: [f64; 3], len: f64) -> [f64; 3] {
    [p[0] + dir[0] * len, p[1] + dir[1] * len, p[2] + dir[2] * len]
}

/// Extend `a -> b` by `over` on both ends, then by `constant` beyond that
///
/// A zero-length segment has no direction and is returned unextended.
pub fn elongate(a: [f64; 3], b: [f64; 3], constant: f64, over: f64) -> Elongation {
    let d = sub(b, a);
    let len = norm(d);
    if len <= f64::EPSILON {
        return Elongation {
            a_new: a,
            a_pre: a,
            b_new: b,
            b_post: b,
        };
    }
    let u = [d[0] / len, d[1] / len, d[2] / len];
    let a_new = along(a, u, -over);
    let b_new = along(b, u, over);
    Elongation {
        a_new,
        a_pre: along(a_new, u, -constant),
        b_new,
        b_post: along(b_new, u, constant),
    }
}

/// Cosine of the interior angle at `b` between `b -> a` and `b -> c`
///
/// Degenerate vertices with a zero-length leg count as straight (-1).
pub fn interior_cos(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> f64 {
    let ba = sub(a, b);
    let bc = sub(c, b);
    let mag = norm(ba) * norm(bc);
    if mag <= f64::EPSILON {
        return -1.0;
    }
    (dot(ba, bc) / mag).clamp(-1.0, 1.0)
}

/// Tracks how far a polyline has turned since the last kept vertex
struct DeviationTracker {
    accumulated: f64,
    limit_cos: f64,
}

impl DeviationTracker {
    fn new() -> Self {
        Self {
            accumulated: 0.0,
            limit_cos: (180.0 - MAX_MERGE_DEVIATION_DEG).to_radians().cos(),
        }
    }

    /// Add the turn at a vertex; true when the vertex must be kept
    fn keep(&mut self, cos_interior: f64) -> bool {
        self.accumulated += std::f64::consts::PI - cos_interior.acos();
        if (std::f64::consts::PI - self.accumulated).cos() > self.limit_cos {
            self.accumulated = 0.0;
            true
        } else {
            false
        }
    }

    fn reset(&mut self) {
        self.accumulated = 0.0;
    }
}

/// Translate every point; a zero offset returns the same data
pub fn offset_data(data: &Arc<HatchData>, offset: [f64; 3]) -> Arc<HatchData> {
    if offset == [0.0, 0.0, 0.0] {
        return Arc::clone(data);
    }
    let mut shifted = HatchData::clone(data);
    for cluster in shifted.clusters.iter_mut() {
        for collection in cluster.data.iter_mut() {
            for point in collection.polylines.iter_mut().flatten() {
                *point = point.translated(offset);
            }
        }
    }
    Arc::new(shifted)
}

/// Drop vertices that deviate less than 1° (accumulated) from straight
pub fn maximize_lines(collection: &LineCollection) -> LineCollection {
    let polylines = collection
        .polylines
        .iter()
        .map(|polyline| {
            if polyline.len() < 3 {
                return polyline.clone();
            }
            let mut tracker = DeviationTracker::new();
            let mut out = Vec::with_capacity(polyline.len());
            out.push(polyline[0]);
            for w in polyline.windows(3) {
                let cos = interior_cos(w[0].position(), w[1].position(), w[2].position());
                if tracker.keep(cos) {
                    out.push(w[1]);
                }
            }
            out.push(polyline[polyline.len() - 1]);
            out
        })
        .collect();
    LineCollection::with_polylines(collection.color, polylines)
}

/// Laser-off run-up and run-out around every stroke
///
/// `over_drive` additionally stretches the laser-on part at stroke ends and
/// sharp vertices by the profile's overshoot.
fn drive_polyline(polyline: &Polyline, profile: DriveProfile, over_drive: bool) -> Polyline {
    let over = if over_drive { profile.over_mm } else { 0.0 };
    let constant = profile.constant_mm;
    let sharp_cos = SHARP_VERTEX_DEG.to_radians().cos();

    let first = polyline[0];
    let start = elongate(first.position(), polyline[1].position(), constant, 0.0);
    let mut out = vec![
        first
            .with_position(start.a_pre)
            .with_move_type(MoveType::Jump)
            .with_speed(APPROACH_SPEED),
        first,
    ];

    let mut tracker = DeviationTracker::new();
    for w in polyline.windows(3) {
        let (prev, now, next) = (w[0], w[1], w[2]);
        let cos = interior_cos(prev.position(), now.position(), next.position());

        if cos > sharp_cos {
            tracker.reset();
            let incoming = elongate(prev.position(), now.position(), constant, over);
            let outgoing = elongate(now.position(), next.position(), constant, over);
            if over_drive {
                out.push(
                    now.with_position(incoming.b_new)
                        .with_move_type(MoveType::Draw),
                );
            } else {
                out.push(now);
            }
            out.push(
                now.with_position(incoming.b_post)
                    .with_move_type(MoveType::Jump),
            );
            out.push(
                now.with_position(outgoing.a_pre)
                    .with_move_type(MoveType::Jump),
            );
            out.push(now.with_move_type(MoveType::Jump));
        } else if tracker.keep(cos) {
            out.push(now);
        }
    }

    let last = polyline[polyline.len() - 1];
    let end = elongate(
        polyline[polyline.len() - 2].position(),
        last.position(),
        constant,
        over,
    );
    if over_drive {
        out.push(last.with_position(end.b_new).with_move_type(MoveType::Draw));
    } else {
        out.push(last);
    }
    out.push(last.with_position(end.b_post).with_move_type(MoveType::Jump));
    out
}

/// Apply constant or over drive to a priced collection
///
/// The feed of the collection's first point selects the drive profile.
/// Strokes with fewer than two points are rejected before any rewrite.
pub fn drive_collection(
    collection: &LineCollection,
    over_drive: bool,
    index: usize,
) -> HatchResult<LineCollection> {
    collection.validate()?;
    let Some(first) = collection.points().next() else {
        return Ok(collection.clone());
    };
    let speed = first
        .speed
        .ok_or(PostProcessError::MissingSpeed { collection: index })?;
    let profile = DriveProfile::for_speed(speed);

    let polylines = collection
        .polylines
        .iter()
        .map(|p| drive_polyline(p, profile, over_drive))
        .collect();
    Ok(LineCollection::with_polylines(collection.color, polylines))
}

/// Offset and post-process hatch data for one process block
///
/// Drive modes check every collection for a speed and valid strokes before
/// any polyline is rewritten.
pub fn post_process(
    data: &Arc<HatchData>,
    settings: &ProcessingSettings,
) -> HatchResult<Arc<HatchData>> {
    let mode = settings.post_processing;
    if mode.is_drive_mode() {
        for (index, collection) in data.collections().enumerate() {
            if collection.is_empty() {
                continue;
            }
            collection.validate()?;
            if collection.polylines[0][0].speed.is_none() {
                return Err(PostProcessError::MissingSpeed { collection: index }.into());
            }
        }
    }

    let shifted = offset_data(data, settings.offset);
    if mode == PostProcessingMode::None {
        return Ok(shifted);
    }

    tracing::debug!("Post-processing {} collection(s): {}", shifted.collection_count(), mode);
    let mut processed = HatchData::clone(&shifted);
    let mut index = 0;
    for cluster in processed.clusters.iter_mut() {
        for collection in cluster.data.iter_mut() {
            *collection = match mode {
                PostProcessingMode::MaximizeLines => maximize_lines(collection),
                PostProcessingMode::ConstantDrive => drive_collection(collection, false, index)?,
                PostProcessingMode::OverDrive => drive_collection(collection, true, index)?,
                PostProcessingMode::None => collection.clone(),
            };
            index += 1;
        }
    }
    Ok(Arc::new(processed))
}
