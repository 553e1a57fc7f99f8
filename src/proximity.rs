//! On-route stop detection.
//!
//! A candidate is "on route" when its distance to the driven path is within
//! the corridor width. Matches are returned in direction of travel.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::haversine::haversine_m;
use crate::model::Location;
use crate::traits::{DistanceToPath, PathProximity};

/// Default corridor half-width around the path.
pub const DEFAULT_CORRIDOR_M: f64 = 1000.0;

/// Meters per degree of latitude at the equator.
///
/// Applied to longitude as well, so corridors get narrower east-west the
/// further the route is from the equator.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// A candidate that fell inside the corridor.
#[derive(Debug, Clone, PartialEq)]
pub struct StopCandidate {
    pub location: Location,
    /// Index of the nearest path sample (or segment start).
    pub nearest_index: usize,
    pub nearest_distance_m: f64,
}

/// Minimum great-circle distance to any path vertex.
#[derive(Debug, Clone, Copy, Default)]
pub struct VertexSampling;

impl DistanceToPath for VertexSampling {
    fn nearest(&self, point: (f64, f64), path: &[(f64, f64)]) -> Option<PathProximity> {
        let mut best: Option<PathProximity> = None;
        for (index, &sample) in path.iter().enumerate() {
            let distance_m = haversine_m(point, sample);
            if best.is_none_or(|b| distance_m < b.distance_m) {
                best = Some(PathProximity { index, distance_m });
            }
        }
        best
    }
}

/// Exact point-to-segment distance in coordinate space.
///
/// Works in degrees and converts with [`METERS_PER_DEGREE`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentTolerance;

impl DistanceToPath for SegmentTolerance {
    fn nearest(&self, point: (f64, f64), path: &[(f64, f64)]) -> Option<PathProximity> {
        match path {
            [] => None,
            [only] => Some(PathProximity {
                index: 0,
                distance_m: planar_distance(point, *only) * METERS_PER_DEGREE,
            }),
            _ => {
                let mut best: Option<PathProximity> = None;
                for (index, segment) in path.windows(2).enumerate() {
                    let degrees = point_segment_distance(point, segment[0], segment[1]);
                    let distance_m = degrees * METERS_PER_DEGREE;
                    if best.is_none_or(|b| distance_m < b.distance_m) {
                        best = Some(PathProximity { index, distance_m });
                    }
                }
                best
            }
        }
    }
}

/// Selectable metric, mirrors `PlannerConfig::metric`.
///
/// Segment distance is exact between sparse vertices, so it is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathMetric {
    Vertex,
    #[default]
    Segment,
}

impl DistanceToPath for PathMetric {
    fn nearest(&self, point: (f64, f64), path: &[(f64, f64)]) -> Option<PathProximity> {
        match self {
            PathMetric::Vertex => VertexSampling.nearest(point, path),
            PathMetric::Segment => SegmentTolerance.nearest(point, path),
        }
    }
}

fn planar_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

fn point_segment_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let length_sq = dx * dx + dy * dy;
    if length_sq == 0.0 {
        return planar_distance(p, a);
    }
    let t = (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / length_sq).clamp(0.0, 1.0);
    planar_distance(p, (a.0 + t * dx, a.1 + t * dy))
}

/// Returns the candidates lying within `threshold_m` of `path`, ordered by
/// their position along the path.
///
/// Candidates sharing a nearest index keep their input order.
pub fn stops_along_path<M>(
    path: &[(f64, f64)],
    candidates: &[Location],
    threshold_m: f64,
    metric: &M,
) -> Vec<StopCandidate>
where
    M: DistanceToPath + Sync,
{
    if path.is_empty() {
        return Vec::new();
    }

    let mut picked: Vec<StopCandidate> = candidates
        .par_iter()
        .filter_map(|candidate| {
            let proximity = metric.nearest(candidate.coords(), path)?;
            (proximity.distance_m <= threshold_m).then(|| StopCandidate {
                location: candidate.clone(),
                nearest_index: proximity.index,
                nearest_distance_m: proximity.distance_m,
            })
        })
        .collect();

    picked.sort_by_key(|candidate| candidate.nearest_index);

    debug!(
        samples = path.len(),
        candidates = candidates.len(),
        matched = picked.len(),
        "matched stops along path"
    );

    picked
}
