//! Haversine directions provider (fallback when no routing service is reachable).
//!
//! Uses great-circle distance to estimate legs and travel time.
//! Less accurate than a road router (ignores roads) but always available.

use tracing::debug;

use crate::error::RouteError;
use crate::model::{Leg, RouteRequest, RouteResult, RouteStatus};
use crate::polyline::Polyline;
use crate::traits::DirectionsProvider;

/// Average driving speed assumption for time estimation.
const DEFAULT_SPEED_KMH: f64 = 40.0;

/// Spacing of synthesized path samples.
const DEFAULT_SAMPLE_SPACING_M: f64 = 250.0;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two (lat, lng) points in meters.
pub fn haversine_m(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lng1) = from;
    let (lat2, lng2) = to;

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c * 1000.0
}

/// Straight-line directions provider.
///
/// Keeps the requested stop order (no optimization) and synthesizes a
/// sampled path along the straight segments so corridor matching still
/// works offline.
#[derive(Debug, Clone)]
pub struct HaversineDirections {
    /// Assumed average driving speed in km/h.
    pub speed_kmh: f64,
    /// Maximum spacing between synthesized path samples, in meters.
    pub sample_spacing_m: f64,
}

impl Default for HaversineDirections {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_SPEED_KMH,
            sample_spacing_m: DEFAULT_SAMPLE_SPACING_M,
        }
    }
}

impl HaversineDirections {
    pub fn new(speed_kmh: f64) -> Self {
        Self {
            speed_kmh,
            ..Self::default()
        }
    }

    /// Convert distance in meters to travel time in seconds.
    fn meters_to_seconds(&self, meters: f64) -> u64 {
        let hours = meters / 1000.0 / self.speed_kmh.max(f64::EPSILON);
        (hours * 3600.0).round() as u64
    }

    fn densify(&self, from: (f64, f64), to: (f64, f64), out: &mut Vec<(f64, f64)>) {
        let meters = haversine_m(from, to);
        let steps = (meters / self.sample_spacing_m.max(1.0)).ceil().max(1.0) as usize;
        for step in 1..=steps {
            let t = step as f64 / steps as f64;
            out.push((from.0 + (to.0 - from.0) * t, from.1 + (to.1 - from.1) * t));
        }
    }
}

impl DirectionsProvider for HaversineDirections {
    fn directions(&self, request: &RouteRequest) -> Result<RouteResult, RouteError> {
        let mut points = vec![request.origin.coords()];
        points.extend(request.stops.iter().map(|stop| stop.coords()));
        points.push(request.destination.coords());

        if points
            .iter()
            .any(|(lat, lng)| !lat.is_finite() || !lng.is_finite() || lat.abs() > 90.0 || lng.abs() > 180.0)
        {
            return Err(RouteError::InvalidRequest("coordinate out of range".to_string()));
        }

        let mut legs = Vec::with_capacity(points.len() - 1);
        let mut path = vec![points[0]];
        for pair in points.windows(2) {
            let meters = haversine_m(pair[0], pair[1]);
            legs.push(Leg::new(meters.round() as u64, self.meters_to_seconds(meters)));
            self.densify(pair[0], pair[1], &mut path);
        }

        debug!(legs = legs.len(), samples = path.len(), "haversine directions");

        Ok(RouteResult {
            legs,
            waypoint_order: (0..request.stops.len()).collect(),
            path: Polyline::new(path),
            status: RouteStatus::Ok,
        })
    }

    fn name(&self) -> &str {
        "haversine"
    }
}
