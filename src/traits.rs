//! Seams to the outside world and between interchangeable algorithms.
//!
//! Concrete providers live in their own modules (`google`, `osrm`,
//! `haversine`, `proximity`); apps may implement these for their own
//! backends.

use std::time::Duration;

use crate::error::{LocateError, RouteError};
use crate::model::{RouteRequest, RouteResult};

/// An external directions service.
///
/// Implementations return the raw provider answer mapped into a
/// [`RouteResult`]; [`crate::gateway::RouteGateway`] validates it.
pub trait DirectionsProvider {
    fn directions(&self, request: &RouteRequest) -> Result<RouteResult, RouteError>;

    /// Provider name for logging.
    fn name(&self) -> &str;
}

/// Nearest approach of a point to a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathProximity {
    /// Index of the path sample (or segment start) closest to the point.
    pub index: usize,
    /// Distance in meters.
    pub distance_m: f64,
}

/// Distance from a point to a sampled route path.
pub trait DistanceToPath {
    /// Returns None for an empty path.
    fn nearest(&self, point: (f64, f64), path: &[(f64, f64)]) -> Option<PathProximity>;
}

/// One-shot source of the device's current position (lat, lng).
pub trait PositionSource {
    fn current_position(&self, timeout: Duration) -> Result<(f64, f64), LocateError>;
}
