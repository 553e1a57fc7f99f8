//! Route requests to the directions provider and validation of what comes back.

use tracing::{info, warn};

use crate::error::RouteError;
use crate::model::{Location, RouteRequest, RouteResult};
use crate::traits::DirectionsProvider;

/// Front door to a [`DirectionsProvider`].
///
/// Every call is independent: a failed return trip leaves the outbound
/// result alone and vice versa. Errors are passed through unchanged.
#[derive(Debug, Clone)]
pub struct RouteGateway<P> {
    provider: P,
}

impl<P: DirectionsProvider> RouteGateway<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Origin → stops → destination. Optimization is only requested when
    /// there is something to reorder.
    pub fn outbound(
        &self,
        origin: &Location,
        destination: &Location,
        stops: &[Location],
        optimize: bool,
    ) -> Result<RouteResult, RouteError> {
        self.submit(&RouteRequest {
            origin: origin.clone(),
            destination: destination.clone(),
            stops: stops.to_vec(),
            optimize: optimize && !stops.is_empty(),
        })
    }

    /// Destination → origin through `visited` in reverse, never reordered.
    pub fn return_trip(
        &self,
        origin: &Location,
        destination: &Location,
        visited: &[Location],
    ) -> Result<RouteResult, RouteError> {
        self.submit(&RouteRequest {
            origin: destination.clone(),
            destination: origin.clone(),
            stops: visited.iter().rev().cloned().collect(),
            optimize: false,
        })
    }

    pub fn submit(&self, request: &RouteRequest) -> Result<RouteResult, RouteError> {
        info!(
            provider = self.provider.name(),
            origin = %request.origin.id,
            destination = %request.destination.id,
            stops = request.stops.len(),
            optimize = request.optimize,
            "requesting route"
        );

        let result = self
            .provider
            .directions(request)
            .and_then(|result| normalize(request, result));

        if let Err(err) = &result {
            warn!(provider = self.provider.name(), error = %err, "route request failed");
        }
        result
    }
}

/// Fills in an omitted waypoint order and checks the result's shape.
fn normalize(request: &RouteRequest, mut result: RouteResult) -> Result<RouteResult, RouteError> {
    let stop_count = request.stops.len();

    if result.waypoint_order.is_empty() && stop_count > 0 {
        result.waypoint_order = (0..stop_count).collect();
    }

    let mut seen = vec![false; stop_count];
    let is_permutation = result.waypoint_order.len() == stop_count
        && result
            .waypoint_order
            .iter()
            .all(|&i| i < stop_count && !std::mem::replace(&mut seen[i], true));
    if !is_permutation {
        return Err(RouteError::Unknown(format!(
            "provider returned waypoint order {:?} for {} stops",
            result.waypoint_order, stop_count
        )));
    }

    if result.legs.len() != stop_count + 1 {
        return Err(RouteError::Unknown(format!(
            "provider returned {} legs for {} stops",
            result.legs.len(),
            stop_count
        )));
    }

    Ok(result)
}
