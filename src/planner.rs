//! Planning actions and the session that holds their results.
//!
//! A [`Session`] hands out a [`RequestTicket`] per "plan route" action. The
//! [`Planner`] runs the action against the provider and returns a
//! [`PlannedRoute`] stamped with that ticket; the session only accepts it if
//! no newer action was started in the meantime.

use std::time::Duration;

use tracing::{info, warn};

use crate::allocation::{AllocationPlan, AllocationPolicy, AllocationTarget, allocate};
use crate::composer::compose_waypoints;
use crate::config::PlannerConfig;
use crate::cost::{CostTable, FuelSettings, RoundTripCost, cost_table, round_trip_cost};
use crate::error::PlanError;
use crate::gateway::RouteGateway;
use crate::legs::{LegSummary, aggregate_legs};
use crate::model::{Location, RouteResult};
use crate::proximity::stops_along_path;
use crate::traits::{DirectionsProvider, PositionSource};

/// How long to wait for a position fix in [`Planner::route_from_here`].
pub const LOCATE_TIMEOUT: Duration = Duration::from_secs(8);

/// Generation number of one planning action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Outcome of one successful "plan route" action.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedRoute {
    pub ticket: RequestTicket,
    pub origin: Location,
    pub destination: Location,
    /// Waypoints as sent to the provider (merge order).
    pub stops: Vec<Location>,
    pub result: RouteResult,
    /// Some stops were dropped to honor the waypoint limit.
    pub trimmed: bool,
    /// Stops found along the path, not picked manually, that survived the trim.
    pub auto_added: usize,
}

impl PlannedRoute {
    /// Stops in the order the provider will visit them.
    pub fn visiting_order(&self) -> Vec<&Location> {
        self.result.ordered_stops(&self.stops)
    }

    /// Origin, stops in visiting order, destination.
    pub fn point_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.stops.len() + 2);
        names.push(self.origin.name.clone());
        names.extend(self.visiting_order().into_iter().map(|stop| stop.name.clone()));
        names.push(self.destination.name.clone());
        names
    }

    pub fn leg_summary(&self) -> LegSummary {
        aggregate_legs(&self.result.legs, &self.point_names())
    }

    pub fn cost_table(&self, settings: &FuelSettings) -> CostTable {
        cost_table(&self.result.legs, &self.point_names(), settings)
    }

    /// One target per visited stop in visiting order, destination last.
    ///
    /// `request` supplies (demand, weight) for a location.
    pub fn allocation_targets<F>(&self, request: F) -> Vec<AllocationTarget>
    where
        F: Fn(&Location) -> (u32, u32),
    {
        self.visiting_order()
            .into_iter()
            .chain(std::iter::once(&self.destination))
            .map(|location| {
                let (demand, weight) = request(location);
                AllocationTarget::new(location.id.clone(), demand, weight)
            })
            .collect()
    }

    pub fn allocate<F>(
        &self,
        request: F,
        capacity: u32,
        policy: AllocationPolicy,
        deliver_remainder_at_end: bool,
    ) -> AllocationPlan
    where
        F: Fn(&Location) -> (u32, u32),
    {
        allocate(
            &self.allocation_targets(request),
            capacity,
            policy,
            deliver_remainder_at_end,
        )
    }
}

/// The way back from the destination, tied to the outbound route it reverses.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnTrip {
    pub outbound: RequestTicket,
    pub result: RouteResult,
}

impl ReturnTrip {
    pub fn round_trip_cost(&self, outbound: &PlannedRoute, settings: &FuelSettings) -> RoundTripCost {
        round_trip_cost(&outbound.result.legs, &self.result.legs, settings)
    }
}

/// Route state owned by one user.
#[derive(Debug, Default)]
pub struct Session {
    issued: u64,
    route: Option<PlannedRoute>,
    return_trip: Option<ReturnTrip>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a planning action; any earlier unfinished action becomes stale.
    pub fn begin(&mut self) -> RequestTicket {
        self.issued += 1;
        RequestTicket(self.issued)
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        ticket.0 == self.issued
    }

    /// Stores `planned` as the session's route unless a newer action began.
    ///
    /// A stale route is discarded and the previous route stays in place.
    pub fn commit(&mut self, planned: PlannedRoute) -> Result<&PlannedRoute, PlanError> {
        if !self.is_current(planned.ticket) {
            warn!(
                generation = planned.ticket.0,
                current = self.issued,
                "discarding superseded route"
            );
            return Err(PlanError::Superseded {
                generation: planned.ticket.0,
                current: self.issued,
            });
        }

        info!(
            generation = planned.ticket.0,
            stops = planned.stops.len(),
            trimmed = planned.trimmed,
            "route committed"
        );
        self.return_trip = None;
        Ok(self.route.insert(planned))
    }

    /// Stores a return trip if it belongs to the current route.
    pub fn commit_return(&mut self, trip: ReturnTrip) -> Result<&ReturnTrip, PlanError> {
        let current = self.route.as_ref().ok_or(PlanError::NoOutbound)?.ticket;
        if trip.outbound != current {
            warn!(
                generation = trip.outbound.0,
                current = current.0,
                "discarding return trip for a replaced route"
            );
            return Err(PlanError::Superseded {
                generation: trip.outbound.0,
                current: current.0,
            });
        }
        Ok(self.return_trip.insert(trip))
    }

    pub fn route(&self) -> Option<&PlannedRoute> {
        self.route.as_ref()
    }

    pub fn return_trip(&self) -> Option<&ReturnTrip> {
        self.return_trip.as_ref()
    }

    pub fn clear(&mut self) {
        self.route = None;
        self.return_trip = None;
    }
}

/// Runs planning actions against a directions provider.
#[derive(Debug, Clone)]
pub struct Planner<P> {
    gateway: RouteGateway<P>,
    config: PlannerConfig,
}

impl<P: DirectionsProvider> Planner<P> {
    pub fn new(provider: P, config: PlannerConfig) -> Self {
        Self {
            gateway: RouteGateway::new(provider),
            config,
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn gateway(&self) -> &RouteGateway<P> {
        &self.gateway
    }

    /// Plans origin → destination, adding every candidate within the
    /// corridor of the direct route to the manually chosen stops.
    pub fn plan_route(
        &self,
        ticket: RequestTicket,
        origin: &Location,
        destination: &Location,
        candidates: &[Location],
        manual: &[Location],
    ) -> Result<PlannedRoute, PlanError> {
        let base = self.gateway.outbound(origin, destination, &[], false)?;

        let candidates: Vec<Location> = candidates
            .iter()
            .filter(|c| c.id != destination.id)
            .cloned()
            .collect();
        let detected = stops_along_path(
            base.path.points(),
            &candidates,
            self.config.corridor_m,
            &self.config.metric,
        );

        let plan = compose_waypoints(manual, &detected, &destination.id, self.config.max_waypoints);

        let result = if plan.stops.is_empty() {
            base
        } else {
            self.gateway.outbound(origin, destination, &plan.stops, true)?
        };

        Ok(PlannedRoute {
            ticket,
            origin: origin.clone(),
            destination: destination.clone(),
            stops: plan.stops,
            result,
            trimmed: plan.trimmed,
            auto_added: plan.auto_added,
        })
    }

    /// Routes back through the outbound stops in reverse visiting order.
    pub fn plan_return(&self, outbound: &PlannedRoute) -> Result<ReturnTrip, PlanError> {
        let visited: Vec<Location> = outbound.visiting_order().into_iter().cloned().collect();
        let result = self
            .gateway
            .return_trip(&outbound.origin, &outbound.destination, &visited)?;

        Ok(ReturnTrip {
            outbound: outbound.ticket,
            result,
        })
    }

    /// Direct route from the device's current position.
    pub fn route_from_here<S: PositionSource>(
        &self,
        ticket: RequestTicket,
        source: &S,
        destination: &Location,
    ) -> Result<PlannedRoute, PlanError> {
        let (lat, lng) = source.current_position(LOCATE_TIMEOUT)?;
        let origin = Location::new("current-position", "Current position", lat, lng);
        let result = self.gateway.outbound(&origin, destination, &[], false)?;

        Ok(PlannedRoute {
            ticket,
            origin,
            destination: destination.clone(),
            stops: Vec::new(),
            result,
            trimmed: false,
            auto_added: 0,
        })
    }
}
