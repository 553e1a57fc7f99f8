//! Test fixtures for corridor-planner.
//!
//! Provides:
//! - A straight east-west corridor with communities on and off the route
//! - A provider that starts failing after a number of calls

#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use corridor_planner::error::RouteError;
use corridor_planner::haversine::HaversineDirections;
use corridor_planner::model::{Location, RouteRequest, RouteResult};
use corridor_planner::traits::DirectionsProvider;

pub fn base() -> Location {
    Location::new("base", "Base", 19.70, -88.70)
}

pub fn destination() -> Location {
    Location::new("dest", "Destino", 19.70, -88.50)
}

/// ~330 m north of the corridor, early along the route.
pub fn near_west() -> Location {
    Location::new("near-west", "Near West", 19.703, -88.66)
}

/// ~220 m south of the corridor, late along the route.
pub fn near_east() -> Location {
    Location::new("near-east", "Near East", 19.698, -88.55)
}

/// ~5.5 km off the corridor.
pub fn far() -> Location {
    Location::new("far", "Far", 19.75, -88.60)
}

pub fn candidates() -> Vec<Location> {
    vec![near_east(), far(), destination(), near_west()]
}

/// Thirty communities strung along the corridor, all within 100 m of it.
pub fn crowded_corridor() -> Vec<Location> {
    (0..30)
        .map(|i| {
            Location::new(
                format!("c{:02}", i),
                format!("Community {}", i),
                19.7005,
                -88.69 + i as f64 * 0.006,
            )
        })
        .collect()
}

/// Delegates to [`HaversineDirections`] until `fail_from_call`, then
/// answers every request with `error`.
pub struct FlakyProvider {
    inner: HaversineDirections,
    fail_from_call: usize,
    error: RouteError,
    calls: Cell<usize>,
    pub requests: RefCell<Vec<RouteRequest>>,
}

impl FlakyProvider {
    pub fn new(fail_from_call: usize, error: RouteError) -> Self {
        Self {
            inner: HaversineDirections::default(),
            fail_from_call,
            error,
            calls: Cell::new(0),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn reliable() -> Self {
        Self::new(usize::MAX, RouteError::Unknown("unused".into()))
    }
}

impl DirectionsProvider for FlakyProvider {
    fn directions(&self, request: &RouteRequest) -> Result<RouteResult, RouteError> {
        let call = self.calls.get();
        self.calls.set(call + 1);
        self.requests.borrow_mut().push(request.clone());

        if call >= self.fail_from_call {
            Err(self.error.clone())
        } else {
            self.inner.directions(request)
        }
    }

    fn name(&self) -> &str {
        "flaky"
    }
}
