//! Plain data carried between planning stages.

use serde::{Deserialize, Serialize};

use crate::polyline::Polyline;

/// A named place with coordinates (a base, a community, a destination).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub fn new(id: impl Into<String>, name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lat,
            lng,
        }
    }

    /// Coordinates as (lat, lng).
    pub fn coords(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

/// One request to the directions provider.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub origin: Location,
    pub destination: Location,
    pub stops: Vec<Location>,
    /// Ask the provider to reorder `stops`.
    pub optimize: bool,
}

impl RouteRequest {
    /// Direct origin → destination request without intermediate stops.
    pub fn direct(origin: Location, destination: Location) -> Self {
        Self {
            origin,
            destination,
            stops: Vec::new(),
            optimize: false,
        }
    }
}

/// One driven segment between consecutive points of a route.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Leg {
    pub distance_m: u64,
    pub duration_s: u64,
    pub distance_text: String,
    pub duration_text: String,
    pub start_address: Option<String>,
    pub end_address: Option<String>,
}

impl Leg {
    pub fn new(distance_m: u64, duration_s: u64) -> Self {
        Self {
            distance_m,
            duration_s,
            distance_text: crate::legs::format_km(distance_m),
            duration_text: crate::legs::format_duration(duration_s),
            start_address: None,
            end_address: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteStatus {
    Ok,
}

/// Normalized provider answer for one [`RouteRequest`].
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResult {
    pub legs: Vec<Leg>,
    /// Visiting order as indices into the request's `stops`.
    pub waypoint_order: Vec<usize>,
    /// Sampled overview geometry of the driven path.
    pub path: Polyline,
    pub status: RouteStatus,
}

impl RouteResult {
    pub fn total_distance_m(&self) -> u64 {
        self.legs.iter().map(|leg| leg.distance_m).sum()
    }

    pub fn total_duration_s(&self) -> u64 {
        self.legs.iter().map(|leg| leg.duration_s).sum()
    }

    /// Stops in the order the provider decided to visit them.
    pub fn ordered_stops<'a>(&self, stops: &'a [Location]) -> Vec<&'a Location> {
        self.waypoint_order
            .iter()
            .filter_map(|&index| stops.get(index))
            .collect()
    }
}
