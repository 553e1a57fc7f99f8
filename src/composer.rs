//! Merging manual and auto-detected stops into one waypoint list.

use std::collections::HashSet;

use tracing::info;

use crate::model::Location;
use crate::proximity::StopCandidate;

/// Waypoint limit of the Google Directions service.
pub const DEFAULT_MAX_WAYPOINTS: usize = 23;

/// Bounded waypoint list ready to send to the provider.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WaypointPlan {
    pub stops: Vec<Location>,
    /// Set when stops were dropped to honor the waypoint limit.
    pub trimmed: bool,
    /// Auto-detected stops not chosen manually that survived the trim.
    pub auto_added: usize,
}

/// Manual stops first, then auto stops not yet present, truncated to
/// `max_waypoints` in merge order.
///
/// Stop identity is the location id. The destination never becomes a
/// waypoint.
pub fn compose_waypoints(
    manual: &[Location],
    auto: &[StopCandidate],
    destination_id: &str,
    max_waypoints: usize,
) -> WaypointPlan {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut stops = Vec::with_capacity(manual.len() + auto.len());

    for stop in manual {
        if stop.id != destination_id && seen.insert(stop.id.as_str()) {
            stops.push(stop.clone());
        }
    }

    let manual_count = stops.len();
    for candidate in auto {
        let stop = &candidate.location;
        if stop.id != destination_id && seen.insert(stop.id.as_str()) {
            stops.push(stop.clone());
        }
    }

    let trimmed = stops.len() > max_waypoints;
    if trimmed {
        info!(
            requested = stops.len(),
            max_waypoints, "waypoint list trimmed to provider limit"
        );
        stops.truncate(max_waypoints);
    }
    let auto_added = stops.len().saturating_sub(manual_count);

    WaypointPlan {
        stops,
        trimmed,
        auto_added,
    }
}
