//! End-to-end planning tests
//!
//! Corridor matching, waypoint composition, legs, costs and allocation over
//! the offline haversine provider.

mod fixtures;

use std::collections::HashMap;

use corridor_planner::allocation::AllocationPolicy;
use corridor_planner::catalog;
use corridor_planner::config::PlannerConfig;
use corridor_planner::cost::{FuelPriceTable, FuelSettings, FuelType};
use corridor_planner::error::{PlanError, RouteError};
use corridor_planner::haversine::{HaversineDirections, haversine_m};
use corridor_planner::model::Location;
use corridor_planner::planner::{Planner, Session};
use corridor_planner::proximity::PathMetric;

use fixtures::*;

fn ids(locations: &[&Location]) -> Vec<String> {
    locations.iter().map(|l| l.id.clone()).collect()
}

#[test]
fn test_plan_adds_stops_along_corridor_in_travel_order() {
    let planner = Planner::new(FlakyProvider::reliable(), PlannerConfig::default());
    let mut session = Session::new();

    let ticket = session.begin();
    let planned = planner
        .plan_route(ticket, &base(), &destination(), &candidates(), &[far()])
        .unwrap();
    let planned = session.commit(planned).unwrap();

    assert_eq!(ids(&planned.visiting_order()), vec!["far", "near-west", "near-east"]);
    assert_eq!(planned.auto_added, 2);
    assert!(!planned.trimmed);
    assert_eq!(planned.result.legs.len(), planned.stops.len() + 1);
    assert_eq!(
        planned.point_names(),
        vec!["Base", "Far", "Near West", "Near East", "Destino"]
    );

    // Base route first (no stops), then the route through the merged stops.
    let requests = planner.gateway().provider().requests.borrow();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].stops.is_empty());
    assert!(requests[1].optimize);
}

#[test]
fn test_plan_without_stops_reuses_base_route() {
    let planner = Planner::new(FlakyProvider::reliable(), PlannerConfig::default());
    let mut session = Session::new();

    let ticket = session.begin();
    let planned = planner
        .plan_route(ticket, &base(), &destination(), &[far()], &[])
        .unwrap();

    assert!(planned.stops.is_empty());
    assert_eq!(planned.result.legs.len(), 1);
    assert_eq!(planner.gateway().provider().requests.borrow().len(), 1);
}

#[test]
fn test_crowded_corridor_is_trimmed_to_provider_limit() {
    for metric in [PathMetric::Vertex, PathMetric::Segment] {
        let config = PlannerConfig {
            metric,
            ..PlannerConfig::default()
        };
        let planner = Planner::new(HaversineDirections::default(), config);
        let mut session = Session::new();

        let ticket = session.begin();
        let planned = planner
            .plan_route(ticket, &base(), &destination(), &crowded_corridor(), &[])
            .unwrap();

        assert_eq!(planned.stops.len(), 23);
        assert!(planned.trimmed);
        assert_eq!(planned.auto_added, 23);
        assert_eq!(planned.stops.first().unwrap().id, "c00");
        assert_eq!(planned.stops.last().unwrap().id, "c22");
        assert_eq!(planned.result.legs.len(), 24);
    }
}

#[test]
fn test_failed_plan_leaves_previous_route_in_place() {
    // Calls 0 and 1 plan the first route; the next base request fails.
    let planner = Planner::new(FlakyProvider::new(2, RouteError::QuotaExceeded), PlannerConfig::default());
    let mut session = Session::new();

    let first = session.begin();
    let planned = planner
        .plan_route(first, &base(), &destination(), &candidates(), &[])
        .unwrap();
    session.commit(planned).unwrap();

    let second = session.begin();
    let err = planner
        .plan_route(second, &base(), &destination(), &candidates(), &[])
        .unwrap_err();

    assert_eq!(err, PlanError::Route(RouteError::QuotaExceeded));
    assert_eq!(err.to_string(), "routing provider quota exceeded");
    assert_eq!(session.route().unwrap().ticket, first);
}

#[test]
fn test_return_trip_reverses_visit_order_and_rolls_up_cost() {
    let planner = Planner::new(FlakyProvider::reliable(), PlannerConfig::default());
    let mut session = Session::new();

    let ticket = session.begin();
    let planned = planner
        .plan_route(ticket, &base(), &destination(), &candidates(), &[])
        .unwrap();
    let outbound = session.commit(planned).unwrap().clone();

    let trip = planner.plan_return(&outbound).unwrap();
    let trip = session.commit_return(trip).unwrap();

    let requests = planner.gateway().provider().requests.borrow();
    let last = requests.last().unwrap();
    assert_eq!(last.origin.id, "dest");
    assert_eq!(last.destination.id, "base");
    assert!(!last.optimize);
    let reversed: Vec<&str> = last.stops.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(reversed, vec!["near-east", "near-west"]);

    let settings = FuelSettings::new(FuelType::Regular, &FuelPriceTable::default(), 12.0);
    let rollup = trip.round_trip_cost(&outbound, &settings);
    assert!((rollup.outbound_km - rollup.return_km).abs() < 0.01);
    let expected = (rollup.outbound_km + rollup.return_km) / 12.0 * 24.87;
    assert!((rollup.cost - expected).abs() < 1e-9);
}

#[test]
fn test_leg_summary_and_cost_table_agree() {
    let planner = Planner::new(HaversineDirections::default(), PlannerConfig::default());
    let mut session = Session::new();

    let ticket = session.begin();
    let planned = planner
        .plan_route(ticket, &base(), &destination(), &candidates(), &[])
        .unwrap();
    let planned = session.commit(planned).unwrap();

    let summary = planned.leg_summary();
    let settings = FuelSettings::new(FuelType::Diesel, &FuelPriceTable::default(), 10.0);
    let costs = planned.cost_table(&settings);

    assert_eq!(summary.rows.len(), costs.rows.len());
    assert_eq!(summary.start, "Base");
    assert_eq!(summary.end, "Destino");
    assert_eq!(summary.total_distance_m, planned.result.total_distance_m());
    assert_eq!(
        summary.rows.last().unwrap().accumulated_distance_m,
        summary.total_distance_m
    );
    for (row, cost) in summary.rows.iter().zip(&costs.rows) {
        assert_eq!(row.to, cost.stop);
    }
    assert!((costs.total_km - summary.total_distance_m as f64 / 1000.0).abs() < 1e-9);
}

#[test]
fn test_allocation_follows_visiting_order_with_destination_last() {
    let planner = Planner::new(HaversineDirections::default(), PlannerConfig::default());
    let mut session = Session::new();

    let ticket = session.begin();
    let planned = planner
        .plan_route(ticket, &base(), &destination(), &candidates(), &[])
        .unwrap();
    let planned = session.commit(planned).unwrap();

    let requested: HashMap<&str, (u32, u32)> =
        HashMap::from([("near-west", (10, 2)), ("near-east", (5, 1)), ("dest", (8, 1))]);
    let lookup = |location: &Location| requested.get(location.id.as_str()).copied().unwrap_or((0, 0));

    let proportional = planned.allocate(lookup, 12, AllocationPolicy::Proportional, false);
    let order: Vec<&str> = proportional.targets.iter().map(|t| t.stop_id.as_str()).collect();
    assert_eq!(order, vec!["near-west", "near-east", "dest"]);
    let delivered: Vec<u32> = proportional.targets.iter().map(|t| t.delivered).collect();
    assert_eq!(delivered, vec![6, 3, 3]);

    let fixed = planned.allocate(lookup, 10, AllocationPolicy::Fixed, true);
    let delivered: Vec<u32> = fixed.targets.iter().map(|t| t.delivered).collect();
    assert_eq!(delivered, vec![10, 0, 0]);
    assert_eq!(fixed.shortfall_count, 2);
}

#[test]
fn test_catalog_routes_only_pick_communities_inside_corridor() {
    // Vertex metric, so picks can be checked against the path samples.
    let config = PlannerConfig {
        metric: PathMetric::Vertex,
        ..PlannerConfig::default()
    };
    let planner = Planner::new(HaversineDirections::default(), config);
    let mut session = Session::new();

    for base_id in catalog::base_ids() {
        let scenario = catalog::scenario(base_id).unwrap();
        for destination in &scenario.destinations {
            let ticket = session.begin();
            let planned = planner
                .plan_route(
                    ticket,
                    &scenario.origin,
                    destination,
                    &scenario.candidates_for(&destination.id),
                    &[],
                )
                .unwrap();

            let base_route = planner
                .gateway()
                .outbound(&scenario.origin, destination, &[], false)
                .unwrap();

            for stop in &planned.stops {
                assert_ne!(stop.id, destination.id);
                let nearest = base_route
                    .path
                    .points()
                    .iter()
                    .map(|&p| haversine_m(stop.coords(), p))
                    .fold(f64::INFINITY, f64::min);
                assert!(nearest <= 1000.0, "{} is {} m off route", stop.id, nearest);
            }
            session.commit(planned).unwrap();
        }
    }
}
