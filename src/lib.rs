//! corridor-planner
//!
//! Route matching and feed allocation for multi-stop delivery runs: finds the
//! communities lying along a route, builds the waypoint list for a directions
//! provider, totals legs and fuel cost, and splits a limited load across the
//! stops actually visited.

pub mod error;
pub mod model;
pub mod traits;
pub mod polyline;
pub mod haversine;
pub mod proximity;
pub mod composer;
pub mod gateway;
pub mod google;
pub mod osrm;
pub mod legs;
pub mod cost;
pub mod allocation;
pub mod catalog;
pub mod config;
pub mod planner;
