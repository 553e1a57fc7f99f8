//! Planner settings.

use serde::{Deserialize, Serialize};

use crate::composer::DEFAULT_MAX_WAYPOINTS;
use crate::cost::FuelPriceTable;
use crate::error::ConfigError;
use crate::proximity::{DEFAULT_CORRIDOR_M, PathMetric};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Corridor half-width around the route path, in meters.
    pub corridor_m: f64,
    /// Provider waypoint limit.
    pub max_waypoints: usize,
    pub fuel_prices: FuelPriceTable,
    pub metric: PathMetric,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            corridor_m: DEFAULT_CORRIDOR_M,
            max_waypoints: DEFAULT_MAX_WAYPOINTS,
            fuel_prices: FuelPriceTable::default(),
            metric: PathMetric::Segment,
        }
    }
}

impl PlannerConfig {
    /// Parses a JSON document; omitted fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}
