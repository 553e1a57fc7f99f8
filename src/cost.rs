//! Fuel cost estimation per leg and per trip.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FuelTypeError;
use crate::model::Leg;

/// Smallest efficiency accepted; anything lower is clamped to it.
pub const MIN_EFFICIENCY_KM_PER_L: f64 = 0.0001;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FuelType {
    Regular,
    Premium,
    Diesel,
}

impl FromStr for FuelType {
    type Err = FuelTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "regular" => Ok(FuelType::Regular),
            "premium" => Ok(FuelType::Premium),
            "diesel" => Ok(FuelType::Diesel),
            _ => Err(FuelTypeError(s.to_string())),
        }
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FuelType::Regular => "regular",
            FuelType::Premium => "premium",
            FuelType::Diesel => "diesel",
        };
        f.write_str(name)
    }
}

/// Price per liter for each fuel type (MXN).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuelPriceTable {
    pub regular: f64,
    pub premium: f64,
    pub diesel: f64,
}

impl Default for FuelPriceTable {
    fn default() -> Self {
        Self {
            regular: 24.87,
            premium: 26.73,
            diesel: 26.41,
        }
    }
}

impl FuelPriceTable {
    pub fn price(&self, fuel: FuelType) -> f64 {
        match fuel {
            FuelType::Regular => self.regular,
            FuelType::Premium => self.premium,
            FuelType::Diesel => self.diesel,
        }
    }

    /// Looks up a price by key; unknown keys are priced as regular.
    pub fn price_for_key(&self, key: &str) -> f64 {
        key.parse()
            .map(|fuel| self.price(fuel))
            .unwrap_or(self.regular)
    }
}

/// Fuel type, price and vehicle efficiency used for one costing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuelSettings {
    pub fuel: FuelType,
    pub price_per_l: f64,
    pub efficiency_km_per_l: f64,
}

impl FuelSettings {
    pub fn new(fuel: FuelType, prices: &FuelPriceTable, efficiency_km_per_l: f64) -> Self {
        Self {
            fuel,
            price_per_l: prices.price(fuel),
            efficiency_km_per_l: clamp_efficiency(efficiency_km_per_l),
        }
    }

    pub fn cost_for_km(&self, distance_km: f64) -> f64 {
        fuel_cost(distance_km, self.efficiency_km_per_l, self.price_per_l)
    }
}

fn clamp_efficiency(efficiency_km_per_l: f64) -> f64 {
    if efficiency_km_per_l.is_nan() {
        return MIN_EFFICIENCY_KM_PER_L;
    }
    efficiency_km_per_l.max(MIN_EFFICIENCY_KM_PER_L)
}

/// `(distance / efficiency) * price`, with efficiency clamped above zero.
pub fn fuel_cost(distance_km: f64, efficiency_km_per_l: f64, price_per_l: f64) -> f64 {
    (distance_km / clamp_efficiency(efficiency_km_per_l)) * price_per_l
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostRow {
    pub number: usize,
    /// Stop reached at the end of this leg.
    pub stop: String,
    pub distance_km: f64,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CostTable {
    pub rows: Vec<CostRow>,
    pub total_km: f64,
    pub total_cost: f64,
}

/// One cost row per leg, labelled with the leg's arrival point.
///
/// `names` has the same layout as for [`crate::legs::aggregate_legs`].
pub fn cost_table(legs: &[Leg], names: &[String], settings: &FuelSettings) -> CostTable {
    let mut table = CostTable::default();

    for (i, leg) in legs.iter().enumerate() {
        let distance_km = leg.distance_m as f64 / 1000.0;
        let cost = settings.cost_for_km(distance_km);
        table.total_km += distance_km;
        table.total_cost += cost;

        let stop = names
            .get(i + 1)
            .cloned()
            .or_else(|| leg.end_address.clone())
            .unwrap_or_else(|| "—".to_string());

        table.rows.push(CostRow {
            number: i + 1,
            stop,
            distance_km,
            cost,
        });
    }

    table
}

/// Outbound plus return rollup, costed once over the combined distance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundTripCost {
    pub outbound_km: f64,
    pub return_km: f64,
    pub total_km: f64,
    pub total_minutes: f64,
    pub cost: f64,
}

pub fn round_trip_cost(outbound: &[Leg], inbound: &[Leg], settings: &FuelSettings) -> RoundTripCost {
    let km = |legs: &[Leg]| legs.iter().map(|leg| leg.distance_m).sum::<u64>() as f64 / 1000.0;
    let minutes = |legs: &[Leg]| legs.iter().map(|leg| leg.duration_s).sum::<u64>() as f64 / 60.0;

    let outbound_km = km(outbound);
    let return_km = km(inbound);
    let total_km = outbound_km + return_km;

    RoundTripCost {
        outbound_km,
        return_km,
        total_km,
        total_minutes: minutes(outbound) + minutes(inbound),
        cost: settings.cost_for_km(total_km),
    }
}
