//! Apportioning a finite number of units (feed sacks) across route stops.
//!
//! Stops are served strictly in visiting order. Each stop's desired share is
//! decided up front by the policy; delivery then consumes capacity in a
//! single pass without revisiting earlier stops.

use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationPolicy {
    /// Every stop wants exactly its demand.
    #[default]
    Fixed,
    /// Capacity is split by weight with the largest-remainder method.
    Proportional,
}

/// A stop's request and, after [`allocate`], what it received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationTarget {
    pub stop_id: String,
    pub demand: u32,
    /// Only used by [`AllocationPolicy::Proportional`], e.g. beneficiaries.
    pub weight: u32,
    #[serde(default)]
    pub delivered: u32,
    /// Capacity left after this stop was served.
    #[serde(default)]
    pub remaining_after: u32,
    #[serde(default)]
    pub shortfall: u32,
    #[serde(default)]
    pub coverage_percent: f64,
}

impl AllocationTarget {
    pub fn new(stop_id: impl Into<String>, demand: u32, weight: u32) -> Self {
        Self {
            stop_id: stop_id.into(),
            demand,
            weight,
            delivered: 0,
            remaining_after: 0,
            shortfall: demand,
            coverage_percent: 0.0,
        }
    }

    fn record(&mut self, delivered: u32, remaining_after: u32) {
        self.delivered = delivered;
        self.remaining_after = remaining_after;
        self.shortfall = self.demand - delivered;
        self.coverage_percent = if self.demand == 0 {
            100.0
        } else {
            delivered as f64 / self.demand as f64 * 100.0
        };
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationPlan {
    pub targets: Vec<AllocationTarget>,
    pub capacity: u32,
    pub policy: AllocationPolicy,
    pub total_delivered: u32,
    /// Capacity still on the vehicle after the last stop.
    pub remaining: u32,
    pub utilization_percent: f64,
    pub shortfall_count: usize,
    /// Set when leftover capacity was handed to the final stop.
    pub topped_up: bool,
}

/// Splits `capacity` by `weights` with the largest-remainder method.
///
/// Exact integer arithmetic: each quota is `weight * capacity / Σweight`;
/// floors first, then one extra unit per stop in descending remainder order
/// (earlier stops win ties). All zeros when the weights sum to zero.
pub fn largest_remainder(weights: &[u32], capacity: u32) -> Vec<u32> {
    let total_weight: u64 = weights.iter().map(|&w| w as u64).sum();
    if total_weight == 0 {
        return vec![0; weights.len()];
    }

    let mut shares = Vec::with_capacity(weights.len());
    let mut remainders = Vec::with_capacity(weights.len());
    for &weight in weights {
        let numerator = weight as u64 * capacity as u64;
        shares.push((numerator / total_weight) as u32);
        remainders.push(numerator % total_weight);
    }

    let floored: u64 = shares.iter().map(|&s| s as u64).sum();
    let leftover = (capacity as u64).saturating_sub(floored) as usize;

    let mut order: Vec<usize> = (0..weights.len()).filter(|&i| remainders[i] > 0).collect();
    order.sort_by(|&a, &b| remainders[b].cmp(&remainders[a]));
    for &index in order.iter().take(leftover) {
        shares[index] += 1;
    }

    shares
}

/// Serves `targets` in order from `capacity` units.
///
/// Input targets are not modified; the plan carries fresh copies with the
/// computed fields filled in, so repeated runs give identical results.
pub fn allocate(
    targets: &[AllocationTarget],
    capacity: u32,
    policy: AllocationPolicy,
    deliver_remainder_at_end: bool,
) -> AllocationPlan {
    let desired: Vec<u32> = match policy {
        AllocationPolicy::Fixed => targets.iter().map(|t| t.demand).collect(),
        AllocationPolicy::Proportional => {
            let weights: Vec<u32> = targets.iter().map(|t| t.weight).collect();
            largest_remainder(&weights, capacity)
                .into_iter()
                .zip(targets)
                .map(|(share, target)| share.min(target.demand))
                .collect()
        }
    };

    let mut remaining = capacity;
    let mut served: Vec<AllocationTarget> = targets
        .iter()
        .zip(&desired)
        .map(|(target, &want)| {
            let mut target = AllocationTarget::new(target.stop_id.clone(), target.demand, target.weight);
            let delivered = want.min(remaining);
            remaining -= delivered;
            target.record(delivered, remaining);
            target
        })
        .collect();

    let mut topped_up = false;
    if deliver_remainder_at_end && remaining > 0 {
        if let Some(last) = served.last_mut() {
            let extra = remaining.min(last.demand - last.delivered);
            if extra > 0 {
                remaining -= extra;
                let delivered = last.delivered + extra;
                last.record(delivered, remaining);
                topped_up = true;
            }
        }
    }

    let total_delivered = capacity - remaining;
    let utilization_percent = if capacity == 0 {
        0.0
    } else {
        total_delivered as f64 / capacity as f64 * 100.0
    };
    let shortfall_count = served.iter().filter(|t| t.shortfall > 0).count();

    debug!(
        ?policy,
        capacity, total_delivered, remaining, shortfall_count, "allocation computed"
    );

    AllocationPlan {
        targets: served,
        capacity,
        policy,
        total_delivered,
        remaining,
        utilization_percent,
        shortfall_count,
        topped_up,
    }
}
