//! Per-leg rows with running distance/duration totals.

use serde::Serialize;

use crate::model::Leg;

/// One row of the leg summary table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegRow {
    /// 1-based leg number.
    pub number: usize,
    pub from: String,
    pub to: String,
    pub distance_m: u64,
    pub duration_s: u64,
    pub distance_text: String,
    pub duration_text: String,
    pub accumulated_distance_m: u64,
    pub accumulated_duration_s: u64,
}

impl LegRow {
    pub fn accumulated_distance_label(&self) -> String {
        format_km(self.accumulated_distance_m)
    }

    pub fn accumulated_duration_label(&self) -> String {
        format_duration(self.accumulated_duration_s)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct LegSummary {
    pub rows: Vec<LegRow>,
    pub total_distance_m: u64,
    pub total_duration_s: u64,
    /// Name of the first point ("" when there are no legs).
    pub start: String,
    /// Name of the last point ("" when there are no legs).
    pub end: String,
}

impl LegSummary {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Builds the summary table for `legs`.
///
/// `names` lists origin, each stop in visiting order and destination; leg `i`
/// runs from `names[i]` to `names[i + 1]`. Missing names fall back to the
/// provider's address and then to "Point N".
pub fn aggregate_legs(legs: &[Leg], names: &[String]) -> LegSummary {
    if legs.is_empty() {
        return LegSummary::default();
    }

    let mut accumulated_distance_m = 0u64;
    let mut accumulated_duration_s = 0u64;
    let mut rows = Vec::with_capacity(legs.len());

    for (i, leg) in legs.iter().enumerate() {
        accumulated_distance_m += leg.distance_m;
        accumulated_duration_s += leg.duration_s;

        rows.push(LegRow {
            number: i + 1,
            from: point_name(names, i, leg.start_address.as_deref()),
            to: point_name(names, i + 1, leg.end_address.as_deref()),
            distance_m: leg.distance_m,
            duration_s: leg.duration_s,
            distance_text: text_or_dash(&leg.distance_text),
            duration_text: text_or_dash(&leg.duration_text),
            accumulated_distance_m,
            accumulated_duration_s,
        });
    }

    let start = rows.first().map(|row| row.from.clone()).unwrap_or_default();
    let end = rows.last().map(|row| row.to.clone()).unwrap_or_default();

    LegSummary {
        rows,
        total_distance_m: accumulated_distance_m,
        total_duration_s: accumulated_duration_s,
        start,
        end,
    }
}

fn point_name(names: &[String], index: usize, address: Option<&str>) -> String {
    names
        .get(index)
        .cloned()
        .or_else(|| address.map(str::to_string))
        .unwrap_or_else(|| format!("Point {}", index + 1))
}

fn text_or_dash(text: &str) -> String {
    if text.is_empty() { "—".to_string() } else { text.to_string() }
}

/// "12.3 km"
pub fn format_km(meters: u64) -> String {
    format!("{:.1} km", meters as f64 / 1000.0)
}

/// Rounds to whole minutes: "45 min", "2 h", "1 h 5 min".
pub fn format_duration(seconds: u64) -> String {
    let minutes = (seconds as f64 / 60.0).round() as u64;
    if minutes < 60 {
        return format!("{} min", minutes);
    }
    let (hours, rest) = (minutes / 60, minutes % 60);
    if rest == 0 {
        format!("{} h", hours)
    } else {
        format!("{} h {} min", hours, rest)
    }
}
