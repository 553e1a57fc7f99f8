//! Polyline representation for route geometries.
//!
//! Route paths are kept as decoded coordinate sequences. The compact
//! polyline encoding (Google/OSRM, 5 decimal places) is only dealt with at
//! the provider boundary.

use serde::{Deserialize, Serialize};

const PRECISION: f64 = 1e5;

/// A polyline representing a route geometry as decoded coordinates.
///
/// Each point is a (latitude, longitude) tuple.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<(f64, f64)>,
}

impl Polyline {
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        Self { points }
    }

    /// Decodes an encoded polyline string.
    ///
    /// A truncated trailing coordinate is dropped rather than reported, and
    /// decoding stops at the first coordinate that overflows.
    pub fn decode(encoded: &str) -> Self {
        let bytes = encoded.as_bytes();
        let mut points = Vec::new();
        let mut lat = 0i64;
        let mut lng = 0i64;
        let mut i = 0;

        while i < bytes.len() {
            let Some((lat_delta, consumed)) = decode_value(&bytes[i..]) else {
                break;
            };
            i += consumed;
            let Some((lng_delta, consumed)) = decode_value(&bytes[i..]) else {
                break;
            };
            i += consumed;

            let (Some(next_lat), Some(next_lng)) =
                (lat.checked_add(lat_delta), lng.checked_add(lng_delta))
            else {
                break;
            };
            lat = next_lat;
            lng = next_lng;
            points.push((lat as f64 / PRECISION, lng as f64 / PRECISION));
        }

        Self { points }
    }

    /// Encodes the points using the polyline algorithm.
    pub fn encode(&self) -> String {
        let mut result = String::new();
        let mut prev_lat = 0i64;
        let mut prev_lng = 0i64;

        for &(lat, lng) in &self.points {
            let lat_e5 = (lat * PRECISION).round() as i64;
            let lng_e5 = (lng * PRECISION).round() as i64;
            encode_value(lat_e5 - prev_lat, &mut result);
            encode_value(lng_e5 - prev_lng, &mut result);
            prev_lat = lat_e5;
            prev_lng = lng_e5;
        }

        result
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn into_points(self) -> Vec<(f64, f64)> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

fn encode_value(value: i64, output: &mut String) {
    let mut encoded = if value < 0 { !(value << 1) } else { value << 1 };

    while encoded >= 0x20 {
        output.push((((encoded & 0x1f) | 0x20) as u8 + 63) as char);
        encoded >>= 5;
    }
    output.push((encoded as u8 + 63) as char);
}

/// Returns (value, bytes consumed), or None when the chunk never terminates.
fn decode_value(bytes: &[u8]) -> Option<(i64, usize)> {
    let mut result = 0i64;
    let mut shift = 0;

    for (consumed, &byte) in bytes.iter().enumerate() {
        let chunk = (byte as i64) - 63;
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        if chunk < 0x20 {
            let value = if result & 1 != 0 { !(result >> 1) } else { result >> 1 };
            return Some((value, consumed + 1));
        }
        if shift > 60 {
            return None;
        }
    }

    None
}
