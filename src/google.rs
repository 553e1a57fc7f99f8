//! Google Directions web service adapter.

use serde::Deserialize;
use tracing::debug;

use crate::error::{ConfigError, RouteError};
use crate::model::{Leg, RouteRequest, RouteResult, RouteStatus};
use crate::polyline::Polyline;
use crate::traits::DirectionsProvider;

pub const API_KEY_ENV: &str = "GOOGLE_MAPS_API_KEY";

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub base_url: String,
    pub api_key: String,
    /// Region bias (ccTLD), e.g. "mx".
    pub region: String,
    pub timeout_secs: u64,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            base_url: "https://maps.googleapis.com/maps/api/directions/json".to_string(),
            api_key: String::new(),
            region: "mx".to_string(),
            timeout_secs: 10,
        }
    }
}

impl GoogleConfig {
    /// Default config with the key taken from `GOOGLE_MAPS_API_KEY`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| ConfigError::MissingEnv(API_KEY_ENV))?;
        Ok(Self {
            api_key,
            ..Self::default()
        })
    }
}

#[derive(Debug, Clone)]
pub struct GoogleDirections {
    config: GoogleConfig,
    client: reqwest::blocking::Client,
}

impl GoogleDirections {
    pub fn new(config: GoogleConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn query(&self, request: &RouteRequest) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("origin", latlng(request.origin.coords())),
            ("destination", latlng(request.destination.coords())),
            ("mode", "driving".to_string()),
            ("region", self.config.region.clone()),
            ("key", self.config.api_key.clone()),
        ];

        if !request.stops.is_empty() {
            let mut waypoints: Vec<String> = Vec::with_capacity(request.stops.len() + 1);
            if request.optimize {
                waypoints.push("optimize:true".to_string());
            }
            waypoints.extend(request.stops.iter().map(|stop| latlng(stop.coords())));
            params.push(("waypoints", waypoints.join("|")));
        }

        params
    }
}

fn latlng((lat, lng): (f64, f64)) -> String {
    format!("{:.6},{:.6}", lat, lng)
}

impl DirectionsProvider for GoogleDirections {
    fn directions(&self, request: &RouteRequest) -> Result<RouteResult, RouteError> {
        let body = self
            .client
            .get(&self.config.base_url)
            .query(&self.query(request))
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<DirectionsResponse>())?;

        debug!(status = %body.status, routes = body.routes.len(), "google directions response");
        route_from_response(body)
    }

    fn name(&self) -> &str {
        "google"
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DirectionsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    #[serde(default)]
    legs: Vec<DirectionsLeg>,
    #[serde(default)]
    waypoint_order: Vec<usize>,
    overview_polyline: Option<EncodedPolyline>,
}

#[derive(Debug, Deserialize)]
struct DirectionsLeg {
    distance: Option<TextValue>,
    duration: Option<TextValue>,
    start_address: Option<String>,
    end_address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    value: f64,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct EncodedPolyline {
    points: String,
}

fn status_error(status: &str, message: Option<String>) -> RouteError {
    match status {
        "ZERO_RESULTS" | "NOT_FOUND" => RouteError::NoRouteFound,
        "MAX_WAYPOINTS_EXCEEDED" | "MAX_ROUTE_LENGTH_EXCEEDED" => RouteError::TooManyWaypoints,
        "OVER_QUERY_LIMIT" | "OVER_DAILY_LIMIT" => RouteError::QuotaExceeded,
        "REQUEST_DENIED" => RouteError::PermissionDenied,
        "INVALID_REQUEST" => RouteError::InvalidRequest(message.unwrap_or_else(|| status.to_string())),
        other => RouteError::Unknown(message.unwrap_or_else(|| other.to_string())),
    }
}

pub(crate) fn route_from_response(body: DirectionsResponse) -> Result<RouteResult, RouteError> {
    if body.status != "OK" {
        return Err(status_error(&body.status, body.error_message));
    }

    let route = body
        .routes
        .into_iter()
        .next()
        .ok_or(RouteError::NoRouteFound)?;

    let legs = route
        .legs
        .into_iter()
        .map(|leg| {
            let (distance_m, distance_text) = leg
                .distance
                .map(|d| (d.value.round() as u64, d.text))
                .unwrap_or_default();
            let (duration_s, duration_text) = leg
                .duration
                .map(|d| (d.value.round() as u64, d.text))
                .unwrap_or_default();
            Leg {
                distance_m,
                duration_s,
                distance_text,
                duration_text,
                start_address: leg.start_address,
                end_address: leg.end_address,
            }
        })
        .collect();

    let path = route
        .overview_polyline
        .map(|encoded| Polyline::decode(&encoded.points))
        .unwrap_or_default();

    Ok(RouteResult {
        legs,
        waypoint_order: route.waypoint_order,
        path,
        status: RouteStatus::Ok,
    })
}
