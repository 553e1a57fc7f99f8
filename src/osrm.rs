//! OSRM HTTP adapter for route directions.
//!
//! Fixed-order requests go to the `route` service; optimized requests go to
//! `trip` with the first and last coordinates pinned.

use serde::Deserialize;
use tracing::debug;

use crate::error::{RouteError, http_status_error};
use crate::model::{Leg, RouteRequest, RouteResult, RouteStatus};
use crate::polyline::Polyline;
use crate::traits::DirectionsProvider;

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "car".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmDirections {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmDirections {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn url(&self, request: &RouteRequest) -> String {
        let mut points = vec![request.origin.coords()];
        points.extend(request.stops.iter().map(|stop| stop.coords()));
        points.push(request.destination.coords());

        let coords = points
            .iter()
            .map(|(lat, lng)| format!("{:.6},{:.6}", lng, lat))
            .collect::<Vec<_>>()
            .join(";");

        if request.optimize {
            format!(
                "{}/trip/v1/{}/{}?source=first&destination=last&roundtrip=false&overview=simplified&geometries=polyline",
                self.config.base_url, self.config.profile, coords
            )
        } else {
            format!(
                "{}/route/v1/{}/{}?overview=simplified&geometries=polyline",
                self.config.base_url, self.config.profile, coords
            )
        }
    }
}

impl DirectionsProvider for OsrmDirections {
    fn directions(&self, request: &RouteRequest) -> Result<RouteResult, RouteError> {
        let response = self.client.get(self.url(request)).send()?;
        let status = response.status();

        let mapped = http_status_error(status);
        if let Some(err @ (RouteError::QuotaExceeded | RouteError::PermissionDenied)) = mapped {
            return Err(err);
        }

        // OSRM reports routing failures as JSON bodies on 4xx responses.
        let body = match response.json::<OsrmResponse>() {
            Ok(body) => body,
            Err(err) if status.is_success() => return Err(err.into()),
            Err(_) => {
                return Err(mapped.unwrap_or_else(|| {
                    RouteError::Unknown(format!("OSRM returned HTTP {}", status))
                }));
            }
        };

        debug!(code = %body.code, optimize = request.optimize, "osrm response");
        route_from_response(body, request.stops.len())
    }

    fn name(&self) -> &str {
        "osrm"
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct OsrmResponse {
    code: String,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
    #[serde(default)]
    trips: Vec<OsrmRoute>,
    #[serde(default)]
    waypoints: Vec<OsrmWaypoint>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    #[serde(default)]
    geometry: String,
    #[serde(default)]
    legs: Vec<OsrmLeg>,
}

#[derive(Debug, Deserialize)]
struct OsrmLeg {
    distance: f64,
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct OsrmWaypoint {
    /// Position in the trip; only present on `trip` responses.
    waypoint_index: Option<usize>,
}

fn code_error(code: &str, message: Option<String>) -> RouteError {
    match code {
        "NoRoute" | "NoTrips" | "NoSegment" => RouteError::NoRouteFound,
        "TooBig" => RouteError::TooManyWaypoints,
        "InvalidQuery" | "InvalidValue" | "InvalidOptions" | "InvalidUrl" | "InvalidService"
        | "InvalidVersion" => RouteError::InvalidRequest(message.unwrap_or_else(|| code.to_string())),
        other => RouteError::Unknown(message.unwrap_or_else(|| other.to_string())),
    }
}

/// Visiting order of the intermediate stops from a `trip` response.
fn trip_order(waypoints: &[OsrmWaypoint], stop_count: usize) -> Vec<usize> {
    let mut stops: Vec<(usize, usize)> = waypoints
        .iter()
        .skip(1)
        .take(stop_count)
        .enumerate()
        .filter_map(|(stop, waypoint)| waypoint.waypoint_index.map(|position| (position, stop)))
        .collect();
    stops.sort_unstable();
    stops.into_iter().map(|(_, stop)| stop).collect()
}

pub(crate) fn route_from_response(body: OsrmResponse, stop_count: usize) -> Result<RouteResult, RouteError> {
    if body.code != "Ok" {
        return Err(code_error(&body.code, body.message));
    }

    let is_trip = !body.trips.is_empty();
    let route = body
        .trips
        .into_iter()
        .chain(body.routes)
        .next()
        .ok_or(RouteError::NoRouteFound)?;

    let waypoint_order = if is_trip {
        trip_order(&body.waypoints, stop_count)
    } else {
        (0..stop_count).collect()
    };

    let legs = route
        .legs
        .iter()
        .map(|leg| Leg::new(leg.distance.round() as u64, leg.duration.round() as u64))
        .collect();

    Ok(RouteResult {
        legs,
        waypoint_order,
        path: Polyline::decode(&route.geometry),
        status: RouteStatus::Ok,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Location;

    fn parse(json: &str, stops: usize) -> Result<RouteResult, RouteError> {
        route_from_response(serde_json::from_str(json).unwrap(), stops)
    }

    #[test]
    fn test_route_response_keeps_input_order() {
        let result = parse(
            r#"{
                "code": "Ok",
                "routes": [{
                    "geometry": "_p~iF~ps|U_ulLnnqC",
                    "legs": [
                        { "distance": 1500.4, "duration": 120.6 },
                        { "distance": 2500.0, "duration": 200.0 }
                    ]
                }],
                "waypoints": [{}, {}, {}]
            }"#,
            1,
        )
        .unwrap();

        assert_eq!(result.legs[0].distance_m, 1500);
        assert_eq!(result.legs[0].duration_s, 121);
        assert_eq!(result.waypoint_order, vec![0]);
        assert_eq!(result.path.len(), 2);
    }

    #[test]
    fn test_trip_response_yields_visit_order() {
        // Input: origin, s0, s1, s2, destination; trip visits s2, s0, s1.
        let result = parse(
            r#"{
                "code": "Ok",
                "trips": [{
                    "geometry": "",
                    "legs": [
                        { "distance": 1, "duration": 1 }, { "distance": 1, "duration": 1 },
                        { "distance": 1, "duration": 1 }, { "distance": 1, "duration": 1 }
                    ]
                }],
                "waypoints": [
                    { "waypoint_index": 0, "trips_index": 0 },
                    { "waypoint_index": 2, "trips_index": 0 },
                    { "waypoint_index": 3, "trips_index": 0 },
                    { "waypoint_index": 1, "trips_index": 0 },
                    { "waypoint_index": 4, "trips_index": 0 }
                ]
            }"#,
            3,
        )
        .unwrap();

        assert_eq!(result.waypoint_order, vec![2, 0, 1]);
        assert_eq!(result.legs.len(), 4);
    }

    #[test]
    fn test_codes_map_to_errors() {
        let cases = [
            ("NoRoute", RouteError::NoRouteFound),
            ("NoTrips", RouteError::NoRouteFound),
            ("TooBig", RouteError::TooManyWaypoints),
            ("InvalidQuery", RouteError::InvalidRequest("InvalidQuery".into())),
            ("Weird", RouteError::Unknown("Weird".into())),
        ];
        for (code, expected) in cases {
            let json = format!(r#"{{ "code": "{}" }}"#, code);
            assert_eq!(parse(&json, 0).unwrap_err(), expected, "code {}", code);
        }
    }

    #[test]
    fn test_url_picks_service_by_optimize_flag() {
        let client = OsrmDirections::new(OsrmConfig::default()).unwrap();
        let mut request = RouteRequest {
            origin: Location::new("o", "O", 19.7, -88.7),
            destination: Location::new("d", "D", 19.8, -88.9),
            stops: vec![Location::new("a", "A", 19.75, -88.8)],
            optimize: false,
        };

        let route_url = client.url(&request);
        assert!(route_url.starts_with("http://localhost:5000/route/v1/car/-88.700000,19.700000;-88.800000,19.750000;"));

        request.optimize = true;
        let trip_url = client.url(&request);
        assert!(trip_url.contains("/trip/v1/car/"));
        assert!(trip_url.contains("source=first&destination=last&roundtrip=false"));
    }

    /// Serves one canned HTTP response on a local port.
    fn serve_once(status_line: &'static str, body: &'static str) -> String {
        use std::io::{BufRead, BufReader, Write};
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap() > 0 && line != "\r\n" {
                line.clear();
            }
            let mut stream = reader.into_inner();
            write!(
                stream,
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            )
            .unwrap();
        });
        format!("http://{}", addr)
    }

    fn direct_request() -> RouteRequest {
        RouteRequest::direct(
            Location::new("o", "O", 19.7, -88.7),
            Location::new("d", "D", 19.8, -88.9),
        )
    }

    fn directions_from(status_line: &'static str, body: &'static str) -> Result<RouteResult, RouteError> {
        let config = OsrmConfig {
            base_url: serve_once(status_line, body),
            ..OsrmConfig::default()
        };
        OsrmDirections::new(config).unwrap().directions(&direct_request())
    }

    #[test]
    fn test_http_status_maps_to_errors() {
        assert_eq!(
            directions_from("429 Too Many Requests", "").unwrap_err(),
            RouteError::QuotaExceeded
        );
        assert_eq!(
            directions_from("403 Forbidden", "").unwrap_err(),
            RouteError::PermissionDenied
        );
        assert!(matches!(
            directions_from("400 Bad Request", "not json").unwrap_err(),
            RouteError::InvalidRequest(_)
        ));
        assert!(matches!(
            directions_from("502 Bad Gateway", "").unwrap_err(),
            RouteError::Unknown(_)
        ));
    }

    #[test]
    fn test_json_body_on_bad_request_wins_over_status() {
        let err = directions_from(
            "400 Bad Request",
            r#"{ "code": "InvalidValue", "message": "bad coordinate" }"#,
        )
        .unwrap_err();
        assert_eq!(err, RouteError::InvalidRequest("bad coordinate".into()));
    }
}
