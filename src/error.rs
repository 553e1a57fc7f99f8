//! Error types shared across the planner.

use reqwest::StatusCode;
use thiserror::Error;

/// Failures reported by a directions provider.
///
/// Surfaced to the caller as-is; the planner never retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("no drivable route between those points")]
    NoRouteFound,
    #[error("too many stops for the routing provider")]
    TooManyWaypoints,
    #[error("routing provider quota exceeded")]
    QuotaExceeded,
    #[error("routing provider denied the request, check API key and permissions")]
    PermissionDenied,
    #[error("invalid route request: {0}")]
    InvalidRequest(String),
    #[error("routing failed: {0}")]
    Unknown(String),
}

/// Maps an HTTP status that carries its own meaning to a [`RouteError`].
///
/// Other statuses return `None` and are left to the provider's body.
pub fn http_status_error(status: StatusCode) -> Option<RouteError> {
    match status {
        StatusCode::TOO_MANY_REQUESTS => Some(RouteError::QuotaExceeded),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Some(RouteError::PermissionDenied),
        StatusCode::BAD_REQUEST => Some(RouteError::InvalidRequest(format!("HTTP {}", status))),
        _ => None,
    }
}

impl From<reqwest::Error> for RouteError {
    fn from(err: reqwest::Error) -> Self {
        match err.status().and_then(http_status_error) {
            Some(RouteError::InvalidRequest(_)) => RouteError::InvalidRequest(err.to_string()),
            Some(mapped) => mapped,
            None => RouteError::Unknown(err.to_string()),
        }
    }
}

/// Failures of a whole planning action.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error(transparent)]
    Route(#[from] RouteError),
    #[error("route request {generation} was superseded by request {current}")]
    Superseded { generation: u64, current: u64 },
    #[error("no outbound route has been planned yet")]
    NoOutbound,
    #[error(transparent)]
    Locate(#[from] LocateError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocateError {
    #[error("geolocation is not available")]
    Unavailable,
    #[error("geolocation permission denied")]
    PermissionDenied,
    #[error("geolocation timed out after {0} ms")]
    Timeout(u128),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid planner config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("missing environment variable {0}")]
    MissingEnv(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown fuel type '{0}'")]
pub struct FuelTypeError(pub String);
