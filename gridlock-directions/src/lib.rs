//! Directions-provider boundary for the gridlock engine.
//!
//! Fetches one route from a directions provider and delegates to the pure
//! engine. This is the only layer that performs I/O and the only layer that
//! reports failure; everything below it is deterministic and infallible.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use gridlock_engine::{Route, WorsenOptions, WorsenResult, worsen_route};

/// Default provider endpoint; any service speaking the same route shape works.
pub const DEFAULT_BASE_URL: &str = "https://api.mapbox.com/directions/v5/mapbox";

/// Routing profile requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Profile {
    Driving,
    #[default]
    DrivingTraffic,
}

impl Profile {
    /// Path segment used by the provider.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Driving => "driving",
            Self::DrivingTraffic => "driving-traffic",
        }
    }
}

/// A longitude/latitude pair in provider order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub longitude: f64,
    pub latitude: f64,
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.longitude, self.latitude)
    }
}

/// One directions request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionsRequest {
    pub origin: Coord,
    pub destination: Coord,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depart_at: Option<String>,
    #[serde(default)]
    pub profile: Profile,
}

/// Failures surfaced by the boundary; the engine below never fails.
#[derive(Debug, Error)]
pub enum DirectionsError {
    #[error("directions request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("directions provider returned status {status}")]
    Status { status: u16 },
    #[error("directions response carried no routes")]
    NoRoute,
    #[error("directions response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Deserialize, Default)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<Route>,
}

/// Assemble the provider URL for a request.
///
/// Requests the per-segment annotations the engine consumes (congestion,
/// distance, duration) alongside the full geometry.
#[must_use]
pub fn request_url(base_url: &str, request: &DirectionsRequest) -> String {
    let mut url = format!(
        "{}/{}/{};{}?annotations=congestion,distance,duration&overview=full&access_token={}",
        base_url.trim_end_matches('/'),
        request.profile.as_str(),
        request.origin,
        request.destination,
        request.access_token,
    );
    if let Some(depart_at) = &request.depart_at {
        url.push_str("&depart_at=");
        url.push_str(depart_at);
    }
    url
}

/// Decode a provider response body; the first returned route wins.
///
/// # Errors
///
/// Returns an error for a non-success status, an empty route set, or a body
/// that does not decode as a directions response.
pub fn parse_directions_response(status: u16, body: &str) -> Result<Route, DirectionsError> {
    if !(200..300).contains(&status) {
        return Err(DirectionsError::Status { status });
    }
    let response: DirectionsResponse = serde_json::from_str(body)?;
    response
        .routes
        .into_iter()
        .next()
        .ok_or(DirectionsError::NoRoute)
}

/// Fetch one route from the provider.
///
/// # Errors
///
/// Returns an error when the request cannot be sent or the response cannot
/// be turned into a route.
pub async fn fetch_route(
    client: &reqwest::Client,
    base_url: &str,
    request: &DirectionsRequest,
) -> Result<Route, DirectionsError> {
    debug!(
        "requesting {} route {} -> {}",
        request.profile.as_str(),
        request.origin,
        request.destination
    );
    let response = client.get(request_url(base_url, request)).send().await?;
    let status = response.status().as_u16();
    let body = response.text().await?;
    let parsed = parse_directions_response(status, &body);
    if let Err(error) = &parsed {
        warn!("directions request failed: {error}");
    }
    parsed
}

/// Fetch a route and worsen it toward the options' target delta.
///
/// # Errors
///
/// Returns an error when the route cannot be fetched; the worsening step
/// itself never fails.
pub async fn fetch_and_worsen_route(
    client: &reqwest::Client,
    base_url: &str,
    request: &DirectionsRequest,
    options: &WorsenOptions,
) -> Result<WorsenResult, DirectionsError> {
    let route = fetch_route(client, base_url, request).await?;
    let result = worsen_route(&route, options);
    debug!(
        "worsened route from {} to {} minutes",
        result.base_duration_minutes, result.estimated_duration_minutes
    );
    Ok(result)
}
