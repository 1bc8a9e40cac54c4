//! Data transfer objects for web requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Coordinate, DomainError, Itinerary, ServiceArea};
use crate::locations::LocationSuggestion;
use crate::otp::{ModeSpec, NearbyStop, PlanRequest};
use crate::summary::RouteSummary;

/// A point as the browser sends it.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    /// Validate the point and require it to lie inside `area`.
    pub fn in_area(self, what: &'static str, area: &ServiceArea) -> Result<Coordinate, DomainError> {
        let c = Coordinate::checked(self.lat, self.lon)?;
        area.check(what, c)
    }
}

/// Request to plan a trip.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanTripRequest {
    pub from: LatLon,
    pub to: LatLon,

    pub num_itineraries: Option<u32>,

    /// Metres
    pub max_walk_distance: Option<f64>,

    /// `"BUS:LOCAL_BUS"` strings or `{mode, qualifier}` objects
    #[serde(default)]
    pub modes: Vec<ModeSpec>,

    #[serde(default)]
    pub wheelchair: bool,

    /// Departure (or arrival, with `arriveBy`) time; defaults to now
    pub time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub arrive_by: bool,

    /// Client session; a newer plan in the same session supersedes this one
    pub session: Option<String>,
}

impl PlanTripRequest {
    /// Build the planner request, rejecting endpoints outside `area`.
    pub fn to_plan_request(&self, area: &ServiceArea) -> Result<PlanRequest, DomainError> {
        let from = self.from.in_area("origin", area)?;
        let to = self.to.in_area("destination", area)?;

        let mut request = PlanRequest::new(from, to)
            .with_modes(&self.modes)
            .with_wheelchair(self.wheelchair)
            .with_arrive_by(self.arrive_by);
        if let Some(n) = self.num_itineraries {
            request = request.with_num_itineraries(n);
        }
        if let Some(metres) = self.max_walk_distance {
            request = request.with_max_walk_distance(metres);
        }
        if let Some(time) = self.time {
            request = request.at(time);
        }
        Ok(request)
    }
}

/// Response to a trip plan.
#[derive(Debug, Serialize)]
pub struct PlanTripResponse {
    pub itineraries: Vec<Itinerary>,

    /// Best jeepney itinerary, when there is one
    pub summary: Option<RouteSummary>,

    /// Why there is no summary
    pub message: Option<String>,
}

/// Query for location search.
#[derive(Debug, Deserialize)]
pub struct LocationSearchRequest {
    /// Free text, at least three characters to search
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct LocationSearchResponse {
    pub suggestions: Vec<LocationSuggestion>,
}

/// Query for stops near a point.
#[derive(Debug, Deserialize)]
pub struct NearbyStopsRequest {
    pub lat: f64,
    pub lon: f64,

    /// Metres, defaults to 500
    pub radius: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct NearbyStopsResponse {
    pub stops: Vec<NearbyStop>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}
