//! The planner seam shared by the live client and the mock.

use futures::future::BoxFuture;
use serde_json::Value;

use crate::domain::Coordinate;

use super::error::OtpError;
use super::query::PlanRequest;
use super::types::{GeocodeFeature, NearbyStop};

/// A journey planner the web layer can query.
///
/// Implemented by [`OtpClient`](super::OtpClient) for a live server and by
/// [`MockPlanner`](super::MockPlanner) for fixture data.
pub trait TripPlanner: Send + Sync {
    /// Plan a trip, returning the raw response for normalization.
    fn plan_trip<'a>(&'a self, request: &'a PlanRequest) -> BoxFuture<'a, Result<Value, OtpError>>;

    /// Geocode free text into candidate locations.
    fn search_locations<'a>(
        &'a self,
        text: &'a str,
    ) -> BoxFuture<'a, Result<Vec<GeocodeFeature>, OtpError>>;

    /// Stops within `radius` metres of `center`.
    fn nearby_stops(
        &self,
        center: Coordinate,
        radius: u32,
    ) -> BoxFuture<'_, Result<Vec<NearbyStop>, OtpError>>;
}
