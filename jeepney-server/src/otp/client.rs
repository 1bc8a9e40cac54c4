//! OpenTripPlanner GraphQL client.
//!
//! Posts GraphQL documents to the router endpoint and hands trip plans back
//! as raw JSON; the normalizer deals with whichever shape comes back.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::domain::Coordinate;

use super::error::OtpError;
use super::planner::TripPlanner;
use super::query::{GraphQlRequest, LOCATION_SEARCH, PLAN_TRIP, PlanRequest, STOPS_NEARBY};
use super::types::{
    GeocodeData, GeocodeFeature, GraphQlResponse, NearbyStop, StopsByRadiusData,
    check_graphql_errors,
};

/// Router GraphQL endpoint relative to the base URL.
pub const DEFAULT_GRAPHQL_PATH: &str = "/otp/routers/default/graphql";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 5;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Longest prefix of an unparseable body kept in errors.
const ERROR_BODY_CHARS: usize = 500;

/// Configuration for the planner client.
#[derive(Debug, Clone, PartialEq)]
pub struct OtpConfig {
    /// Scheme and host of the planner, without a trailing slash
    pub base_url: String,
    /// Path of the GraphQL endpoint
    pub graphql_path: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl OtpConfig {
    /// Create a config for the planner at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            graphql_path: DEFAULT_GRAPHQL_PATH.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_graphql_path(mut self, path: impl Into<String>) -> Self {
        self.graphql_path = path.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, self.graphql_path)
    }
}

/// Planner API client.
///
/// Uses a semaphore to limit concurrent requests to the planner.
#[derive(Debug, Clone)]
pub struct OtpClient {
    http: reqwest::Client,
    endpoint: String,
    semaphore: Arc<Semaphore>,
}

impl OtpClient {
    pub fn new(config: OtpConfig) -> Result<Self, OtpError> {
        if config.max_concurrent == 0 {
            return Err(OtpError::Config("max_concurrent must be positive".to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint(),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
        })
    }

    /// Plan a trip. The response is returned as raw JSON.
    pub async fn plan_trip(&self, request: &PlanRequest) -> Result<Value, OtpError> {
        let body = self.post(PLAN_TRIP, request.variables(Utc::now())).await?;
        check_graphql_errors(body.get("errors"))?;
        Ok(body)
    }

    /// Geocode free text.
    pub async fn search_locations(&self, text: &str) -> Result<Vec<GeocodeFeature>, OtpError> {
        let data: Option<GeocodeData> = self.query(LOCATION_SEARCH, json!({"text": text})).await?;
        Ok(data
            .and_then(|d| d.geocode)
            .map(|g| g.features)
            .unwrap_or_default())
    }

    /// Stops within `radius` metres of `center`.
    pub async fn nearby_stops(
        &self,
        center: Coordinate,
        radius: u32,
    ) -> Result<Vec<NearbyStop>, OtpError> {
        let variables = json!({"lat": center.lat, "lon": center.lon, "radius": radius});
        let data: Option<StopsByRadiusData> = self.query(STOPS_NEARBY, variables).await?;
        Ok(data
            .and_then(|d| d.stops_by_radius)
            .map(|c| c.into_stops())
            .unwrap_or_default())
    }

    /// Run a typed query, failing on GraphQL errors.
    async fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<Option<T>, OtpError> {
        let body = self.post(query, variables).await?;
        let response: GraphQlResponse<T> =
            serde_json::from_value(body).map_err(|e| OtpError::Json {
                message: e.to_string(),
                body: None,
            })?;
        check_graphql_errors(response.errors.as_ref())?;
        Ok(response.data)
    }

    async fn post(&self, query: &str, variables: Value) -> Result<Value, OtpError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| OtpError::Config("semaphore closed".to_string()))?;

        debug!(endpoint = %self.endpoint, "posting GraphQL query");

        let response = self
            .http
            .post(&self.endpoint)
            .json(&GraphQlRequest { query, variables })
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(OtpError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "planner returned an error status");
            return Err(OtpError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| OtpError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(ERROR_BODY_CHARS).collect()),
        })
    }
}

impl TripPlanner for OtpClient {
    fn plan_trip<'a>(&'a self, request: &'a PlanRequest) -> BoxFuture<'a, Result<Value, OtpError>> {
        OtpClient::plan_trip(self, request).boxed()
    }

    fn search_locations<'a>(
        &'a self,
        text: &'a str,
    ) -> BoxFuture<'a, Result<Vec<GeocodeFeature>, OtpError>> {
        OtpClient::search_locations(self, text).boxed()
    }

    fn nearby_stops(
        &self,
        center: Coordinate,
        radius: u32,
    ) -> BoxFuture<'_, Result<Vec<NearbyStop>, OtpError>> {
        OtpClient::nearby_stops(self, center, radius).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Json;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::post;

    #[test]
    fn config_builder() {
        let config = OtpConfig::new("http://localhost:8080/")
            .with_graphql_path("/otp/gtfs/v1")
            .with_max_concurrent(10)
            .with_timeout(60);

        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.max_concurrent, 10);
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.endpoint(), "http://localhost:8080/otp/gtfs/v1");
    }

    #[test]
    fn config_defaults() {
        let config = OtpConfig::new("http://otp.local");

        assert_eq!(config.graphql_path, DEFAULT_GRAPHQL_PATH);
        assert_eq!(config.max_concurrent, DEFAULT_MAX_CONCURRENT);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(
            config.endpoint(),
            "http://otp.local/otp/routers/default/graphql"
        );
    }

    #[test]
    fn client_creation() {
        assert!(OtpClient::new(OtpConfig::new("http://otp.local")).is_ok());
        assert!(matches!(
            OtpClient::new(OtpConfig::new("http://otp.local").with_max_concurrent(0)),
            Err(OtpError::Config(_))
        ));
    }

    /// Serve `router` on an ephemeral port and return a client pointed at it.
    async fn client_for(router: Router) -> OtpClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        OtpClient::new(OtpConfig::new(format!("http://{addr}")).with_timeout(5)).unwrap()
    }

    fn request() -> PlanRequest {
        PlanRequest::new(
            Coordinate::new(8.4801, 124.6472),
            Coordinate::new(8.4755, 124.661),
        )
    }

    #[tokio::test]
    async fn plan_trip_posts_variables() {
        let router = Router::new().route(
            DEFAULT_GRAPHQL_PATH,
            post(|Json(body): Json<Value>| async move {
                // Echo the variables back inside a plan.
                Json(json!({"data": {"plan": {"itineraries": [], "echo": body["variables"]}}}))
            }),
        );
        let client = client_for(router).await;

        let body = client.plan_trip(&request()).await.unwrap();
        let echo = &body["data"]["plan"]["echo"];
        assert_eq!(echo["from"], json!({"lat": 8.4801, "lon": 124.6472}));
        assert_eq!(echo["numItineraries"], json!(3));
        assert_eq!(echo["modes"], json!([{"mode": "BUS", "qualifier": "LOCAL_BUS"}]));
    }

    #[tokio::test]
    async fn plan_trip_surfaces_graphql_errors() {
        let router = Router::new().route(
            DEFAULT_GRAPHQL_PATH,
            post(|| async {
                Json(json!({"errors": [{"message": "Unknown argument"}, {"message": "Bad mode"}]}))
            }),
        );
        let client = client_for(router).await;

        let err = client.plan_trip(&request()).await.unwrap_err();
        assert!(matches!(err, OtpError::GraphQl(ref m) if m == "Unknown argument; Bad mode"));
    }

    #[tokio::test]
    async fn error_statuses() {
        let router = Router::new().route(
            DEFAULT_GRAPHQL_PATH,
            post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
        );
        let client = client_for(router).await;
        let err = client.search_locations("divisoria").await.unwrap_err();
        assert!(matches!(
            err,
            OtpError::Api { status: 502, ref message } if message == "upstream down"
        ));

        let router = Router::new().route(
            DEFAULT_GRAPHQL_PATH,
            post(|| async { StatusCode::TOO_MANY_REQUESTS }),
        );
        let client = client_for(router).await;
        let err = client.search_locations("divisoria").await.unwrap_err();
        assert!(matches!(err, OtpError::RateLimited));
    }

    #[tokio::test]
    async fn non_json_body() {
        let router = Router::new().route(
            DEFAULT_GRAPHQL_PATH,
            post(|| async { "<html>tunnel offline</html>" }),
        );
        let client = client_for(router).await;

        match client.plan_trip(&request()).await.unwrap_err() {
            OtpError::Json { body, .. } => {
                assert_eq!(body.as_deref(), Some("<html>tunnel offline</html>"));
            }
            other => panic!("expected JSON error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn typed_queries() {
        let router = Router::new().route(
            DEFAULT_GRAPHQL_PATH,
            post(|Json(body): Json<Value>| async move {
                let query = body["query"].as_str().unwrap_or_default();
                if query.contains("geocode") {
                    Json(json!({"data": {"geocode": {"features": [{
                        "properties": {"name": "Divisoria", "label": "Divisoria, Cagayan de Oro"},
                        "geometry": {"coordinates": [124.6478, 8.4806]}
                    }]}}}))
                } else {
                    Json(json!({"data": {"stopsByRadius": {"edges": [
                        {"node": {"stop": {"gtfsId": "1:div", "name": "Divisoria"}, "distance": body["variables"]["radius"]}}
                    ]}}}))
                }
            }),
        );
        let client = client_for(router).await;

        let features = client.search_locations("divi").await.unwrap();
        assert_eq!(features[0].coordinate(), Some(Coordinate::new(8.4806, 124.6478)));

        let stops = client
            .nearby_stops(Coordinate::new(8.4806, 124.6478), 250)
            .await
            .unwrap();
        assert_eq!(stops.len(), 1);
        assert_eq!(stops[0].distance, Some(250.0));
    }

    #[tokio::test]
    async fn missing_data_is_empty() {
        let router = Router::new().route(
            DEFAULT_GRAPHQL_PATH,
            post(|| async { Json(json!({"data": null})) }),
        );
        let client = client_for(router).await;

        assert!(client.search_locations("x").await.unwrap().is_empty());
        assert!(
            client
                .nearby_stops(Coordinate::new(0.0, 0.0), 500)
                .await
                .unwrap()
                .is_empty()
        );
    }
}
