//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::domain::{Coordinate, DomainError};
use crate::locations::{is_searchable, suggest};
use crate::otp::{DEFAULT_STOP_RADIUS, OtpError};
use crate::search::SearchError;
use crate::summary::summarize;

use super::dto::*;
use super::state::AppState;

/// Largest stop search radius accepted, in metres.
const MAX_STOP_RADIUS: u32 = 2000;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/locations/search", get(search_locations))
        .route("/api/stops/nearby", get(nearby_stops))
        .route("/api/plan", post(plan_trip))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

async fn not_found() -> AppError {
    AppError::NotFound {
        message: "No such endpoint".to_string(),
    }
}

/// Suggest locations in the service area matching free text.
async fn search_locations(
    State(state): State<AppState>,
    Query(req): Query<LocationSearchRequest>,
) -> Result<Json<LocationSearchResponse>, AppError> {
    if !is_searchable(&req.q) {
        return Ok(Json(LocationSearchResponse {
            suggestions: Vec::new(),
        }));
    }

    let features = state.planner.search_locations(req.q.trim()).await?;
    let suggestions = suggest(&features, &state.area);

    Ok(Json(LocationSearchResponse { suggestions }))
}

/// Stops around a point.
async fn nearby_stops(
    State(state): State<AppState>,
    Query(req): Query<NearbyStopsRequest>,
) -> Result<Json<NearbyStopsResponse>, AppError> {
    let center = Coordinate::checked(req.lat, req.lon)?;
    let radius = req.radius.unwrap_or(DEFAULT_STOP_RADIUS).min(MAX_STOP_RADIUS);

    let stops = state.planner.nearby_stops(center, radius).await?;
    Ok(Json(NearbyStopsResponse { stops }))
}

/// Plan a trip and summarize the best jeepney itinerary.
///
/// With a `session`, a newer plan in the same session makes this one fail
/// with 409 rather than return stale results.
async fn plan_trip(
    State(state): State<AppState>,
    Json(req): Json<PlanTripRequest>,
) -> Result<Json<PlanTripResponse>, AppError> {
    let request = req.to_plan_request(&state.area)?;

    let raw = match req.session.as_deref() {
        Some(session) => {
            let sequencer = state.sessions.sequencer(session).await;
            sequencer.run(state.planner.plan_trip(&request)).await?
        }
        None => state.planner.plan_trip(&request).await?,
    };

    let normalized = state.normalizer.normalize(&raw);
    if normalized.is_pass_through() {
        warn!("planner response has no itinerary list");
    }
    let itineraries = normalized.into_itineraries();

    let (summary, message) = match summarize(&itineraries) {
        Ok(summary) => (Some(summary), None),
        Err(e) => (None, Some(e.to_string())),
    };
    info!(
        itineraries = itineraries.len(),
        jeepney = summary.is_some(),
        "planned trip"
    );

    Ok(Json(PlanTripResponse {
        itineraries,
        summary,
        message,
    }))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Conflict { message: String },
    Upstream { message: String },
    Internal { message: String },
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl From<OtpError> for AppError {
    fn from(e: OtpError) -> Self {
        match e {
            OtpError::Config(_) | OtpError::Mock(_) => AppError::Internal {
                message: e.to_string(),
            },
            _ => AppError::Upstream {
                message: e.to_string(),
            },
        }
    }
}

impl From<SearchError> for AppError {
    fn from(e: SearchError) -> Self {
        match e {
            SearchError::Superseded => AppError::Conflict {
                message: e.to_string(),
            },
            SearchError::Planner(e) => e.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Conflict { message } => (StatusCode::CONFLICT, message),
            AppError::Upstream { message } => (StatusCode::BAD_GATEWAY, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, "{message}");
        } else {
            warn!(%status, "{message}");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(e: impl Into<AppError>) -> StatusCode {
        e.into().into_response().status()
    }

    #[test]
    fn error_statuses() {
        assert_eq!(
            status(DomainError::InvalidCoordinate { lat: 99.0, lon: 0.0 }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status(SearchError::Superseded), StatusCode::CONFLICT);
        assert_eq!(status(OtpError::RateLimited), StatusCode::BAD_GATEWAY);
        assert_eq!(
            status(SearchError::Planner(OtpError::GraphQl("boom".into()))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status(OtpError::Mock("no plans".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
