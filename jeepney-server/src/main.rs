use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use jeepney_server::config::AppConfig;
use jeepney_server::domain::ServiceArea;
use jeepney_server::otp::{MockPlanner, Normalizer, OtpClient, TripPlanner};
use jeepney_server::search::SessionSearches;
use jeepney_server::web::{AppState, create_router};

const DEFAULT_LOG_FILTER: &str = "jeepney_server=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = AppConfig::from_env()?;

    // Recorded plans stand in for the planner when a fixture directory is given
    let planner: Arc<dyn TripPlanner> = match &config.mock_planner_dir {
        Some(dir) => {
            info!(dir = %dir.display(), "using mock planner");
            Arc::new(MockPlanner::new(dir)?)
        }
        None => {
            info!(endpoint = %config.otp.endpoint(), "using OpenTripPlanner");
            Arc::new(OtpClient::new(config.otp.clone())?)
        }
    };

    let state = AppState {
        planner,
        normalizer: Arc::new(Normalizer::default()),
        area: Arc::new(ServiceArea::default()),
        sessions: SessionSearches::default(),
    };
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Jeepney trip planner listening on http://{}", config.bind_addr);
    info!("  GET  /health               - Health check");
    info!("  GET  /api/locations/search - Location suggestions");
    info!("  GET  /api/stops/nearby     - Stops near a point");
    info!("  POST /api/plan             - Plan a trip");

    axum::serve(listener, app).await?;
    Ok(())
}
