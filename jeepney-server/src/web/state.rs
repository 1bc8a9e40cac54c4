//! Application state for the web layer.

use std::sync::Arc;

use crate::domain::ServiceArea;
use crate::otp::{Normalizer, TripPlanner};
use crate::search::SessionSearches;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Live or mock journey planner
    pub planner: Arc<dyn TripPlanner>,

    /// Turns planner responses into canonical itineraries
    pub normalizer: Arc<Normalizer>,

    /// Area trips and suggestions are restricted to
    pub area: Arc<ServiceArea>,

    /// One search sequencer per client session
    pub sessions: SessionSearches,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        planner: impl TripPlanner + 'static,
        normalizer: Normalizer,
        area: ServiceArea,
        sessions: SessionSearches,
    ) -> Self {
        Self {
            planner: Arc::new(planner),
            normalizer: Arc::new(normalizer),
            area: Arc::new(area),
            sessions,
        }
    }
}
