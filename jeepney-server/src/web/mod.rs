//! Web layer for the jeepney trip planner.
//!
//! Provides HTTP endpoints for location search, nearby stops and trip
//! planning.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
