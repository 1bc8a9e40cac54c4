//! OpenTripPlanner integration.
//!
//! This module talks to the external journey planner and turns its
//! responses into the canonical itinerary model.
//!
//! Key characteristics of the planner:
//! - The response shape is not stable. Legacy OTP GraphQL, the REST `plan`
//!   endpoint and Transmodel GraphQL all name the same things differently,
//!   so trip plans are kept as raw JSON until [`normalize`] has probed them
//! - Leg geometry arrives as an encoded polyline
//! - Jeepney routes are published as GTFS buses

mod client;
mod error;
mod fare;
mod mock;
mod modes;
mod normalize;
mod planner;
mod probe;
mod query;
mod types;


pub use client::{DEFAULT_GRAPHQL_PATH, OtpClient, OtpConfig};
pub use error::OtpError;
pub use mock::MockPlanner;
pub use modes::{ModeSpec, TransitMode, normalize_transit_modes};
pub use normalize::{Normalized, Normalizer, Plan, UpstreamFlavor, map_place, normalize};
pub use planner::TripPlanner;
pub use query::{DEFAULT_MAX_WALK_DISTANCE, DEFAULT_NUM_ITINERARIES, DEFAULT_STOP_RADIUS, PlanRequest};
pub use types::{FeatureGeometry, FeatureProperties, GeocodeFeature, NearbyStop, Stop, StopRoute};
