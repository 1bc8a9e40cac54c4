//! Domain types for the jeepney trip planner.
//!
//! This module contains the canonical model every planner response is
//! normalized into, plus the small geometry and fare rules that operate on
//! it. Nothing here performs IO.

mod area;
mod coordinate;
mod error;
mod fare;
mod itinerary;
mod mode;
mod time;

pub use area::ServiceArea;
pub use coordinate::{BoundingBox, Coordinate};
pub use error::DomainError;
pub use fare::{DEFAULT_CURRENCY, Fare, FareEntry, FareModel, FareProduct, Money};
pub use itinerary::{Itinerary, Leg, Place, RouteInfo, StopRef, transit_distance_m};
pub use mode::TransportMode;
pub use time::Timestamp;

#[cfg(test)]
pub(crate) use itinerary::test_support;
