//! Jeepney trip planner server.
//!
//! Sits between a map front-end and an OpenTripPlanner instance for
//! Cagayan de Oro. Whatever shape the planner answers in, riders get the
//! same canonical itineraries back, with decoded geometry and a fare.

pub mod config;
pub mod domain;
pub mod locations;
pub mod otp;
pub mod polyline;
pub mod search;
pub mod summary;
pub mod web;
