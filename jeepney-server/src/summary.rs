//! Rider-facing summary of the best jeepney itinerary.

use serde::Serialize;
use serde_json::Value;

use crate::domain::{BoundingBox, Coordinate, Fare, Itinerary, Leg, Place};

const DEFAULT_COLOR: &str = "#2563eb";
const DEFAULT_TEXT_COLOR: &str = "#ffffff";
const DEFAULT_FROM_NAME: &str = "Origin stop";
const DEFAULT_TO_NAME: &str = "Destination stop";

/// Fraction of the route's extent added around it for map framing.
const BOUNDS_PADDING: f64 = 0.2;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SummaryError {
    #[error("No itineraries returned. Try adjusting your search.")]
    NoItineraries,

    #[error("No jeepney legs were suggested for this trip.")]
    NoJeepneyLegs,
}

/// One jeepney ride, ready to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegSummary {
    pub coordinates: Vec<Coordinate>,
    pub color: String,
    pub text_color: String,
    pub route_name: String,
    pub from_name: String,
    pub to_name: String,
    pub distance_km: f64,
    pub duration_minutes: f64,
    pub alerts: Vec<Value>,
}

impl LegSummary {
    /// Summarize `leg`, the `index`th jeepney ride of its itinerary.
    fn from_leg(leg: &Leg, index: usize) -> Self {
        let route = leg.route.as_ref();
        let color = route.and_then(|r| r.color.as_deref());
        let text_color = route.and_then(|r| r.text_color.as_deref());
        let route_name = route
            .and_then(|r| non_empty(r.short_name.as_deref()).or(non_empty(r.long_name.as_deref())))
            .map_or_else(|| format!("Leg {}", index + 1), str::to_string);

        Self {
            coordinates: leg.geometry.clone(),
            color: hex(color, DEFAULT_COLOR),
            text_color: hex(text_color, DEFAULT_TEXT_COLOR),
            route_name,
            from_name: place_name(leg.from.as_ref(), DEFAULT_FROM_NAME),
            to_name: place_name(leg.to.as_ref(), DEFAULT_TO_NAME),
            distance_km: leg.distance / 1000.0,
            duration_minutes: leg.duration.unwrap_or(0.0) / 60.0,
            alerts: leg.alerts.clone(),
        }
    }
}

/// The chosen itinerary, reduced to its jeepney rides and totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    /// Position of the chosen itinerary in the normalized list
    pub itinerary_index: usize,
    pub legs: Vec<LegSummary>,
    pub total_duration_minutes: i64,
    pub walk_minutes: i64,
    pub transfers: usize,
    pub fare: Option<Fare>,

    /// Padded extent of every ride, `None` when no leg has geometry
    pub bounds: Option<BoundingBox>,
}

/// Index of the itinerary to show: the first made only of jeepney rides,
/// else the first containing any.
pub fn select_jeepney_itinerary(itineraries: &[Itinerary]) -> Option<usize> {
    itineraries
        .iter()
        .position(Itinerary::is_jeepney_only)
        .or_else(|| itineraries.iter().position(Itinerary::has_jeepney_leg))
}

/// Summarize the best jeepney itinerary in `itineraries`.
pub fn summarize(itineraries: &[Itinerary]) -> Result<RouteSummary, SummaryError> {
    if itineraries.is_empty() {
        return Err(SummaryError::NoItineraries);
    }
    let index = select_jeepney_itinerary(itineraries).ok_or(SummaryError::NoJeepneyLegs)?;
    let chosen = &itineraries[index];

    let legs: Vec<LegSummary> = chosen
        .legs
        .iter()
        .filter(|leg| leg.is_jeepney())
        .enumerate()
        .map(|(i, leg)| LegSummary::from_leg(leg, i))
        .collect();

    let bounds = BoundingBox::from_points(legs.iter().flat_map(|l| l.coordinates.iter().copied()))
        .map(|b| b.padded(BOUNDS_PADDING));

    Ok(RouteSummary {
        itinerary_index: index,
        transfers: legs.len().saturating_sub(1),
        total_duration_minutes: minutes(chosen.duration),
        walk_minutes: minutes(chosen.walk_time),
        fare: chosen.total_fare.clone(),
        bounds,
        legs,
    })
}

fn minutes(seconds: Option<f64>) -> i64 {
    (seconds.unwrap_or(0.0) / 60.0).round() as i64
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

fn hex(color: Option<&str>, default: &str) -> String {
    match non_empty(color) {
        Some(c) if c.starts_with('#') => c.to_string(),
        Some(c) => format!("#{c}"),
        None => default.to_string(),
    }
}

fn place_name(place: Option<&Place>, default: &str) -> String {
    non_empty(place.and_then(|p| p.name.as_deref()))
        .unwrap_or(default)
        .to_string()
}
