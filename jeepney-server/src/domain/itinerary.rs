//! Canonical itinerary model.
//!
//! Every upstream response flavor is normalized into these types. They are
//! built once per planner response and never mutated afterwards. Fields the
//! normalizer does not recognize are carried in `extra` so newer upstream
//! fields reach the client untouched.

use serde::Serialize;
use serde_json::{Map, Value};

use super::{Coordinate, Fare, FareEntry, FareProduct, Timestamp, TransportMode};

/// Reference to a transit stop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopRef {
    #[serde(rename = "gtfsId")]
    pub gtfs_id: String,
}

/// One end of a leg.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Place {
    pub name: Option<String>,

    /// Upstream type tag (`type`, `__typename` or `vertexType`)
    #[serde(rename = "type")]
    pub kind: Option<String>,

    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub stop: Option<StopRef>,
}

impl Place {
    /// Position, when both halves are known.
    pub fn coordinate(&self) -> Option<Coordinate> {
        Some(Coordinate::new(self.lat?, self.lon?))
    }
}

/// Public identity of the line a leg rides.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteInfo {
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub color: Option<String>,
    pub text_color: Option<String>,
}

impl RouteInfo {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One single-mode segment of an itinerary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Leg {
    pub mode: Option<TransportMode>,

    /// Always equal to `mode`; both names are emitted for older clients.
    pub transport_mode: Option<TransportMode>,

    /// Metres, never negative
    pub distance: f64,

    /// Seconds, or `None` when neither reported nor derivable
    pub duration: Option<f64>,

    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
    pub from: Option<Place>,
    pub to: Option<Place>,
    pub route: Option<RouteInfo>,

    /// Decoded leg geometry, start first
    pub geometry: Vec<Coordinate>,

    pub alerts: Vec<Value>,
    pub realtime: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Leg {
    pub fn is_walk(&self) -> bool {
        self.mode.as_ref().is_some_and(TransportMode::is_walk)
    }

    pub fn is_jeepney(&self) -> bool {
        self.mode.as_ref().is_some_and(TransportMode::is_jeepney)
    }
}

/// Total distance of the non-walking `legs`, in metres.
///
/// Legs with an unknown mode count as transit.
pub fn transit_distance_m(legs: &[Leg]) -> f64 {
    legs.iter()
        .filter(|leg| !leg.is_walk())
        .map(|leg| leg.distance)
        .sum()
}

/// One complete proposed trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    /// Seconds
    pub duration: Option<f64>,
    /// Seconds
    pub walk_time: Option<f64>,
    /// Metres
    pub walk_distance: Option<f64>,

    pub legs: Vec<Leg>,
    pub fares: Vec<FareEntry>,
    pub fare_products: Vec<FareProduct>,

    /// Resolved fare for display, authoritative or estimated
    pub total_fare: Option<Fare>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Itinerary {
    /// Total distance covered by non-walking legs, in metres.
    ///
    /// Legs with an unknown mode count as transit.
    pub fn transit_distance_m(&self) -> f64 {
        transit_distance_m(&self.legs)
    }

    /// True when every leg is a jeepney ride.
    pub fn is_jeepney_only(&self) -> bool {
        !self.legs.is_empty() && self.legs.iter().all(Leg::is_jeepney)
    }

    pub fn has_jeepney_leg(&self) -> bool {
        self.legs.iter().any(Leg::is_jeepney)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use serde_json::json;

    #[test]
    fn transit_distance_skips_walks() {
        let it = itinerary(vec![leg("WALK", 300.0), leg("BUS", 6000.0), leg("WALK", 120.0)]);
        assert_eq!(it.transit_distance_m(), 6000.0);
    }

    #[test]
    fn unknown_mode_counts_as_transit() {
        let mut unknown = leg("BUS", 800.0);
        unknown.mode = None;
        unknown.transport_mode = None;
        let it = itinerary(vec![unknown]);
        assert_eq!(it.transit_distance_m(), 800.0);
    }

    #[test]
    fn jeepney_predicates() {
        let all_bus = itinerary(vec![leg("BUS", 1.0), leg("BUS", 2.0)]);
        assert!(all_bus.is_jeepney_only());
        assert!(all_bus.has_jeepney_leg());

        let mixed = itinerary(vec![leg("WALK", 1.0), leg("BUS", 2.0)]);
        assert!(!mixed.is_jeepney_only());
        assert!(mixed.has_jeepney_leg());

        let empty = itinerary(vec![]);
        assert!(!empty.is_jeepney_only());
        assert!(!empty.has_jeepney_leg());
    }

    #[test]
    fn place_coordinate_needs_both_halves() {
        let mut place = Place {
            name: Some("Cogon".into()),
            kind: None,
            lat: Some(8.47),
            lon: None,
            stop: None,
        };
        assert_eq!(place.coordinate(), None);
        place.lon = Some(124.65);
        assert_eq!(place.coordinate(), Some(Coordinate::new(8.47, 124.65)));
    }

    #[test]
    fn leg_extra_fields_are_flattened() {
        let mut l = leg("BUS", 10.0);
        l.extra.insert("legGeometry".into(), json!({"points": ""}));
        let value = serde_json::to_value(&l).unwrap();

        assert_eq!(value["mode"], json!("BUS"));
        assert_eq!(value["transportMode"], json!("BUS"));
        assert_eq!(value["legGeometry"], json!({"points": ""}));
        assert_eq!(value["realtime"], Value::Null);
    }

    #[test]
    fn route_info_emptiness() {
        assert!(RouteInfo::default().is_empty());
        let route = RouteInfo {
            short_name: Some("R1".into()),
            ..RouteInfo::default()
        };
        assert!(!route.is_empty());
    }
}
