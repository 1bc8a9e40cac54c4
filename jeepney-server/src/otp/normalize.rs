//! Normalization of planner responses into the canonical itinerary model.
//!
//! The planner has been deployed behind several incompatible API shapes:
//! legacy OTP GraphQL and REST `plan` responses, and Transmodel GraphQL
//! `trip` responses in a rich and a minimal variant. Rather than modelling
//! each with serde types, every field is found by probing an ordered list of
//! candidate paths, so a missing or wrongly typed field degrades to `None`
//! instead of failing the whole response.
//!
//! Supporting another shape means extending one of the path tables below.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::domain::{
    Coordinate, FareModel, Itinerary, Leg, Place, RouteInfo, StopRef, Timestamp, TransportMode,
};
use crate::polyline::{self, DEFAULT_PRECISION};

use super::fare;
use super::probe::{self, KeyPath};

/// Where the itinerary list may live, in priority order.
const ITINERARY_PATHS: &[KeyPath] = &[
    &["plan", "itineraries"],
    &["plan", "tripPatterns"],
    &["trip", "tripPatterns"],
    &["data", "plan", "itineraries"],
    &["data", "plan", "tripPatterns"],
    &["data", "trip", "tripPatterns"],
];

const GEOMETRY_PATHS: &[KeyPath] = &[&["legGeometry", "points"], &["pointsOnLink", "points"]];

const START_PATHS: &[KeyPath] = &[&["startTime"], &["expectedStartTime"], &["aimedStartTime"]];
const END_PATHS: &[KeyPath] = &[&["endTime"], &["expectedEndTime"], &["aimedEndTime"]];

const LINE_PATHS: &[KeyPath] = &[&["line"], &["serviceJourney", "line"]];

const STOP_ID_PATHS: &[KeyPath] = &[
    &["stopPlace", "id"],
    &["quay", "stopPlace", "id"],
    &["quay", "id"],
    &["stop", "gtfsId"],
];

const PLACE_NAME_PATHS: &[KeyPath] = &[
    &["name"],
    &["quay", "name"],
    &["quay", "stopPlace", "name"],
    &["stopPlace", "name"],
];

const PLACE_TYPE_PATHS: &[KeyPath] = &[&["type"], &["__typename"], &["vertexType"]];

const LAT_PATHS: &[KeyPath] = &[
    &["location", "latitude"],
    &["location", "lat"],
    &["coordinates", "latitude"],
    &["coordinates", "lat"],
    &["latitude"],
    &["lat"],
    &["quay", "latitude"],
    &["quay", "lat"],
    &["quay", "stopPlace", "latitude"],
    &["quay", "stopPlace", "lat"],
];

const LON_PATHS: &[KeyPath] = &[
    &["location", "longitude"],
    &["location", "lon"],
    &["coordinates", "longitude"],
    &["coordinates", "lon"],
    &["longitude"],
    &["lon"],
    &["quay", "longitude"],
    &["quay", "lon"],
    &["quay", "stopPlace", "longitude"],
    &["quay", "stopPlace", "lon"],
];

/// Leg fields only Transmodel responses carry.
const TRANSMODEL_MARKERS: &[&str] = &["pointsOnLink", "fromPlace", "toPlace", "serviceJourney", "line"];

/// Keys written by [`Leg`]; removed from the pass-through map.
const LEG_KEYS: &[&str] = &[
    "mode",
    "transportMode",
    "distance",
    "duration",
    "startTime",
    "endTime",
    "from",
    "to",
    "route",
    "geometry",
    "alerts",
    "realtime",
];

/// Keys written by [`Itinerary`]; removed from the pass-through map.
const ITINERARY_KEYS: &[&str] = &[
    "duration",
    "walkTime",
    "walkDistance",
    "legs",
    "fares",
    "fareProducts",
    "totalFare",
];

/// Which family of planner API a leg came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamFlavor {
    /// OTP GraphQL `planTrip` or the REST `plan` endpoint
    Legacy,
    /// Entur-style Transmodel GraphQL `trip` query
    Transmodel,
}

impl UpstreamFlavor {
    /// Classify a raw leg by the presence of Transmodel-only fields.
    pub fn sniff(leg: &Value) -> Self {
        let transmodel = leg.as_object().is_some_and(|obj| {
            TRANSMODEL_MARKERS
                .iter()
                .any(|key| obj.get(*key).is_some_and(|v| !v.is_null()))
        });
        if transmodel {
            Self::Transmodel
        } else {
            Self::Legacy
        }
    }

    /// Candidate keys for a leg endpoint, most likely first.
    fn place_keys(self, end: End) -> &'static [KeyPath] {
        match (self, end) {
            (Self::Transmodel, End::From) => &[&["fromPlace"], &["from"]],
            (Self::Transmodel, End::To) => &[&["toPlace"], &["to"]],
            (Self::Legacy, End::From) => &[&["from"], &["fromPlace"]],
            (Self::Legacy, End::To) => &[&["to"], &["toPlace"]],
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum End {
    From,
    To,
}

/// The itinerary list of a recognized response.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Plan {
    pub itineraries: Vec<Itinerary>,
}

/// Result of [`normalize`].
///
/// Serializes as `{"plan": {"itineraries": [...]}}` for a recognized
/// response and as the untouched input otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Plan(Plan),
    /// No itinerary list was found; the input is returned unchanged
    PassThrough(Value),
}

impl Normalized {
    /// Normalized itineraries; empty for a pass-through.
    pub fn itineraries(&self) -> &[Itinerary] {
        match self {
            Self::Plan(plan) => &plan.itineraries,
            Self::PassThrough(_) => &[],
        }
    }

    pub fn into_itineraries(self) -> Vec<Itinerary> {
        match self {
            Self::Plan(plan) => plan.itineraries,
            Self::PassThrough(_) => Vec::new(),
        }
    }

    pub fn is_pass_through(&self) -> bool {
        matches!(self, Self::PassThrough(_))
    }
}

impl Serialize for Normalized {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Plan(plan) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("plan", plan)?;
                map.end()
            }
            Self::PassThrough(raw) => raw.serialize(serializer),
        }
    }
}

/// Normalizes planner responses.
///
/// Holds the fare model used for estimates and the polyline precision the
/// planner encodes geometry with.
#[derive(Debug, Clone)]
pub struct Normalizer {
    fare_model: FareModel,
    precision: u32,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(FareModel::default())
    }
}

impl Normalizer {
    pub fn new(fare_model: FareModel) -> Self {
        Self {
            fare_model,
            precision: DEFAULT_PRECISION,
        }
    }

    /// Set the polyline precision (6 for OSRM-style geometry).
    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    pub fn fare_model(&self) -> &FareModel {
        &self.fare_model
    }

    /// Normalize a raw planner response.
    ///
    /// Never fails. A response without a recognizable itinerary list
    /// (including `null`) comes back as [`Normalized::PassThrough`].
    pub fn normalize(&self, raw: &Value) -> Normalized {
        let Some(items) = probe::first_array(raw, ITINERARY_PATHS) else {
            if !raw.is_null() {
                warn!("unrecognized planner response shape; passing through");
            }
            return Normalized::PassThrough(raw.clone());
        };

        let itineraries = items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| {
                let itinerary = self.normalize_itinerary(item);
                if itinerary.is_none() {
                    warn!(index = i, "skipping non-object itinerary");
                }
                itinerary
            })
            .collect::<Vec<_>>();

        debug!(count = itineraries.len(), "normalized planner response");
        Normalized::Plan(Plan { itineraries })
    }

    /// Normalize one raw itinerary; `None` unless it is a JSON object.
    pub fn normalize_itinerary(&self, raw: &Value) -> Option<Itinerary> {
        let obj = raw.as_object()?;

        let legs = probe::array(raw, &["legs"])
            .map(|legs| {
                legs.iter()
                    .enumerate()
                    .filter_map(|(i, leg)| {
                        let normalized = self.normalize_leg(leg);
                        if normalized.is_none() {
                            warn!(index = i, "skipping non-object leg");
                        }
                        normalized
                    })
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        let fares = fare::parse_fares(raw);
        let fare_products = fare::parse_fare_products(raw);
        let total_fare = fare::resolve(raw, &fares, &fare_products, &legs, &self.fare_model);

        Some(Itinerary {
            duration: probe::number(raw, &["duration"]),
            walk_time: probe::number(raw, &["walkTime"]),
            walk_distance: probe::number(raw, &["walkDistance"]),
            legs,
            fares,
            fare_products,
            total_fare,
            extra: without_keys(obj, ITINERARY_KEYS),
        })
    }

    /// Normalize one raw leg; `None` unless it is a JSON object.
    pub fn normalize_leg(&self, raw: &Value) -> Option<Leg> {
        let obj = raw.as_object()?;
        let flavor = UpstreamFlavor::sniff(raw);

        let geometry = match probe::first_string(raw, GEOMETRY_PATHS) {
            Some(points) => polyline::decode(points, self.precision),
            None => decoded_geometry(raw),
        };
        let fallback_from = geometry.first().copied();
        let fallback_to = geometry.last().copied();

        let mode = probe::at(raw, &["mode"])
            .and_then(TransportMode::from_value)
            .or_else(|| probe::at(raw, &["transportMode"]).and_then(TransportMode::from_value));

        let start_time = first_timestamp(raw, START_PATHS);
        let end_time = first_timestamp(raw, END_PATHS);
        let duration = probe::number(raw, &["duration"])
            .filter(|d| *d >= 0.0)
            .or_else(|| {
                let (start, end) = (start_time.as_ref()?, end_time.as_ref()?);
                start.seconds_until(end).filter(|d| *d >= 0.0)
            });

        let from = map_place(probe::first(raw, flavor.place_keys(End::From)), fallback_from);
        let to = map_place(probe::first(raw, flavor.place_keys(End::To)), fallback_to);

        debug!(
            ?flavor,
            mode = mode.as_ref().map(TransportMode::as_str),
            points = geometry.len(),
            "normalized leg"
        );

        Some(Leg {
            transport_mode: mode.clone(),
            mode,
            distance: probe::number(raw, &["distance"])
                .filter(|d| *d >= 0.0)
                .unwrap_or(0.0),
            duration,
            start_time,
            end_time,
            from,
            to,
            route: resolve_route(raw),
            geometry,
            alerts: probe::array(raw, &["alerts"]).cloned().unwrap_or_default(),
            realtime: probe::at(raw, &["realtime"]).cloned(),
            extra: without_keys(obj, LEG_KEYS),
        })
    }
}

/// Normalize a raw planner response with the default fare model.
///
/// # Examples
///
/// ```
/// use jeepney_server::otp::normalize;
/// use serde_json::json;
///
/// let raw = json!({"plan": {"itineraries": [{
///     "fares": [{"currency": "PHP", "cents": 1500}],
///     "legs": [{"mode": "BUS", "distance": 6000.0}]
/// }]}});
/// let normalized = normalize(&raw);
/// let fare = normalized.itineraries()[0].total_fare.as_ref().unwrap();
/// assert_eq!(fare.amount, 15.0);
/// assert!(!fare.is_estimated);
///
/// assert!(normalize(&json!({"unexpected": true})).is_pass_through());
/// ```
pub fn normalize(raw: &Value) -> Normalized {
    Normalizer::default().normalize(raw)
}

/// Map a raw leg endpoint onto a [`Place`].
///
/// `fallback` supplies the position when the raw place carries none, as
/// minimal Transmodel responses do. Absent or non-object input gives `None`.
pub fn map_place(raw: Option<&Value>, fallback: Option<Coordinate>) -> Option<Place> {
    let raw = raw.filter(|v| v.is_object())?;

    Some(Place {
        name: probe::first_string(raw, PLACE_NAME_PATHS).map(str::to_string),
        kind: probe::first_string(raw, PLACE_TYPE_PATHS).map(str::to_string),
        lat: probe::first_number(raw, LAT_PATHS).or(fallback.map(|c| c.lat)),
        lon: probe::first_number(raw, LON_PATHS).or(fallback.map(|c| c.lon)),
        stop: probe::first_id(raw, STOP_ID_PATHS).map(|gtfs_id| StopRef { gtfs_id }),
    })
}

fn text(raw: &Value, paths: &[KeyPath]) -> Option<String> {
    probe::first_string(raw, paths).map(str::to_string)
}

fn first_timestamp(raw: &Value, paths: &[KeyPath]) -> Option<Timestamp> {
    paths
        .iter()
        .find_map(|p| probe::at(raw, p).and_then(Timestamp::from_value))
}

/// Route identity from a Transmodel line, a legacy route object, or the
/// flat `route*` fields of the REST plan, in that order.
fn resolve_route(raw: &Value) -> Option<RouteInfo> {
    let line = LINE_PATHS
        .iter()
        .find_map(|p| probe::at(raw, p).filter(|l| l.is_object()));

    let route = if let Some(line) = line {
        RouteInfo {
            short_name: text(line, &[&["publicCode"]]),
            long_name: text(line, &[&["name"]]),
            color: text(line, &[&["colour"], &["color"]]),
            text_color: text(line, &[&["textColour"], &["textColor"]]),
        }
    } else if let Some(route) = probe::at(raw, &["route"]).filter(|r| r.is_object()) {
        RouteInfo {
            short_name: text(route, &[&["shortName"], &["publicCode"]]),
            long_name: text(route, &[&["longName"], &["name"]]),
            color: text(route, &[&["color"], &["colour"]]),
            text_color: text(route, &[&["textColor"], &["textColour"]]),
        }
    } else {
        RouteInfo {
            short_name: text(raw, &[&["routeShortName"]]),
            long_name: text(raw, &[&["routeLongName"]]),
            color: text(raw, &[&["routeColor"]]),
            text_color: text(raw, &[&["routeTextColor"]]),
        }
    };

    (!route.is_empty()).then_some(route)
}

/// An already-decoded `geometry` array of `[lat, lon]` pairs, as emitted by
/// a previous normalization pass. Malformed points are skipped.
fn decoded_geometry(raw: &Value) -> Vec<Coordinate> {
    let Some(points) = probe::array(raw, &["geometry"]) else {
        return Vec::new();
    };
    points
        .iter()
        .filter_map(|p| match p.as_array()?.as_slice() {
            [lat, lon] => Some(Coordinate::new(lat.as_f64()?, lon.as_f64()?)),
            _ => None,
        })
        .collect()
}

fn without_keys(obj: &Map<String, Value>, keys: &[&str]) -> Map<String, Value> {
    obj.iter()
        .filter(|(k, _)| !keys.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
