//! GraphQL documents and request variables sent to the planner.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Value, json};

use crate::domain::Coordinate;

use super::modes::{ModeSpec, TransitMode, normalize_transit_modes};

pub const DEFAULT_NUM_ITINERARIES: u32 = 3;
/// Metres
pub const DEFAULT_MAX_WALK_DISTANCE: f64 = 1000.0;
/// Metres
pub const DEFAULT_STOP_RADIUS: u32 = 500;

pub(crate) const PLAN_TRIP: &str = r#"
query planTrip(
  $from: InputCoordinates!,
  $to: InputCoordinates!,
  $numItineraries: Int!,
  $modes: [TransitMode!],
  $maxWalkDistance: Float,
  $wheelchair: Boolean,
  $time: String!,
  $arriveBy: Boolean
) {
  plan(
    from: $from
    to: $to
    numItineraries: $numItineraries
    transportModes: $modes
    maxWalkDistance: $maxWalkDistance
    wheelchair: $wheelchair
    time: $time
    arriveBy: $arriveBy
  ) {
    itineraries {
      duration
      walkTime
      transitTime
      waitingTime
      walkDistance
      legs {
        mode
        startTime
        endTime
        duration
        distance
        route { shortName longName type color textColor }
        from { name lat lon stop { gtfsId code platformCode } }
        to { name lat lon stop { gtfsId code platformCode } }
        legGeometry { length points }
        steps { distance streetName relativeDirection absoluteDirection stayOn bogusName lon lat }
        alerts { alertHeaderText alertDescriptionText effectiveStartDate effectiveEndDate }
      }
      fare { type currency cents }
      fares { type currency cents }
    }
  }
}
"#;

pub(crate) const LOCATION_SEARCH: &str = r#"
query locationSearch($text: String!) {
  geocode(searchText: $text) {
    features {
      properties { name label }
      geometry { coordinates }
    }
  }
}
"#;

pub(crate) const STOPS_NEARBY: &str = r#"
query stopsNearby($lat: Float!, $lon: Float!, $radius: Int!) {
  stopsByRadius(lat: $lat, lon: $lon, radius: $radius) {
    edges {
      node {
        stop { gtfsId name lat lon routes { shortName longName } }
        distance
      }
    }
  }
}
"#;

/// Body of a GraphQL POST.
#[derive(Debug, Serialize)]
pub(crate) struct GraphQlRequest<'a> {
    pub query: &'a str,
    pub variables: Value,
}

/// A trip planning request.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRequest {
    pub from: Coordinate,
    pub to: Coordinate,
    pub num_itineraries: u32,
    pub modes: Vec<TransitMode>,
    /// Metres
    pub max_walk_distance: f64,
    pub wheelchair: bool,
    /// Departure (or arrival) time; `None` means now
    pub time: Option<DateTime<Utc>>,
    pub arrive_by: bool,
}

impl PlanRequest {
    /// Depart now by local bus, with default limits.
    pub fn new(from: Coordinate, to: Coordinate) -> Self {
        Self {
            from,
            to,
            num_itineraries: DEFAULT_NUM_ITINERARIES,
            modes: vec![TransitMode::local_bus()],
            max_walk_distance: DEFAULT_MAX_WALK_DISTANCE,
            wheelchair: false,
            time: None,
            arrive_by: false,
        }
    }

    pub fn with_num_itineraries(mut self, n: u32) -> Self {
        self.num_itineraries = n;
        self
    }

    /// Validate and set the transit modes.
    pub fn with_modes(mut self, specs: &[ModeSpec]) -> Self {
        self.modes = normalize_transit_modes(specs);
        self
    }

    pub fn with_max_walk_distance(mut self, metres: f64) -> Self {
        self.max_walk_distance = metres;
        self
    }

    pub fn with_wheelchair(mut self, wheelchair: bool) -> Self {
        self.wheelchair = wheelchair;
        self
    }

    /// Plan for a fixed time instead of now.
    pub fn at(mut self, time: DateTime<Utc>) -> Self {
        self.time = Some(time);
        self
    }

    /// Treat the time (fixed or now) as the arrival deadline.
    pub fn with_arrive_by(mut self, arrive_by: bool) -> Self {
        self.arrive_by = arrive_by;
        self
    }

    /// GraphQL variables for [`PLAN_TRIP`], resolving an unset time to `now`.
    pub(crate) fn variables(&self, now: DateTime<Utc>) -> Value {
        let time = self.time.unwrap_or(now);
        json!({
            "from": {"lat": self.from.lat, "lon": self.from.lon},
            "to": {"lat": self.to.lat, "lon": self.to.lon},
            "numItineraries": self.num_itineraries,
            "modes": self.modes,
            "maxWalkDistance": self.max_walk_distance,
            "wheelchair": self.wheelchair,
            "time": time.to_rfc3339_opts(SecondsFormat::Millis, true),
            "arriveBy": self.arrive_by,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn plan_variables_defaults() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 2, 0, 0).unwrap();
        let request = PlanRequest::new(
            Coordinate::new(8.4801, 124.6472),
            Coordinate::new(8.4755, 124.661),
        );

        assert_eq!(
            request.variables(now),
            json!({
                "from": {"lat": 8.4801, "lon": 124.6472},
                "to": {"lat": 8.4755, "lon": 124.661},
                "numItineraries": 3,
                "modes": [{"mode": "BUS", "qualifier": "LOCAL_BUS"}],
                "maxWalkDistance": 1000.0,
                "wheelchair": false,
                "time": "2024-03-15T02:00:00.000Z",
                "arriveBy": false
            })
        );
    }

    #[test]
    fn plan_variables_overrides() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 2, 0, 0).unwrap();
        let arrive = Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap();
        let request = PlanRequest::new(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0))
            .with_num_itineraries(5)
            .with_modes(&[ModeSpec::Text("tram".into())])
            .with_max_walk_distance(400.0)
            .with_wheelchair(true)
            .at(arrive)
            .with_arrive_by(true);

        let vars = request.variables(now);
        assert_eq!(vars["numItineraries"], json!(5));
        assert_eq!(vars["modes"], json!([{"mode": "TRAM"}]));
        assert_eq!(vars["maxWalkDistance"], json!(400.0));
        assert_eq!(vars["wheelchair"], json!(true));
        assert_eq!(vars["time"], json!("2024-03-15T09:30:00.000Z"));
        assert_eq!(vars["arriveBy"], json!(true));
    }

    #[test]
    fn arrive_by_now() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 2, 0, 0).unwrap();
        let request = PlanRequest::new(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0))
            .with_arrive_by(true);

        let vars = request.variables(now);
        assert_eq!(vars["time"], json!("2024-03-15T02:00:00.000Z"));
        assert_eq!(vars["arriveBy"], json!(true));
    }

    #[test]
    fn queries_name_their_roots() {
        assert!(PLAN_TRIP.contains("plan("));
        assert!(PLAN_TRIP.contains("legGeometry"));
        assert!(LOCATION_SEARCH.contains("geocode(searchText: $text)"));
        assert!(STOPS_NEARBY.contains("stopsByRadius"));
    }
}
