//! Mock planner for running without an OpenTripPlanner server.
//!
//! Loads recorded planner responses from JSON files and serves them as if
//! they were live.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::future::{self, BoxFuture};
use futures::FutureExt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::info;

use crate::domain::Coordinate;

use super::error::OtpError;
use super::planner::TripPlanner;
use super::query::PlanRequest;
use super::types::{GeocodeFeature, NearbyStop};

/// Geocoder results, as a JSON array of features.
const LOCATIONS_FILE: &str = "locations.json";
/// Stops for radius queries, as a JSON array of `{stop, distance}` nodes.
const STOPS_FILE: &str = "stops.json";

/// Planner that serves data from JSON files.
///
/// Every other `*.json` file in the directory is a recorded trip plan.
/// Plans are served round-robin in file name order, whatever the request.
#[derive(Debug, Clone)]
pub struct MockPlanner {
    plans: Arc<Vec<Value>>,
    locations: Arc<Vec<GeocodeFeature>>,
    stops: Arc<Vec<NearbyStop>>,
    next_plan: Arc<AtomicUsize>,
}

impl MockPlanner {
    /// Load fixtures from `data_dir`.
    ///
    /// Fails if the directory can't be read, a file isn't valid JSON, or
    /// there are no plan files.
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, OtpError> {
        let data_dir = data_dir.as_ref();

        let entries = std::fs::read_dir(data_dir).map_err(|e| {
            OtpError::Mock(format!("failed to read mock data directory {data_dir:?}: {e}"))
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry
                .map_err(|e| OtpError::Mock(format!("failed to read directory entry: {e}")))?;
            let path = entry.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut plans = Vec::new();
        let mut locations = Vec::new();
        let mut stops = Vec::new();

        for path in &paths {
            match path.file_name().and_then(|s| s.to_str()) {
                Some(LOCATIONS_FILE) => locations = load(path)?,
                Some(STOPS_FILE) => stops = load(path)?,
                _ => plans.push(load::<Value>(path)?),
            }
        }

        if plans.is_empty() {
            return Err(OtpError::Mock(format!(
                "no mock plan files found in {data_dir:?}"
            )));
        }

        info!(
            plans = plans.len(),
            locations = locations.len(),
            stops = stops.len(),
            "loaded mock planner data"
        );

        Ok(Self {
            plans: Arc::new(plans),
            locations: Arc::new(locations),
            stops: Arc::new(stops),
            next_plan: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn plan_count(&self) -> usize {
        self.plans.len()
    }

    fn next_plan(&self) -> Value {
        let i = self.next_plan.fetch_add(1, Ordering::Relaxed) % self.plans.len();
        self.plans[i].clone()
    }

    /// Features whose name or label contains `text`, ignoring case.
    fn matching_locations(&self, text: &str) -> Vec<GeocodeFeature> {
        let needle = text.trim().to_lowercase();
        self.locations
            .iter()
            .filter(|f| {
                [f.name(), f.label()]
                    .into_iter()
                    .flatten()
                    .any(|s| s.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect()
    }

    /// Stops within `radius` metres of `center`, nearest first, with the
    /// distance recomputed from `center`.
    fn stops_within(&self, center: Coordinate, radius: u32) -> Vec<NearbyStop> {
        let mut found: Vec<NearbyStop> = self
            .stops
            .iter()
            .filter_map(|node| {
                let stop = node.stop.as_ref()?;
                let position = Coordinate::new(stop.lat?, stop.lon?);
                let distance = center.distance_m(position);
                (distance <= f64::from(radius)).then(|| NearbyStop {
                    stop: Some(stop.clone()),
                    distance: Some(distance.round()),
                })
            })
            .collect();
        found.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        found
    }
}

fn load<T: DeserializeOwned>(path: &Path) -> Result<T, OtpError> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| OtpError::Mock(format!("failed to read {path:?}: {e}")))?;
    serde_json::from_str(&json).map_err(|e| OtpError::Mock(format!("failed to parse {path:?}: {e}")))
}

impl TripPlanner for MockPlanner {
    fn plan_trip<'a>(&'a self, _request: &'a PlanRequest) -> BoxFuture<'a, Result<Value, OtpError>> {
        future::ready(Ok(self.next_plan())).boxed()
    }

    fn search_locations<'a>(
        &'a self,
        text: &'a str,
    ) -> BoxFuture<'a, Result<Vec<GeocodeFeature>, OtpError>> {
        future::ready(Ok(self.matching_locations(text))).boxed()
    }

    fn nearby_stops(
        &self,
        center: Coordinate,
        radius: u32,
    ) -> BoxFuture<'_, Result<Vec<NearbyStop>, OtpError>> {
        future::ready(Ok(self.stops_within(center, radius))).boxed()
    }
}
