//! Planner GraphQL response DTOs.
//!
//! Only the geocoder and stop queries are typed. Trip plans stay untyped
//! JSON until the normalizer has probed them.
//!
//! Everything is `Option` or defaulted because the planner omits fields
//! rather than sending nulls, depending on its version.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::Coordinate;

use super::error::OtpError;

const UNKNOWN_GRAPHQL_ERROR: &str = "The OTP server returned an unknown error.";

/// Generic GraphQL response envelope.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Option<Value>,
}

/// Fail if a GraphQL `errors` value is a non-empty array.
///
/// Messages are joined with `"; "`; errors without a message fall back to a
/// generic text.
pub(crate) fn check_graphql_errors(errors: Option<&Value>) -> Result<(), OtpError> {
    let Some(errors) = errors.and_then(Value::as_array).filter(|e| !e.is_empty()) else {
        return Ok(());
    };

    let message = errors
        .iter()
        .filter_map(|e| e.get("message").and_then(Value::as_str))
        .filter(|m| !m.is_empty())
        .collect::<Vec<_>>()
        .join("; ");

    if message.is_empty() {
        Err(OtpError::GraphQl(UNKNOWN_GRAPHQL_ERROR.to_string()))
    } else {
        Err(OtpError::GraphQl(message))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GeocodeData {
    pub geocode: Option<Geocode>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Geocode {
    #[serde(default)]
    pub features: Vec<GeocodeFeature>,
}

/// A GeoJSON feature from the planner's geocoder.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeocodeFeature {
    pub properties: Option<FeatureProperties>,
    pub geometry: Option<FeatureGeometry>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureProperties {
    pub name: Option<String>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureGeometry {
    /// GeoJSON order: longitude first
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

impl GeocodeFeature {
    pub fn name(&self) -> Option<&str> {
        self.properties.as_ref()?.name.as_deref()
    }

    pub fn label(&self) -> Option<&str> {
        self.properties.as_ref()?.label.as_deref()
    }

    /// Position of the feature, if the geometry is a finite point.
    pub fn coordinate(&self) -> Option<Coordinate> {
        match self.geometry.as_ref()?.coordinates.as_slice() {
            [lon, lat, ..] if lat.is_finite() && lon.is_finite() => {
                Some(Coordinate::new(*lat, *lon))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StopsByRadiusData {
    pub stops_by_radius: Option<StopConnection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct StopConnection {
    #[serde(default)]
    pub edges: Vec<StopEdge>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StopEdge {
    pub node: Option<NearbyStop>,
}

/// A stop near a point, with its distance from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyStop {
    pub stop: Option<Stop>,
    /// Metres
    pub distance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    pub gtfs_id: Option<String>,
    pub name: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    #[serde(default)]
    pub routes: Vec<StopRoute>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopRoute {
    pub short_name: Option<String>,
    pub long_name: Option<String>,
}

impl StopConnection {
    pub fn into_stops(self) -> Vec<NearbyStop> {
        self.edges.into_iter().filter_map(|e| e.node).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn no_errors() {
        assert!(check_graphql_errors(None).is_ok());
        assert!(check_graphql_errors(Some(&json!([]))).is_ok());
        assert!(check_graphql_errors(Some(&json!(null))).is_ok());
    }

    #[test]
    fn error_messages_joined() {
        let errors = json!([
            {"message": "Variable 'from' is invalid"},
            {"locations": []},
            {"message": "Timeout"}
        ]);
        let err = check_graphql_errors(Some(&errors)).unwrap_err();
        assert!(matches!(
            err,
            OtpError::GraphQl(ref m) if m == "Variable 'from' is invalid; Timeout"
        ));
    }

    #[test]
    fn errors_without_messages() {
        let err = check_graphql_errors(Some(&json!([{"path": ["plan"]}]))).unwrap_err();
        assert!(matches!(err, OtpError::GraphQl(ref m) if m == UNKNOWN_GRAPHQL_ERROR));
    }

    #[test]
    fn geocode_response() {
        let body = json!({"data": {"geocode": {"features": [
            {
                "properties": {"name": "Limketkai Center", "label": "Limketkai Center, Cagayan de Oro"},
                "geometry": {"coordinates": [124.6561, 8.4823]}
            },
            {"properties": {"name": "No geometry"}},
            {"geometry": {"coordinates": [124.6]}}
        ]}}});
        let response: GraphQlResponse<GeocodeData> = serde_json::from_value(body).unwrap();
        let features = response.data.unwrap().geocode.unwrap().features;

        assert_eq!(features.len(), 3);
        assert_eq!(features[0].name(), Some("Limketkai Center"));
        assert_eq!(features[0].coordinate(), Some(Coordinate::new(8.4823, 124.6561)));
        assert_eq!(features[1].coordinate(), None);
        assert_eq!(features[2].coordinate(), None);
        assert_eq!(features[2].label(), None);
    }

    #[test]
    fn stops_response() {
        let body = json!({"data": {"stopsByRadius": {"edges": [
            {"node": {
                "stop": {
                    "gtfsId": "1:div",
                    "name": "Divisoria",
                    "lat": 8.4806,
                    "lon": 124.6478,
                    "routes": [{"shortName": "R2", "longName": "Bugo - Carmen"}]
                },
                "distance": 120.0
            }},
            {"node": null}
        ]}}});
        let response: GraphQlResponse<StopsByRadiusData> = serde_json::from_value(body).unwrap();
        let stops = response.data.unwrap().stops_by_radius.unwrap().into_stops();

        assert_eq!(stops.len(), 1);
        let stop = stops[0].stop.as_ref().unwrap();
        assert_eq!(stop.gtfs_id.as_deref(), Some("1:div"));
        assert_eq!(stop.routes[0].short_name.as_deref(), Some("R2"));
        assert_eq!(stops[0].distance, Some(120.0));
    }
}
