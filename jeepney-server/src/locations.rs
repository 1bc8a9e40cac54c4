//! Location suggestions for the origin and destination search boxes.

use serde::Serialize;

use crate::domain::ServiceArea;
use crate::otp::GeocodeFeature;

/// Queries shorter than this (after trimming) are not sent to the geocoder.
pub const MIN_QUERY_LEN: usize = 3;

/// Most suggestions returned for one query.
pub const MAX_SUGGESTIONS: usize = 8;

const UNNAMED: &str = "Unnamed stop";

/// A geocoder hit the rider can pick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationSuggestion {
    pub name: String,
    pub label: String,
    pub lat: f64,
    pub lon: f64,
}

/// Whether `query` is long enough to search for.
pub fn is_searchable(query: &str) -> bool {
    query.trim().chars().count() >= MIN_QUERY_LEN
}

/// Turn geocoder features into suggestions inside `area`.
///
/// Features without a point are dropped. A missing name falls back to the
/// label, a missing label to the area name, and only labels accepted by
/// the area survive.
pub fn suggest(features: &[GeocodeFeature], area: &ServiceArea) -> Vec<LocationSuggestion> {
    features
        .iter()
        .filter_map(|feature| {
            let position = feature.coordinate()?;
            let label = feature.label().filter(|l| !l.is_empty());
            let name = feature
                .name()
                .filter(|n| !n.is_empty())
                .or(label)
                .unwrap_or(UNNAMED);
            let label = label.unwrap_or(&area.name);

            Some(LocationSuggestion {
                name: name.to_string(),
                label: label.to_string(),
                lat: position.lat,
                lon: position.lon,
            })
        })
        .filter(|s| area.accepts_label(&s.label))
        .take(MAX_SUGGESTIONS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::otp::{FeatureGeometry, FeatureProperties};

    fn feature(name: Option<&str>, label: Option<&str>, coordinates: Vec<f64>) -> GeocodeFeature {
        GeocodeFeature {
            properties: Some(FeatureProperties {
                name: name.map(String::from),
                label: label.map(String::from),
            }),
            geometry: Some(FeatureGeometry { coordinates }),
        }
    }

    #[test]
    fn short_queries_are_not_searchable() {
        assert!(!is_searchable(""));
        assert!(!is_searchable("  ab  "));
        assert!(is_searchable("gus"));
    }

    #[test]
    fn maps_geojson_order() {
        let features = [feature(
            Some("Gaisano City"),
            Some("Gaisano City, Cagayan de Oro"),
            vec![124.6572, 8.4822],
        )];
        let found = suggest(&features, &ServiceArea::default());
        assert_eq!(
            found,
            vec![LocationSuggestion {
                name: "Gaisano City".into(),
                label: "Gaisano City, Cagayan de Oro".into(),
                lat: 8.4822,
                lon: 124.6572,
            }]
        );
    }

    #[test]
    fn fallbacks_and_filtering() {
        let features = [
            feature(None, Some("Bulua Terminal, Cagayan de Oro"), vec![124.61, 8.49]),
            feature(Some("Cogon Market"), None, vec![124.65, 8.47]),
            feature(None, None, vec![124.64, 8.48]),
            feature(Some("Iligan Port"), Some("Iligan City"), vec![124.23, 8.23]),
            feature(Some("Nowhere"), Some("Cagayan de Oro"), vec![]),
        ];
        let names: Vec<_> = suggest(&features, &ServiceArea::default())
            .into_iter()
            .map(|s| (s.name, s.label))
            .collect();

        assert_eq!(
            names,
            vec![
                ("Bulua Terminal, Cagayan de Oro".to_string(), "Bulua Terminal, Cagayan de Oro".to_string()),
                ("Cogon Market".to_string(), "Cagayan de Oro".to_string()),
                ("Unnamed stop".to_string(), "Cagayan de Oro".to_string()),
            ]
        );
    }

    #[test]
    fn at_most_eight() {
        let features: Vec<_> = (0..12)
            .map(|i| feature(Some(&format!("Stop {i}")), Some("Cagayan de Oro"), vec![124.6, 8.4]))
            .collect();
        let found = suggest(&features, &ServiceArea::default());
        assert_eq!(found.len(), MAX_SUGGESTIONS);
        assert_eq!(found[7].name, "Stop 7");
    }
}
