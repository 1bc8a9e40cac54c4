//! Transport modes reported by the planner.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

/// Mode of a single leg.
///
/// Legacy OTP reports upper-case names (`"BUS"`), Transmodel lower-case
/// ones (`"bus"`, `"foot"`). Both map onto the same variant; anything
/// unrecognized is kept verbatim in `Other`.
///
/// # Examples
///
/// ```
/// use jeepney_server::domain::TransportMode;
///
/// assert_eq!(TransportMode::parse("BUS"), TransportMode::Bus);
/// assert_eq!(TransportMode::parse("foot"), TransportMode::Walk);
/// assert_eq!(TransportMode::parse("hovercraft").as_str(), "hovercraft");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TransportMode {
    Walk,
    Bus,
    Car,
    Bicycle,
    Tram,
    Rail,
    Subway,
    Ferry,
    CableCar,
    Gondola,
    Funicular,
    Other(String),
}

impl TransportMode {
    /// Parse a mode name, case-insensitively.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "WALK" | "FOOT" => Self::Walk,
            "BUS" => Self::Bus,
            "CAR" => Self::Car,
            "BICYCLE" | "BIKE" => Self::Bicycle,
            "TRAM" => Self::Tram,
            "RAIL" => Self::Rail,
            "SUBWAY" | "METRO" => Self::Subway,
            "FERRY" | "WATER" => Self::Ferry,
            "CABLE_CAR" => Self::CableCar,
            "GONDOLA" => Self::Gondola,
            "FUNICULAR" => Self::Funicular,
            _ => Self::Other(s.to_string()),
        }
    }

    /// Read a mode from a JSON value; only strings are accepted.
    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(Self::parse)
    }

    /// Canonical name (upper-case for known modes).
    pub fn as_str(&self) -> &str {
        match self {
            Self::Walk => "WALK",
            Self::Bus => "BUS",
            Self::Car => "CAR",
            Self::Bicycle => "BICYCLE",
            Self::Tram => "TRAM",
            Self::Rail => "RAIL",
            Self::Subway => "SUBWAY",
            Self::Ferry => "FERRY",
            Self::CableCar => "CABLE_CAR",
            Self::Gondola => "GONDOLA",
            Self::Funicular => "FUNICULAR",
            Self::Other(s) => s,
        }
    }

    pub fn is_walk(&self) -> bool {
        matches!(self, Self::Walk)
    }

    /// Jeepneys are published as GTFS buses.
    pub fn is_jeepney(&self) -> bool {
        matches!(self, Self::Bus)
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TransportMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_legacy_and_transmodel_names() {
        assert_eq!(TransportMode::parse("WALK"), TransportMode::Walk);
        assert_eq!(TransportMode::parse("foot"), TransportMode::Walk);
        assert_eq!(TransportMode::parse("bus"), TransportMode::Bus);
        assert_eq!(TransportMode::parse("metro"), TransportMode::Subway);
        assert_eq!(TransportMode::parse("CABLE_CAR"), TransportMode::CableCar);
    }

    #[test]
    fn unknown_mode_kept_verbatim() {
        let mode = TransportMode::parse("Tricycle");
        assert_eq!(mode, TransportMode::Other("Tricycle".into()));
        assert_eq!(mode.to_string(), "Tricycle");
    }

    #[test]
    fn from_value_requires_string() {
        assert_eq!(TransportMode::from_value(&json!("BUS")), Some(TransportMode::Bus));
        assert_eq!(TransportMode::from_value(&json!(3)), None);
        assert_eq!(TransportMode::from_value(&Value::Null), None);
    }

    #[test]
    fn serializes_canonical_name() {
        assert_eq!(serde_json::to_value(TransportMode::parse("bus")).unwrap(), json!("BUS"));
        assert_eq!(
            serde_json::to_value(TransportMode::Other("coach".into())).unwrap(),
            json!("coach")
        );
    }

    #[test]
    fn walk_and_jeepney_predicates() {
        assert!(TransportMode::Walk.is_walk());
        assert!(!TransportMode::Bus.is_walk());
        assert!(TransportMode::Bus.is_jeepney());
        assert!(!TransportMode::Tram.is_jeepney());
    }
}
