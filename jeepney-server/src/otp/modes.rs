//! Transit mode filters sent with trip requests.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Modes the planner's `TransitMode` input accepts.
const VALID_MODES: &[&str] = &[
    "BUS",
    "TRAM",
    "RAIL",
    "SUBWAY",
    "FERRY",
    "CABLE_CAR",
    "GONDOLA",
    "FUNICULAR",
];

const VALID_QUALIFIERS: &[&str] = &["LOCAL_BUS", "REGIONAL_BUS", "INTERCITY_BUS", "EXPRESS_BUS"];

/// A requested mode as a client sent it: `"BUS:LOCAL_BUS"` or
/// `{"mode": "BUS", "qualifier": "LOCAL_BUS"}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ModeSpec {
    Text(String),
    Object(Map<String, Value>),
    Other(Value),
}

/// A validated transit mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitMode {
    pub mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,
}

impl TransitMode {
    /// Jeepneys are published as local buses.
    pub fn local_bus() -> Self {
        Self {
            mode: "BUS".to_string(),
            qualifier: Some("LOCAL_BUS".to_string()),
        }
    }

    fn from_parts(mode: &str, qualifier: Option<&str>) -> Option<Self> {
        let mode = mode.trim().to_ascii_uppercase();
        if !VALID_MODES.contains(&mode.as_str()) {
            return None;
        }
        let qualifier = qualifier
            .map(|q| q.trim().to_ascii_uppercase())
            .filter(|q| VALID_QUALIFIERS.contains(&q.as_str()));
        Some(Self { mode, qualifier })
    }
}

impl fmt::Display for TransitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(q) => write!(f, "{}:{}", self.mode, q),
            None => f.write_str(&self.mode),
        }
    }
}

impl ModeSpec {
    fn to_transit_mode(&self) -> Option<TransitMode> {
        match self {
            Self::Text(s) => {
                let mut parts = s.split(':');
                let mode = parts.next()?;
                TransitMode::from_parts(mode, parts.next())
            }
            Self::Object(obj) => {
                let mode = obj.get("mode")?.as_str()?;
                TransitMode::from_parts(mode, obj.get("qualifier").and_then(Value::as_str))
            }
            Self::Other(_) => None,
        }
    }
}

/// Validate requested modes, dropping unknown modes and qualifiers.
///
/// An empty request, or one where nothing survives, falls back to local
/// buses.
///
/// ```
/// use jeepney_server::otp::{ModeSpec, TransitMode, normalize_transit_modes};
///
/// let modes = normalize_transit_modes(&[ModeSpec::Text("tram:LOCAL_BUS".into())]);
/// assert_eq!(modes[0].to_string(), "TRAM:LOCAL_BUS");
///
/// assert_eq!(normalize_transit_modes(&[]), vec![TransitMode::local_bus()]);
/// ```
pub fn normalize_transit_modes(specs: &[ModeSpec]) -> Vec<TransitMode> {
    let modes: Vec<_> = specs.iter().filter_map(ModeSpec::to_transit_mode).collect();
    if modes.is_empty() {
        vec![TransitMode::local_bus()]
    } else {
        modes
    }
}
