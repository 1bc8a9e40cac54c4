//! Leg timestamps as reported by the planner.
//!
//! Legacy OTP sends epoch milliseconds; Transmodel sends ISO-8601 strings
//! with an offset. The original representation is kept so responses can be
//! echoed back unchanged, and parsed on demand for arithmetic.

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::Serialize;
use serde_json::Value;

/// A leg start or end time in whichever form the planner sent it.
///
/// # Examples
///
/// ```
/// use jeepney_server::domain::Timestamp;
///
/// let start = Timestamp::Text("2024-03-15T10:00:00+08:00".into());
/// let end = Timestamp::Text("2024-03-15T10:25:30+08:00".into());
/// assert_eq!(start.seconds_until(&end), Some(1530.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Timestamp {
    /// Milliseconds since the Unix epoch
    EpochMillis(i64),
    /// ISO-8601 text, not necessarily valid
    Text(String),
}

impl Timestamp {
    /// Read a timestamp from JSON. Numbers are epoch milliseconds, strings
    /// are kept as text; everything else (including `null`) is absent.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64))
                .map(Self::EpochMillis),
            Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }

    /// Parse into an absolute instant, if the value is well-formed.
    ///
    /// Text without an offset is taken as UTC.
    pub fn to_datetime(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            Self::EpochMillis(ms) => DateTime::from_timestamp_millis(*ms).map(|d| d.fixed_offset()),
            Self::Text(s) => {
                let s = s.trim();
                DateTime::parse_from_rfc3339(s)
                    .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z"))
                    .ok()
                    .or_else(|| {
                        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                            .ok()
                            .map(|n| n.and_utc().fixed_offset())
                    })
            }
        }
    }

    /// Seconds from `self` to `end`, when both parse.
    pub fn seconds_until(&self, end: &Timestamp) -> Option<f64> {
        let start = self.to_datetime()?;
        let end = end.to_datetime()?;
        Some((end - start).num_milliseconds() as f64 / 1000.0)
    }
}
