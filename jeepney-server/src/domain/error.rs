//! Domain error types.
//!
//! These errors represent validation failures on values entering the
//! domain layer from callers. They are distinct from planner/IO errors.

/// Domain-level validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// Latitude/longitude not finite or outside WGS84 ranges
    #[error("invalid coordinate: ({lat}, {lon})")]
    InvalidCoordinate { lat: f64, lon: f64 },

    /// Coordinate lies outside the configured service area
    #[error("{what} is outside the {area} service area")]
    OutsideServiceArea { what: &'static str, area: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DomainError::InvalidCoordinate {
            lat: 91.0,
            lon: 0.0,
        };
        assert_eq!(err.to_string(), "invalid coordinate: (91, 0)");

        let err = DomainError::OutsideServiceArea {
            what: "origin",
            area: "Cagayan de Oro".into(),
        };
        assert_eq!(
            err.to_string(),
            "origin is outside the Cagayan de Oro service area"
        );
    }
}
