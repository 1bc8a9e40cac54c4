//! The geographic area the planner serves.

use super::{BoundingBox, Coordinate, DomainError};

/// City the service is deployed for, with the box trips must fall inside.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceArea {
    /// Display name, also used as the default location label
    pub name: String,

    /// Lowercase substring a geocoder label must contain to be suggested
    pub label_filter: String,

    /// Origins and destinations outside this box are rejected
    pub bounds: BoundingBox,

    /// Initial map centre
    pub center: Coordinate,
}

impl ServiceArea {
    /// Whether `c` lies inside the service area.
    pub fn contains(&self, c: Coordinate) -> bool {
        self.bounds.contains(c)
    }

    /// Validate that a trip endpoint lies inside the area.
    pub fn check(&self, what: &'static str, c: Coordinate) -> Result<Coordinate, DomainError> {
        if self.contains(c) {
            Ok(c)
        } else {
            Err(DomainError::OutsideServiceArea {
                what,
                area: self.name.clone(),
            })
        }
    }

    /// Whether a geocoder label belongs to this area (case-insensitive).
    pub fn accepts_label(&self, label: &str) -> bool {
        label.to_lowercase().contains(&self.label_filter)
    }
}

impl Default for ServiceArea {
    /// Cagayan de Oro, centred on Divisoria.
    fn default() -> Self {
        Self {
            name: "Cagayan de Oro".to_string(),
            label_filter: "cagayan".to_string(),
            bounds: BoundingBox::new(8.3542, 124.5319, 8.5542, 124.7319),
            center: Coordinate::new(8.482, 124.647),
        }
    }
}
