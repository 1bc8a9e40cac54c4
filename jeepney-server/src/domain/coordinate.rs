//! Geographic coordinates and simple geometry over them.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::DomainError;

/// Mean Earth radius used for great-circle distances.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS84 position.
///
/// Serialized as a two-element `[lat, lon]` array, which is what map
/// front-ends consume directly.
///
/// # Examples
///
/// ```
/// use jeepney_server::domain::Coordinate;
///
/// let divisoria = Coordinate::new(8.4778, 124.6470);
/// let json = serde_json::to_string(&divisoria).unwrap();
/// assert_eq!(json, "[8.4778,124.647]");
/// ```
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    /// Create a coordinate without range checks.
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Create a coordinate, rejecting non-finite or out-of-range values.
    pub fn checked(lat: f64, lon: f64) -> Result<Self, DomainError> {
        let valid = lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon);

        if valid {
            Ok(Self { lat, lon })
        } else {
            Err(DomainError::InvalidCoordinate { lat, lon })
        }
    }

    /// Great-circle distance to `other` in metres.
    ///
    /// ```
    /// use jeepney_server::domain::Coordinate;
    ///
    /// let a = Coordinate::new(8.4801, 124.6472);
    /// assert_eq!(a.distance_m(a), 0.0);
    /// ```
    pub fn distance_m(self, other: Coordinate) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlat = (other.lat - self.lat).to_radians();
        let dlon = (other.lon - self.lon).to_radians();

        let sin_dlat = (dlat / 2.0).sin();
        let sin_dlon = (dlon / 2.0).sin();

        let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
        2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lon): (f64, f64)) -> Self {
        Self { lat, lon }
    }
}

impl From<Coordinate> for (f64, f64) {
    fn from(c: Coordinate) -> Self {
        (c.lat, c.lon)
    }
}

impl fmt::Debug for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coordinate({}, {})", self.lat, self.lon)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.lon)
    }
}

/// An axis-aligned latitude/longitude box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub const fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        }
    }

    /// Smallest box containing every point, or `None` for no points.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Coordinate>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let init = Self::new(first.lat, first.lon, first.lat, first.lon);

        Some(iter.fold(init, |b, c| Self {
            min_lat: b.min_lat.min(c.lat),
            min_lon: b.min_lon.min(c.lon),
            max_lat: b.max_lat.max(c.lat),
            max_lon: b.max_lon.max(c.lon),
        }))
    }

    /// Whether `c` lies inside the box (edges inclusive).
    pub fn contains(&self, c: Coordinate) -> bool {
        (self.min_lat..=self.max_lat).contains(&c.lat)
            && (self.min_lon..=self.max_lon).contains(&c.lon)
    }

    /// Grow the box on every side by `ratio` of its height/width.
    pub fn padded(&self, ratio: f64) -> Self {
        let dlat = (self.max_lat - self.min_lat) * ratio;
        let dlon = (self.max_lon - self.min_lon) * ratio;
        Self {
            min_lat: self.min_lat - dlat,
            min_lon: self.min_lon - dlon,
            max_lat: self.max_lat + dlat,
            max_lon: self.max_lon + dlon,
        }
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_pair() {
        let c = Coordinate::new(38.5, -120.2);
        assert_eq!(serde_json::to_value(c).unwrap(), serde_json::json!([38.5, -120.2]));

        let back: Coordinate = serde_json::from_str("[38.5,-120.2]").unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn checked_rejects_out_of_range() {
        assert!(Coordinate::checked(8.48, 124.64).is_ok());
        assert!(Coordinate::checked(90.0, 180.0).is_ok());
        assert!(Coordinate::checked(90.1, 0.0).is_err());
        assert!(Coordinate::checked(0.0, -180.5).is_err());
        assert!(Coordinate::checked(f64::NAN, 0.0).is_err());
        assert!(Coordinate::checked(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn haversine_known_distance() {
        // One degree of latitude is ~111.2 km everywhere.
        let a = Coordinate::new(8.0, 124.0);
        let b = Coordinate::new(9.0, 124.0);
        let d = a.distance_m(b);
        assert!((d - 111_195.0).abs() < 50.0, "got {d}");
    }

    #[test]
    fn haversine_symmetric() {
        let a = Coordinate::new(8.4801, 124.6472);
        let b = Coordinate::new(8.4755, 124.6610);
        assert!((a.distance_m(b) - b.distance_m(a)).abs() < 1e-9);
    }

    #[test]
    fn bounding_box_from_points() {
        let bounds = BoundingBox::from_points([
            Coordinate::new(8.48, 124.65),
            Coordinate::new(8.47, 124.66),
            Coordinate::new(8.49, 124.64),
        ])
        .unwrap();

        assert_eq!(bounds, BoundingBox::new(8.47, 124.64, 8.49, 124.66));
        assert!(bounds.contains(Coordinate::new(8.48, 124.65)));
        assert!(!bounds.contains(Coordinate::new(8.50, 124.65)));
        assert!(BoundingBox::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn padded_grows_each_side() {
        let b = BoundingBox::new(0.0, 0.0, 10.0, 20.0).padded(0.1);
        assert_eq!(b, BoundingBox::new(-1.0, -2.0, 11.0, 22.0));
        assert_eq!(b.center(), Coordinate::new(5.0, 10.0));
    }
}
