//! Fares: what the planner reports, and what we estimate when it doesn't.

use serde::Serialize;

/// Currency used when neither the planner nor the fare model names one.
pub const DEFAULT_CURRENCY: &str = "PHP";

/// One entry of the legacy `fares` list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FareEntry {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub currency: Option<String>,
    pub cents: Option<i64>,
}

/// A monetary amount in minor units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Money {
    pub currency: Option<String>,
    pub cents: Option<i64>,
}

/// One entry of the newer `fareProducts` list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FareProduct {
    pub id: Option<String>,
    pub name: Option<String>,
    pub amount: Option<Money>,
}

/// The fare shown to the rider for a whole itinerary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Fare {
    /// Major units, rounded to 2 decimal places
    pub amount: f64,
    pub currency: String,
    /// True when computed from the fare model rather than reported upstream
    pub is_estimated: bool,
}

impl Fare {
    /// An authoritative fare from an amount in minor units.
    pub fn from_cents(cents: i64, currency: impl Into<String>) -> Self {
        Self {
            amount: cents as f64 / 100.0,
            currency: currency.into(),
            is_estimated: false,
        }
    }
}

/// Distance-based jeepney fare matrix.
///
/// The base fare covers the first `base_distance_km`; every started
/// kilometre beyond that adds `per_km`.
#[derive(Debug, Clone, PartialEq)]
pub struct FareModel {
    pub base_fare: f64,
    pub base_distance_km: f64,
    pub per_km: f64,
    pub currency: String,
}

impl FareModel {
    /// Estimate the fare for `distance_m` metres of riding.
    ///
    /// Returns `None` unless the distance is positive.
    ///
    /// # Examples
    ///
    /// ```
    /// use jeepney_server::domain::FareModel;
    ///
    /// let model = FareModel::default();
    /// let fare = model.estimate(6000.0).unwrap();
    /// assert_eq!(fare.amount, 15.6);
    /// assert!(fare.is_estimated);
    /// ```
    pub fn estimate(&self, distance_m: f64) -> Option<Fare> {
        if !distance_m.is_finite() || distance_m <= 0.0 {
            return None;
        }

        let km = distance_m / 1000.0;
        let extra_km = (km - self.base_distance_km).max(0.0).ceil();
        let amount = round_cents(self.base_fare + extra_km * self.per_km);

        Some(Fare {
            amount,
            currency: self.currency.clone(),
            is_estimated: true,
        })
    }
}

impl Default for FareModel {
    fn default() -> Self {
        Self {
            base_fare: 12.0,
            base_distance_km: 4.0,
            per_km: 1.8,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
