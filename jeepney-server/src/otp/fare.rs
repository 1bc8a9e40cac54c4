//! Fare resolution for a raw itinerary.
//!
//! Sources are tried in a fixed order: the single `fare` object (including
//! OTP1's nested `fare.fare` map), the summed `fares` list, the summed
//! `fareProducts` list, an already resolved `totalFare`, and finally the
//! distance-based estimate.
//!
//! Sums saturate at `i64::MAX` cents.

use serde_json::Value;

use crate::domain::{Fare, FareEntry, FareModel, FareProduct, Leg, Money, transit_distance_m};

use super::probe;

/// Parse the legacy `fares` list; absent or non-array means empty.
pub(crate) fn parse_fares(raw: &Value) -> Vec<FareEntry> {
    probe::array(raw, &["fares"])
        .map(|entries| {
            entries
                .iter()
                .filter(|e| e.is_object())
                .map(|e| FareEntry {
                    kind: probe::string(e, &["type"]).map(str::to_string),
                    currency: probe::currency(e, &["currency"]),
                    cents: probe::cents(e, &["cents"]),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Parse the `fareProducts` list; absent or non-array means empty.
pub(crate) fn parse_fare_products(raw: &Value) -> Vec<FareProduct> {
    probe::array(raw, &["fareProducts"])
        .map(|products| {
            products
                .iter()
                .filter(|p| p.is_object())
                .map(|p| FareProduct {
                    id: probe::id(p, &["id"]),
                    name: probe::string(p, &["name"]).map(str::to_string),
                    amount: probe::at(p, &["amount"]).filter(|a| a.is_object()).map(|a| Money {
                        currency: probe::currency(a, &["currency"]),
                        cents: probe::cents(a, &["cents"]),
                    }),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Resolve the display fare for an itinerary.
///
/// Only positive amounts count as fare data; a zero total falls through
/// to the next source.
pub(crate) fn resolve(
    raw: &Value,
    fares: &[FareEntry],
    products: &[FareProduct],
    legs: &[Leg],
    model: &FareModel,
) -> Option<Fare> {
    let currency_or_default = |c: Option<String>| c.unwrap_or_else(|| model.currency.clone());

    if let Some((cents, currency)) = single_fare(raw) {
        return Some(Fare::from_cents(cents, currency_or_default(currency)));
    }

    let listed = fares
        .iter()
        .filter_map(|f| f.cents)
        .fold(0, i64::saturating_add);
    if listed > 0 {
        let currency = fares.first().and_then(|f| f.currency.clone());
        return Some(Fare::from_cents(listed, currency_or_default(currency)));
    }

    let amounts = products.iter().filter_map(|p| p.amount.as_ref());
    let product_total = amounts
        .clone()
        .filter_map(|a| a.cents)
        .fold(0, i64::saturating_add);
    if product_total > 0 {
        let currency = amounts.clone().next().and_then(|a| a.currency.clone());
        return Some(Fare::from_cents(product_total, currency_or_default(currency)));
    }

    if let Some(fare) = resolved_fare(raw, model) {
        return Some(fare);
    }

    model.estimate(transit_distance_m(legs))
}

/// A `totalFare` left by an earlier normalization pass, kept as it was.
fn resolved_fare(raw: &Value, model: &FareModel) -> Option<Fare> {
    let amount = probe::number(raw, &["totalFare", "amount"]).filter(|a| *a > 0.0)?;
    Some(Fare {
        amount,
        currency: probe::currency(raw, &["totalFare", "currency"])
            .unwrap_or_else(|| model.currency.clone()),
        is_estimated: probe::at(raw, &["totalFare", "isEstimated"])
            .and_then(Value::as_bool)
            .unwrap_or(false),
    })
}

/// The explicit `fare` object: `{cents, currency}` or OTP1's
/// `{fare: {regular: {cents, currency}}}`.
fn single_fare(raw: &Value) -> Option<(i64, Option<String>)> {
    if let Some(cents) = probe::cents(raw, &["fare", "cents"]).filter(|c| *c > 0) {
        return Some((cents, probe::currency(raw, &["fare", "currency"])));
    }

    let nested = probe::at(raw, &["fare", "fare"])?.as_object()?;
    let total = nested
        .values()
        .filter_map(|f| probe::cents(f, &["cents"]))
        .fold(0, i64::saturating_add);
    if total <= 0 {
        return None;
    }
    let currency = nested.values().find_map(|f| probe::currency(f, &["currency"]));
    Some((total, currency))
}
