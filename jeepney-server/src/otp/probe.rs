//! Defensive lookups into untyped planner JSON.
//!
//! Every accessor treats a missing key, a `null`, and a value of the wrong
//! type the same way: as absent. Paths are slices of object keys so probe
//! orders can live in constant tables.

use serde_json::Value;

/// A path of object keys from some root value.
pub(crate) type KeyPath = &'static [&'static str];

/// Follow `path` from `root`; `None` if any step is missing or the
/// result is `null`.
pub(crate) fn at<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let value = path.iter().try_fold(root, |v, key| v.as_object()?.get(*key))?;
    (!value.is_null()).then_some(value)
}

/// First non-null value among `paths`, in order.
pub(crate) fn first<'a>(root: &'a Value, paths: &[KeyPath]) -> Option<&'a Value> {
    paths.iter().find_map(|p| at(root, p))
}

/// A finite JSON number at `path`. Numeric strings are not accepted.
pub(crate) fn number(root: &Value, path: &[&str]) -> Option<f64> {
    at(root, path)?.as_f64().filter(|f| f.is_finite())
}

/// First finite number among `paths`, in order.
pub(crate) fn first_number(root: &Value, paths: &[KeyPath]) -> Option<f64> {
    paths.iter().find_map(|p| number(root, p))
}

pub(crate) fn string<'a>(root: &'a Value, path: &[&str]) -> Option<&'a str> {
    at(root, path)?.as_str()
}

/// First string among `paths`, skipping empty strings.
pub(crate) fn first_string<'a>(root: &'a Value, paths: &[KeyPath]) -> Option<&'a str> {
    paths
        .iter()
        .filter_map(|p| string(root, p))
        .find(|s| !s.is_empty())
}

/// An identifier, which upstream sends as either a string or a number.
pub(crate) fn id(root: &Value, path: &[&str]) -> Option<String> {
    match at(root, path)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn first_id(root: &Value, paths: &[KeyPath]) -> Option<String> {
    paths.iter().find_map(|p| id(root, p))
}

pub(crate) fn array<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Vec<Value>> {
    at(root, path)?.as_array()
}

pub(crate) fn first_array<'a>(root: &'a Value, paths: &[KeyPath]) -> Option<&'a Vec<Value>> {
    paths.iter().find_map(|p| array(root, p))
}

/// An amount in minor units. Fractional cents are rounded.
pub(crate) fn cents(root: &Value, path: &[&str]) -> Option<i64> {
    let n = at(root, path)?.as_number()?;
    n.as_i64()
        .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64))
}

/// A currency code, either a plain string or OTP1's `{currencyCode}` object.
pub(crate) fn currency(root: &Value, path: &[&str]) -> Option<String> {
    let value = at(root, path)?;
    value
        .as_str()
        .or_else(|| string(value, &["currencyCode"]))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
