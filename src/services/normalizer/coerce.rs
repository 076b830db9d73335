//! Interpretation of untyped upstream leaves
//!
//! All reads of `serde_json::Value` leaves coming from the scraping backend go
//! through these helpers. None of them fail: a value of the wrong shape is
//! reported as absent (`None` / `false`) and the caller applies its default.

use serde_json::Value;

/// Sentinel used by the provider for "on" flags
const FLAG_ON: f64 = 1.0;

/// A provider flag is set only when it is exactly the number `1`.
///
/// `true`, `"1"`, `2` and friends are all treated as unset.
pub fn flag_is_set(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Number(n)) => n.as_f64() == Some(FLAG_ON),
        _ => false,
    }
}

/// Loose truthiness used by the charge flags.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => {
            let s = s.trim();
            !s.is_empty() && s != "0" && !s.eq_ignore_ascii_case("false")
        }
        _ => false,
    }
}

/// Integer from a JSON number or a numeric string. Fractions truncate toward
/// zero.
pub fn to_int(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|u| i64::try_from(u).unwrap_or(i64::MAX)))
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            })
        }
        _ => None,
    }
}

/// String value only; other shapes are absent.
pub fn to_str(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

/// Identifier-like value: strings as-is, numbers stringified.
pub fn to_id(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// String elements of a list, in order. Other elements are skipped.
pub fn to_str_list(values: Option<&[Value]>) -> Vec<String> {
    values
        .unwrap_or_default()
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect()
}
