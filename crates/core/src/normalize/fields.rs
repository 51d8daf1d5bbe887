//! Field lookup helpers shared by the normalizers.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use selfcare_domain::{ErpError, Result};
use serde_json::Value;

/// First key whose value is present and not null.
pub(super) fn first<'a, 'k>(raw: &'a Value, keys: &[&'k str]) -> Option<(&'k str, &'a Value)> {
    keys.iter().find_map(|key| match raw.get(*key) {
        None | Some(Value::Null) => None,
        Some(value) => Some((*key, value)),
    })
}

/// Optional text field. Numbers are accepted and rendered as text; blank
/// strings count as absent.
pub(super) fn text(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match raw.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Required identifier.
pub(super) fn required_text(raw: &Value, keys: &[&str], what: &str) -> Result<String> {
    text(raw, keys).ok_or_else(|| {
        ErpError::malformed(format!("missing {what} (looked for {})", keys.join(", ")))
    })
}

/// Monetary or metered amount; absent means zero.
pub(super) fn decimal(raw: &Value, keys: &[&str]) -> Result<Decimal> {
    Ok(optional_decimal(raw, keys)?.unwrap_or(Decimal::ZERO))
}

/// Amount that stays `None` when absent.
pub(super) fn optional_decimal(raw: &Value, keys: &[&str]) -> Result<Option<Decimal>> {
    let Some((key, value)) = first(raw, keys) else {
        return Ok(None);
    };
    let parsed = match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) if s.trim().is_empty() => return Ok(None),
        Value::String(s) => parse_decimal(s.trim()),
        _ => None,
    };
    parsed
        .map(Some)
        .ok_or_else(|| ErpError::malformed(format!("field `{key}` is not a number: {value}")))
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s).ok().or_else(|| Decimal::from_scientific(s).ok())
}

/// Calendar date, trying each key in order.
///
/// Accepts `YYYY-MM-DD` and RFC 3339 timestamps. A value that parses as
/// neither is treated like an absent one.
pub(super) fn date(raw: &Value, keys: &[&str]) -> Option<NaiveDate> {
    keys.iter().find_map(|key| raw.get(*key).and_then(Value::as_str).and_then(parse_date))
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        .or_else(|| s.get(..10).and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()))
}

/// Truthiness of ERP flags such as `disabled`, which arrive as `0`/`1`,
/// booleans or strings.
pub(super) fn flag(raw: &Value, key: &str) -> bool {
    match raw.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64().is_some_and(|n| n != 0),
        Some(Value::String(s)) => matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"),
        _ => false,
    }
}
