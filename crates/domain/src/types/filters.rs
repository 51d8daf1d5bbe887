//! Invoice listing filters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Filter map for invoice listings.
///
/// Backed by a sorted map, so two filter sets with the same entries are equal
/// and serialize identically regardless of insertion order.
///
/// Recognised keys: `status`, `limit`, `from_date`, `to_date`. Other keys are
/// carried along (and take part in cache keys) but adapters may ignore them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceFilters(BTreeMap<String, Value>);

impl InvoiceFilters {
    /// Empty filter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a filter.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Requested status, if any.
    pub fn status(&self) -> Option<&str> {
        self.get("status").and_then(Value::as_str)
    }

    /// Maximum number of invoices, accepting numbers or numeric strings.
    pub fn limit(&self) -> Option<usize> {
        match self.get("limit")? {
            Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn from_date(&self) -> Option<&str> {
        self.get("from_date").and_then(Value::as_str)
    }

    pub fn to_date(&self) -> Option<&str> {
        self.get("to_date").and_then(Value::as_str)
    }

    /// Canonical JSON text: keys sorted at every nesting level.
    pub fn canonical_json(&self) -> String {
        let map: serde_json::Map<String, Value> =
            self.0.iter().map(|(k, v)| (k.clone(), canonical(v))).collect();
        Value::Object(map).to_string()
    }
}

fn canonical(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(entries.into_iter().map(|(k, v)| (k.clone(), canonical(v))).collect())
        }
        Value::Array(items) => Value::Array(items.iter().map(canonical).collect()),
        other => other.clone(),
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for InvoiceFilters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
