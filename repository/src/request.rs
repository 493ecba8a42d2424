//! Caller-supplied request parameters
//!
//! Filters, sorts and expands are plain data handed to the repository by
//! the API boundary. They can come from a deserialised body or be parsed
//! straight from a query string:
//!
//! ```text
//! filters[author.name]=Jane&filters[status][]=draft&filters[status][]=review
//! &sorts[created_at]=desc&expands=author,comments&page=2
//! ```

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Field key (possibly a dotted relation path) to filter value
pub type FilterSpec = BTreeMap<String, Value>;

/// Field key to direction token, in caller order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    entries: Vec<(String, String)>,
}

impl SortSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the direction for `key`; a repeated key keeps its first position
    pub fn push(&mut self, key: impl Into<String>, direction: impl Into<String>) {
        let key = key.into();
        let direction = direction.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = direction,
            None => self.entries.push((key, direction)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, direction)| direction.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, direction)| (key.as_str(), direction.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, D: Into<String>> FromIterator<(K, D)> for SortSpec {
    fn from_iter<I: IntoIterator<Item = (K, D)>>(iter: I) -> Self {
        let mut spec = SortSpec::new();
        for (key, direction) in iter {
            spec.push(key, direction);
        }
        spec
    }
}

impl Serialize for SortSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, direction) in &self.entries {
            map.serialize_entry(key, direction)?;
        }
        map.end()
    }
}

struct SortSpecVisitor;

impl<'de> Visitor<'de> for SortSpecVisitor {
    type Value = SortSpec;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of field names to sort directions")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut spec = SortSpec::new();
        while let Some((key, direction)) = access.next_entry::<String, Option<String>>()? {
            spec.push(key, direction.unwrap_or_default());
        }
        Ok(spec)
    }
}

impl<'de> Deserialize<'de> for SortSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(SortSpecVisitor)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestParams {
    pub filters: FilterSpec,
    pub sorts: SortSpec,
    /// Comma-separated relation names
    pub expands: Option<String>,
    pub page: Option<u64>,
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: Value) -> Self {
        self.filters.insert(key.into(), value);
        self
    }

    pub fn with_sort(mut self, key: impl Into<String>, direction: impl Into<String>) -> Self {
        self.sorts.push(key, direction);
        self
    }

    pub fn with_expands(mut self, expands: impl Into<String>) -> Self {
        self.expands = Some(expands.into());
        self
    }

    pub fn with_page(mut self, page: u64) -> Self {
        self.page = Some(page);
        self
    }

    /// Parse a raw `application/x-www-form-urlencoded` query string.
    ///
    /// Unknown keys are ignored. An empty filter value counts as absent.
    pub fn from_query_str(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self::from_query_pairs(url::form_urlencoded::parse(query.as_bytes()))
    }

    pub fn from_query_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = RequestParams::new();
        for (key, value) in pairs {
            params.absorb_pair(key.as_ref(), value.as_ref());
        }
        params
    }

    fn absorb_pair(&mut self, key: &str, value: &str) {
        if let Some(field) = bracketed(key, "filters") {
            if let Some(field) = field.strip_suffix("][]") {
                self.push_filter_item(field, value);
            } else if let Some(field) = field.strip_suffix(']') {
                let value = if value.is_empty() {
                    Value::Null
                } else {
                    Value::String(value.to_string())
                };
                self.filters.insert(field.to_string(), value);
            }
        } else if let Some(field) = bracketed(key, "sorts") {
            if let Some(field) = field.strip_suffix(']') {
                self.sorts.push(field, value);
            }
        } else if key == "expands" {
            self.expands = match self.expands.take() {
                Some(existing) if !existing.is_empty() => Some(format!("{},{}", existing, value)),
                _ => Some(value.to_string()),
            };
        } else if key == "page" {
            if let Ok(page) = value.trim().parse::<u64>() {
                self.page = Some(page);
            }
        }
    }

    fn push_filter_item(&mut self, field: &str, value: &str) {
        let item = Value::String(value.to_string());
        match self.filters.get_mut(field) {
            Some(Value::Array(items)) => items.push(item),
            Some(existing) => {
                let previous = existing.take();
                *existing = if previous.is_null() {
                    Value::Array(vec![item])
                } else {
                    Value::Array(vec![previous, item])
                };
            }
            None => {
                self.filters
                    .insert(field.to_string(), Value::Array(vec![item]));
            }
        }
    }
}

/// `filters[name]` -> `name]`, leaving the closing part to the caller
fn bracketed<'a>(key: &'a str, prefix: &str) -> Option<&'a str> {
    key.strip_prefix(prefix)?.strip_prefix('[')
}
