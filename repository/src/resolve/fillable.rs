//! Write payload whitelisting

use serde_json::{Map, Value};

pub struct FillableGuard;

impl FillableGuard {
    /// Keep only the attributes named in `fillable`; everything else is dropped
    pub fn filter(input: &Map<String, Value>, fillable: &[&str]) -> Map<String, Value> {
        input
            .iter()
            .filter(|(key, _)| fillable.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_extra_keys_vanish() {
        let input = map(json!({"name": "A", "secret": "x"}));
        let filtered = FillableGuard::filter(&input, &["name"]);
        assert_eq!(Value::Object(filtered), json!({"name": "A"}));
    }

    #[test]
    fn test_empty_whitelist() {
        let input = map(json!({"name": "A"}));
        assert!(FillableGuard::filter(&input, &[]).is_empty());
    }

    #[test]
    fn test_null_values_kept_when_fillable() {
        let input = map(json!({"bio": null, "id": 5}));
        let filtered = FillableGuard::filter(&input, &["bio", "name"]);
        assert_eq!(Value::Object(filtered), json!({"bio": null}));
    }
}
