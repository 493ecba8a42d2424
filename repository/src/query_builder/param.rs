//! Bound query parameters

use serde_json::Value;
use type_mapping::ColumnKind;

/// A value bound to a `$n` placeholder, with the kind of the column it is
/// compared against when that is known
#[derive(Debug, Clone, PartialEq)]
pub struct SqlParam {
    pub value: Value,
    pub kind: Option<ColumnKind>,
}

impl SqlParam {
    pub fn new(value: Value, kind: Option<ColumnKind>) -> Self {
        Self { value, kind }
    }

    pub fn untyped(value: Value) -> Self {
        Self::new(value, None)
    }
}

impl From<Value> for SqlParam {
    fn from(value: Value) -> Self {
        Self::untyped(value)
    }
}

/// Compares the bound value only
impl PartialEq<Value> for SqlParam {
    fn eq(&self, other: &Value) -> bool {
        self.value == *other
    }
}
