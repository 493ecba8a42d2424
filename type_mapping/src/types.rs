//! Column kind definitions
//!
//! Filters only care about a coarse classification of a column's declared
//! type: string columns get substring matching, everything else equality.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    String,
    Numeric,
    Boolean,
    Date,
    Other,
}

impl ColumnKind {
    /// Whether filters on this kind use substring matching
    pub fn is_string(&self) -> bool {
        matches!(self, ColumnKind::String)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::String => "string",
            ColumnKind::Numeric => "numeric",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Date => "date",
            ColumnKind::Other => "other",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
