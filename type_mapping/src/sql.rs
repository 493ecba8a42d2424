//! SQL type conversion utilities
//!
//! This module maps PostgreSQL type names, as reported by
//! `information_schema.columns.data_type`, to column kinds.

use crate::types::ColumnKind;

/// Map a PostgreSQL `data_type` (or `udt_name`) to its column kind
pub fn pg_type_to_column_kind(pg_type: &str) -> ColumnKind {
    // Normalize: lowercase and drop any length/precision suffix such as `(255)`
    let lowered = pg_type.trim().to_ascii_lowercase();
    let normalized = lowered
        .split('(')
        .next()
        .unwrap_or_default()
        .trim();

    if is_array_type(normalized) {
        return ColumnKind::Other;
    }

    match normalized {
        "character varying" | "varchar" | "character" | "char" | "bpchar" | "text"
        | "citext" | "name" => ColumnKind::String,
        "smallint" | "integer" | "bigint" | "int2" | "int4" | "int8" | "smallserial"
        | "serial" | "bigserial" | "serial2" | "serial4" | "serial8" | "numeric"
        | "decimal" | "real" | "double precision" | "float4" | "float8" | "money" => {
            ColumnKind::Numeric
        }
        "boolean" | "bool" => ColumnKind::Boolean,
        // time of day has no date part; it compares as text like other kinds
        "date"
        | "timestamp"
        | "timestamp without time zone"
        | "timestamp with time zone"
        | "timestamptz" => ColumnKind::Date,
        _ => ColumnKind::Other,
    }
}

/// Check if a PostgreSQL type name denotes an array
pub fn is_array_type(pg_type: &str) -> bool {
    let pg_type = pg_type.trim();
    pg_type.eq_ignore_ascii_case("array") || pg_type.ends_with("[]") || pg_type.starts_with('_')
}
