//! Unified column type mapping between PostgreSQL and request values
//! This crate provides the column kind taxonomy used across the repohaus ecosystem

pub mod coerce;
pub mod sql;
pub mod temporal;
pub mod types;

pub use coerce::{coerce_value, value_to_text};
pub use sql::{is_array_type, pg_type_to_column_kind};
pub use temporal::{parse_temporal, Temporal, NAIVE_DATETIME_FORMATS};
pub use types::ColumnKind;
