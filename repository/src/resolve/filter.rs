//! Filter resolution
//!
//! Turns the request's filter map into query conditions. Keys that do not
//! resolve, values that cannot be read as the column's kind, nulls and
//! empty strings are skipped without error. Every predicate records the
//! column kind so its parameters bind with the column's type.

use super::joins::{JoinPlanner, JoinSet, ResolvedPath};
use super::overrides::{FilterContext, OverrideRegistry};
use crate::query_builder::{QueryBuilder, QueryFilter};
use crate::request::FilterSpec;
use crate::schema::{RelationResolver, SchemaProvider};
use serde_json::Value;
use type_mapping::{coerce_value, value_to_text, ColumnKind};

pub const PATH_SEPARATOR: char = '.';

pub struct FilterResolver<'a> {
    planner: JoinPlanner<'a>,
    overrides: &'a OverrideRegistry,
}

impl<'a> FilterResolver<'a> {
    pub fn new(
        schema: &'a dyn SchemaProvider,
        relations: &'a dyn RelationResolver,
        overrides: &'a OverrideRegistry,
    ) -> Self {
        Self {
            planner: JoinPlanner::new(schema, relations),
            overrides,
        }
    }

    pub fn resolve(
        &self,
        mut query: QueryBuilder,
        filters: &FilterSpec,
        joins: &mut JoinSet,
    ) -> QueryBuilder {
        for (key, value) in filters {
            if is_absent(value) {
                continue;
            }

            if !key.contains(PATH_SEPARATOR) {
                if let Some(handler) = self.overrides.lookup_filter(key) {
                    crate::debug_log!("Filter '{}' handled by override", key);
                    query = handler(FilterContext {
                        query,
                        value,
                        filters,
                    });
                    joins.absorb(&query);
                    continue;
                }
            }

            let segments: Vec<&str> = key.split(PATH_SEPARATOR).collect();
            let Some(path) = self.planner.plan(query.base_table(), &segments, joins) else {
                crate::trace_log!("Filter '{}' does not resolve, skipping", key);
                continue;
            };

            let ResolvedPath { joins: planned, column, kind } = path;
            match predicate(&column, kind, value) {
                Some(condition) => {
                    query = joins.commit(query, planned).filter(condition);
                }
                None => {
                    crate::trace_log!("Filter '{}' value {} unusable for {} column", key, value, kind);
                }
            }
        }
        query
    }
}

/// Condition for one resolved column.
///
/// String columns match case-insensitively on a substring, other kinds
/// compare for equality after coercion. Lists become `IN`.
pub fn predicate(column: &str, kind: ColumnKind, value: &Value) -> Option<QueryFilter> {
    match value {
        Value::Null | Value::Object(_) => None,
        Value::Array(items) => {
            let values: Vec<Value> = items
                .iter()
                .filter_map(|item| coerce_value(kind, item))
                .collect();
            if values.is_empty() {
                None
            } else {
                Some(QueryFilter::in_values(column, values).with_kind(kind))
            }
        }
        _ if kind.is_string() => value_to_text(value)
            .map(|needle| QueryFilter::contains(column, &needle).with_kind(kind)),
        _ => coerce_value(kind, value).map(|value| QueryFilter::eq(column, value).with_kind(kind)),
    }
}

/// Null and empty strings carry no constraint
fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
