//! Per-field filter and sort overrides
//!
//! A repository may replace the generic column handling for individual
//! fields. Handlers are registered once when the repository definition is
//! built and looked up by the field's canonical name: `created_at`,
//! `createdAt` and `CreatedAt` all resolve to `filterByCreatedAt` /
//! `sortByCreatedAt`.

use crate::query_builder::{QueryBuilder, SortOrder};
use crate::request::FilterSpec;
use heck::ToUpperCamelCase;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// What a filter handler gets to work with
pub struct FilterContext<'a> {
    pub query: QueryBuilder,
    /// The value supplied for this field, never null
    pub value: &'a Value,
    /// Every filter in the request, for cross-field decisions
    pub filters: &'a FilterSpec,
}

pub struct SortContext {
    pub query: QueryBuilder,
    pub direction: SortOrder,
}

pub type FilterHandler = Arc<dyn Fn(FilterContext<'_>) -> QueryBuilder + Send + Sync>;
pub type SortHandler = Arc<dyn Fn(SortContext) -> QueryBuilder + Send + Sync>;

const FILTER_PREFIX: &str = "filterBy";
const SORT_PREFIX: &str = "sortBy";

/// Lookup name for a field's handler, e.g. `filterBy` + `created_at` -> `filterByCreatedAt`
pub fn handler_name(prefix: &str, field: &str) -> String {
    format!("{}{}", prefix, field.to_upper_camel_case())
}

#[derive(Clone, Default)]
pub struct OverrideRegistry {
    filters: HashMap<String, FilterHandler>,
    sorts: HashMap<String, SortHandler>,
}

impl OverrideRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a filter handler for `field`
    pub fn filter_by<F>(mut self, field: &str, handler: F) -> Self
    where
        F: Fn(FilterContext<'_>) -> QueryBuilder + Send + Sync + 'static,
    {
        self.filters
            .insert(handler_name(FILTER_PREFIX, field), Arc::new(handler));
        self
    }

    /// Register a sort handler for `field`
    pub fn sort_by<F>(mut self, field: &str, handler: F) -> Self
    where
        F: Fn(SortContext) -> QueryBuilder + Send + Sync + 'static,
    {
        self.sorts
            .insert(handler_name(SORT_PREFIX, field), Arc::new(handler));
        self
    }

    pub fn lookup_filter(&self, field: &str) -> Option<&FilterHandler> {
        self.filters.get(&handler_name(FILTER_PREFIX, field))
    }

    pub fn lookup_sort(&self, field: &str) -> Option<&SortHandler> {
        self.sorts.get(&handler_name(SORT_PREFIX, field))
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.sorts.is_empty()
    }
}

impl fmt::Debug for OverrideRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut filters: Vec<_> = self.filters.keys().collect();
        let mut sorts: Vec<_> = self.sorts.keys().collect();
        filters.sort();
        sorts.sort();
        f.debug_struct("OverrideRegistry")
            .field("filters", &filters)
            .field("sorts", &sorts)
            .finish()
    }
}
