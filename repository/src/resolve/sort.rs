//! Sort resolution

use super::filter::PATH_SEPARATOR;
use super::overrides::{OverrideRegistry, SortContext};
use crate::query_builder::{QueryBuilder, SortOrder};
use crate::request::SortSpec;
use crate::schema::SchemaProvider;
use crate::validation::qualify;

pub struct SortResolver<'a> {
    schema: &'a dyn SchemaProvider,
    overrides: &'a OverrideRegistry,
}

impl<'a> SortResolver<'a> {
    pub fn new(schema: &'a dyn SchemaProvider, overrides: &'a OverrideRegistry) -> Self {
        Self { schema, overrides }
    }

    /// Append one ordering per usable entry, in the order given.
    ///
    /// Dotted keys, empty or unknown directions and unknown columns are
    /// ignored; only the query's own table can be sorted on.
    pub fn resolve(&self, mut query: QueryBuilder, sorts: &SortSpec) -> QueryBuilder {
        for (key, direction) in sorts.iter() {
            if key.contains(PATH_SEPARATOR) {
                crate::trace_log!("Sort '{}' crosses a relation, skipping", key);
                continue;
            }
            let Some(direction) = SortOrder::parse(direction) else {
                continue;
            };

            if let Some(handler) = self.overrides.lookup_sort(key) {
                crate::debug_log!("Sort '{}' handled by override", key);
                query = handler(SortContext { query, direction });
                continue;
            }

            let table = query.base_table().to_string();
            if self.schema.has_column(&table, key) {
                query = query.order_by(&qualify(&table, key), direction);
            } else {
                crate::trace_log!("Sort '{}' is not a column of {}, skipping", key, table);
            }
        }
        query
    }
}
