//! Query assembly: expand, then filter, then sort

use super::filter::FilterResolver;
use super::joins::JoinSet;
use super::overrides::OverrideRegistry;
use super::sort::SortResolver;
use crate::query_builder::QueryBuilder;
use crate::request::{FilterSpec, SortSpec};
use crate::schema::{RelationResolver, SchemaProvider};

pub struct QueryAssembler<'a> {
    schema: &'a dyn SchemaProvider,
    relations: &'a dyn RelationResolver,
    overrides: &'a OverrideRegistry,
}

impl<'a> QueryAssembler<'a> {
    pub fn new(
        schema: &'a dyn SchemaProvider,
        relations: &'a dyn RelationResolver,
        overrides: &'a OverrideRegistry,
    ) -> Self {
        Self {
            schema,
            relations,
            overrides,
        }
    }

    /// Compose `base` with the request's expands, filters and sorts.
    ///
    /// With `suppress_filters` set the filter map is not looked at at all.
    /// Expands naming no relation of the base table are dropped.
    pub fn build(
        &self,
        base: QueryBuilder,
        filters: &FilterSpec,
        sorts: &SortSpec,
        expands: &[String],
        suppress_filters: bool,
    ) -> QueryBuilder {
        let mut query = self.apply_expands(base, expands);

        if !suppress_filters {
            let mut joins = JoinSet::seeded(&query);
            query = FilterResolver::new(self.schema, self.relations, self.overrides)
                .resolve(query, filters, &mut joins);
        }

        SortResolver::new(self.schema, self.overrides).resolve(query, sorts)
    }

    fn apply_expands(&self, query: QueryBuilder, expands: &[String]) -> QueryBuilder {
        let table = query.base_table().to_string();
        let known: Vec<&str> = expands
            .iter()
            .map(String::as_str)
            .filter(|name| {
                let found = self.relations.resolve(&table, name).is_some();
                if !found {
                    crate::trace_log!("Expand '{}' is not a relation of {}, skipping", name, table);
                }
                found
            })
            .collect();

        if known.is_empty() {
            query
        } else {
            query.with(known)
        }
    }
}
