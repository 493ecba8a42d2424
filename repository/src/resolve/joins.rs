//! Join bookkeeping for dotted filter paths
//!
//! A path such as `author.country.name` walks one relation per segment and
//! ends in a column. The walk is planned in full before anything touches the
//! query, so a path that does not end in a column leaves no joins behind.

use crate::query_builder::{JoinClause, QueryBuilder};
use crate::schema::{RelationResolver, SchemaProvider};
use crate::validation::qualify;
use std::collections::HashSet;
use type_mapping::ColumnKind;

/// Tables already joined into the query being built
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinSet {
    tables: HashSet<String>,
}

impl JoinSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A join set that knows about every join already on `query`
    pub fn seeded(query: &QueryBuilder) -> Self {
        let mut joins = Self::new();
        joins.absorb(query);
        joins
    }

    /// Record joins that were added to `query` behind our back
    pub fn absorb(&mut self, query: &QueryBuilder) {
        for join in query.joins() {
            self.tables.insert(join.table.clone());
        }
    }

    pub fn contains(&self, table: &str) -> bool {
        self.tables.contains(table)
    }

    /// Attach the planned joins whose tables are not joined yet
    pub fn commit(&mut self, mut query: QueryBuilder, joins: Vec<JoinClause>) -> QueryBuilder {
        for join in joins {
            if self.tables.insert(join.table.clone()) {
                crate::debug_log!("Joining {} on {} = {}", join.table, join.left_field, join.right_field);
                query = query.join(join);
            }
        }
        query
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// A dotted path resolved down to a column
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPath {
    /// Joins needed to reach the column, not yet on the query
    pub joins: Vec<JoinClause>,
    /// Table-qualified column
    pub column: String,
    pub kind: ColumnKind,
}

pub struct JoinPlanner<'a> {
    schema: &'a dyn SchemaProvider,
    relations: &'a dyn RelationResolver,
}

impl<'a> JoinPlanner<'a> {
    pub fn new(schema: &'a dyn SchemaProvider, relations: &'a dyn RelationResolver) -> Self {
        Self { schema, relations }
    }

    /// Resolve `segments` starting at `base_table`.
    ///
    /// Returns `None` when a segment is neither a column nor a relation, when
    /// a column appears before the last segment, when the last segment is a
    /// relation, or when a relation leads back to a table already on the path.
    /// Has-many relations are never joined since they would multiply rows.
    pub fn plan(&self, base_table: &str, segments: &[&str], joins: &JoinSet) -> Option<ResolvedPath> {
        let mut current = base_table.to_string();
        let mut visited = vec![base_table.to_string()];
        let mut pending = Vec::new();

        for (index, segment) in segments.iter().enumerate() {
            let is_last = index + 1 == segments.len();

            if let Some(kind) = self.schema.column_type(&current, segment) {
                if !is_last {
                    crate::trace_log!("Column {}.{} is not the end of its path", current, segment);
                    return None;
                }
                return Some(ResolvedPath {
                    joins: pending,
                    column: qualify(&current, segment),
                    kind,
                });
            }

            let relation = self.relations.resolve(&current, segment)?;
            if is_last || relation.kind.is_many() || visited.contains(&relation.child_table) {
                crate::trace_log!("Relation {}.{} cannot be joined here", current, segment);
                return None;
            }

            if !joins.contains(&relation.child_table) {
                pending.push(JoinClause::left(
                    relation.child_table.as_str(),
                    qualify(&relation.child_table, &relation.join_column),
                    qualify(&current, &relation.parent_key_column),
                ));
            }
            visited.push(relation.child_table.clone());
            current = relation.child_table;
        }

        None
    }
}
