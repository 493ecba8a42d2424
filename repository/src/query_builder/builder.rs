//! The composed query handle
//!
//! A `QueryBuilder` is what the repository hands back from `get_query`: the
//! base table, joins, conditions, ordering and eager-load list, not yet
//! executed. Callers may keep constraining it before passing it to a
//! persistence engine.

use crate::query_builder::filter::QueryFilter;
use crate::query_builder::join::JoinClause;
use crate::query_builder::ordering::SortOrder;
use crate::query_builder::pagination::Pagination;
use crate::query_builder::param::SqlParam;
use crate::query_builder::sql_generation::SqlGenerator;

#[derive(Debug, Clone, PartialEq)]
pub struct QueryBuilder {
    pub(crate) table: String,
    pub(crate) joins: Vec<JoinClause>,
    pub(crate) conditions: Vec<QueryFilter>,
    pub(crate) order_by: Vec<(String, SortOrder)>,
    pub(crate) eager_loads: Vec<String>,
    pub(crate) limit: Option<i64>,
    pub(crate) offset: Option<i64>,
}

impl QueryBuilder {
    /// Start a query against `table`
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            joins: Vec::new(),
            conditions: Vec::new(),
            order_by: Vec::new(),
            eager_loads: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Add a filter condition
    pub fn filter(mut self, filter: QueryFilter) -> Self {
        self.conditions.push(filter);
        self
    }

    /// Add multiple filters (combined with AND)
    pub fn filters(mut self, filters: Vec<QueryFilter>) -> Self {
        self.conditions.extend(filters);
        self
    }

    /// Add ordering
    pub fn order_by(mut self, field: &str, order: SortOrder) -> Self {
        self.order_by.push((field.to_string(), order));
        self
    }

    /// Attach a join clause
    pub fn join(mut self, join: JoinClause) -> Self {
        self.joins.push(join);
        self
    }

    /// Attach `LEFT JOIN table ON left_field = right_field`
    pub fn left_join(self, table: &str, left_field: &str, right_field: &str) -> Self {
        self.join(JoinClause::left(table, left_field, right_field))
    }

    /// Eager-load the given relations when the query is executed
    pub fn with<I, S>(mut self, relations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for relation in relations {
            let relation = relation.into();
            if !self.eager_loads.contains(&relation) {
                self.eager_loads.push(relation);
            }
        }
        self
    }

    /// Add limit
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Add offset
    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Apply a limit/offset window
    pub fn paginate(mut self, pagination: &Pagination) -> Self {
        self.limit = pagination.limit;
        self.offset = pagination.offset;
        self
    }

    pub fn base_table(&self) -> &str {
        &self.table
    }

    pub fn joins(&self) -> &[JoinClause] {
        &self.joins
    }

    /// Whether `table` is already joined into this query
    pub fn has_join(&self, table: &str) -> bool {
        self.joins.iter().any(|join| join.table == table)
    }

    pub fn conditions(&self) -> &[QueryFilter] {
        &self.conditions
    }

    pub fn ordering(&self) -> &[(String, SortOrder)] {
        &self.order_by
    }

    pub fn eager_loads(&self) -> &[String] {
        &self.eager_loads
    }

    pub fn limit_value(&self) -> Option<i64> {
        self.limit
    }

    pub fn offset_value(&self) -> Option<i64> {
        self.offset
    }

    /// Drop ordering and window, keeping what decides row membership
    pub fn without_window(mut self) -> Self {
        self.order_by.clear();
        self.limit = None;
        self.offset = None;
        self
    }

    /// Build JOIN clauses
    pub fn build_join_clause(&self) -> String {
        SqlGenerator::build_join_clause(&self.joins)
    }

    /// Build WHERE clause
    pub fn build_where_clause(&self) -> (String, Vec<SqlParam>) {
        SqlGenerator::build_where_clause(&self.conditions)
    }

    /// Build ORDER BY clause
    pub fn build_order_clause(&self) -> String {
        SqlGenerator::build_order_clause(&self.order_by)
    }

    /// Build LIMIT/OFFSET clause
    pub fn build_limit_clause(&self) -> String {
        SqlGenerator::build_limit_clause(self.limit, self.offset)
    }

    /// Build complete query parts (WHERE, ORDER BY, LIMIT, Values)
    pub fn build(&self) -> (String, String, String, Vec<SqlParam>) {
        let (where_clause, values) = self.build_where_clause();
        let order_clause = self.build_order_clause();
        let limit_clause = self.build_limit_clause();

        (where_clause, order_clause, limit_clause, values)
    }

    /// Full SELECT statement with the given projection
    pub fn to_select_sql(&self, projection: &str) -> (String, Vec<SqlParam>) {
        SqlGenerator::build_select(self, projection)
    }

    /// `SELECT COUNT(*)` over the rows this query matches
    pub fn to_count_sql(&self) -> (String, Vec<SqlParam>) {
        SqlGenerator::build_count(self)
    }

    /// `SELECT EXISTS(...)` over the rows this query matches
    pub fn to_exists_sql(&self) -> (String, Vec<SqlParam>) {
        SqlGenerator::build_exists(self)
    }
}
