//! PostgreSQL rendering of a composed query
//!
//! Values never appear in the SQL text; every value becomes a `$n`
//! placeholder numbered in the order it is pushed.

use crate::query_builder::builder::QueryBuilder;
use crate::query_builder::filter::{LogicalOperator, QueryCondition, QueryFilter, QueryOperator};
use crate::query_builder::join::JoinClause;
use crate::query_builder::ordering::SortOrder;
use crate::query_builder::param::SqlParam;
use crate::validation::quote_ident;
use serde_json::Value;
use std::borrow::Cow;
use type_mapping::ColumnKind;

pub struct SqlGenerator;

impl SqlGenerator {
    /// Build WHERE clause from conditions
    pub fn build_where_clause(conditions: &[QueryFilter]) -> (String, Vec<SqlParam>) {
        if conditions.is_empty() {
            return ("".to_string(), Vec::new());
        }

        let mut values = Vec::new();
        let mut param_counter = 1;

        let conditions_sql = conditions
            .iter()
            .map(|condition| Self::build_condition_sql(condition, &mut values, &mut param_counter))
            .filter(|sql| !sql.is_empty())
            .collect::<Vec<_>>()
            .join(" AND ");

        if conditions_sql.is_empty() {
            ("".to_string(), values)
        } else {
            (format!("WHERE {}", conditions_sql), values)
        }
    }

    fn build_condition_sql(
        filter: &QueryFilter,
        values: &mut Vec<SqlParam>,
        param_counter: &mut usize,
    ) -> String {
        match filter {
            QueryFilter::Condition(condition) => {
                Self::build_single_condition_sql(condition, values, param_counter)
            }
            QueryFilter::Group { operator, filters } => {
                let operator_str = match operator {
                    LogicalOperator::And => " AND ",
                    LogicalOperator::Or => " OR ",
                };

                let group_conditions = filters
                    .iter()
                    .map(|f| Self::build_condition_sql(f, values, param_counter))
                    .filter(|sql| !sql.is_empty())
                    .collect::<Vec<_>>();

                match group_conditions.len() {
                    0 => String::new(),
                    1 => group_conditions.concat(),
                    _ => format!("({})", group_conditions.join(operator_str)),
                }
            }
        }
    }

    fn push_param(
        value: &Value,
        kind: Option<ColumnKind>,
        values: &mut Vec<SqlParam>,
        param_counter: &mut usize,
    ) -> String {
        values.push(SqlParam::new(value.clone(), kind));
        let param = format!("${}", param_counter);
        *param_counter += 1;
        param
    }

    fn build_single_condition_sql(
        condition: &QueryCondition,
        values: &mut Vec<SqlParam>,
        param_counter: &mut usize,
    ) -> String {
        let kind = condition.kind;
        // Columns without a dedicated kind (enums, json, uuid, ...) compare on
        // their text form so a text parameter always has an operator
        let field: Cow<'_, str> = match kind {
            Some(ColumnKind::Other) => Cow::Owned(format!("{}::text", condition.field)),
            _ => Cow::Borrowed(condition.field.as_str()),
        };

        let binary = |symbol: &str, values: &mut Vec<SqlParam>, param_counter: &mut usize| {
            match &condition.value {
                Some(value) => {
                    let param = Self::push_param(value, kind, values, param_counter);
                    format!("{} {} {}", field, symbol, param)
                }
                None => "1=0".to_string(),
            }
        };

        match &condition.operator {
            QueryOperator::Eq => match &condition.value {
                Some(_) => binary("=", values, param_counter),
                None => format!("{} IS NULL", field),
            },
            QueryOperator::Ne => match &condition.value {
                Some(_) => binary("!=", values, param_counter),
                None => format!("{} IS NOT NULL", field),
            },
            QueryOperator::Gt => binary(">", values, param_counter),
            QueryOperator::Gte => binary(">=", values, param_counter),
            QueryOperator::Lt => binary("<", values, param_counter),
            QueryOperator::Lte => binary("<=", values, param_counter),
            QueryOperator::Like => binary("LIKE", values, param_counter),
            QueryOperator::ILike => binary("ILIKE", values, param_counter),
            QueryOperator::In => match &condition.value {
                Some(Value::Array(array_values)) if !array_values.is_empty() => {
                    let placeholders: Vec<String> = array_values
                        .iter()
                        .map(|value| Self::push_param(value, kind, values, param_counter))
                        .collect();
                    format!("{} IN ({})", field, placeholders.join(", "))
                }
                _ => "1=0".to_string(), // Empty IN clause
            },
            QueryOperator::NotIn => match &condition.value {
                Some(Value::Array(array_values)) if !array_values.is_empty() => {
                    let placeholders: Vec<String> = array_values
                        .iter()
                        .map(|value| Self::push_param(value, kind, values, param_counter))
                        .collect();
                    format!("{} NOT IN ({})", field, placeholders.join(", "))
                }
                _ => "1=1".to_string(), // Empty NOT IN clause
            },
            QueryOperator::IsNull => format!("{} IS NULL", field),
            QueryOperator::IsNotNull => format!("{} IS NOT NULL", field),
        }
    }

    /// Build ORDER BY clause
    pub fn build_order_clause(order_by: &[(String, SortOrder)]) -> String {
        if order_by.is_empty() {
            return "".to_string();
        }

        let order_items: Vec<String> = order_by
            .iter()
            .map(|(field, order)| format!("{} {}", field, order.to_sql()))
            .collect();

        format!("ORDER BY {}", order_items.join(", "))
    }

    /// Build LIMIT/OFFSET clause
    pub fn build_limit_clause(limit: Option<i64>, offset: Option<i64>) -> String {
        let mut clauses = Vec::new();

        if let Some(limit) = limit {
            clauses.push(format!("LIMIT {}", limit));
        }

        if let Some(offset) = offset {
            clauses.push(format!("OFFSET {}", offset));
        }

        clauses.join(" ")
    }

    /// Build JOIN clauses
    pub fn build_join_clause(joins: &[JoinClause]) -> String {
        joins
            .iter()
            .map(|join| {
                format!(
                    "{} {} ON {} = {}",
                    join.join_type.to_sql(),
                    quote_ident(&join.table),
                    join.left_field,
                    join.right_field
                )
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// `SELECT <projection> FROM <table> <joins> <where> <order> <limit>`
    pub fn build_select(query: &QueryBuilder, projection: &str) -> (String, Vec<SqlParam>) {
        let (where_clause, order_clause, limit_clause, values) = query.build();
        let join_clause = query.build_join_clause();

        let mut sql = String::with_capacity(64 + projection.len() + where_clause.len());
        sql.push_str("SELECT ");
        sql.push_str(projection);
        sql.push_str(" FROM ");
        sql.push_str(&quote_ident(query.base_table()));
        for part in [&join_clause, &where_clause, &order_clause, &limit_clause] {
            if !part.is_empty() {
                sql.push(' ');
                sql.push_str(part);
            }
        }

        (sql, values)
    }

    /// Row count ignoring ordering and window
    pub fn build_count(query: &QueryBuilder) -> (String, Vec<SqlParam>) {
        let unwindowed = query.clone().without_window();
        Self::build_select(&unwindowed, "COUNT(*) AS total")
    }

    /// Existence check ignoring ordering and window
    pub fn build_exists(query: &QueryBuilder) -> (String, Vec<SqlParam>) {
        let unwindowed = query.clone().without_window();
        let (inner, values) = Self::build_select(&unwindowed, "1");
        (format!("SELECT EXISTS({})", inner), values)
    }
}
