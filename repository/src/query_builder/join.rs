/// Represents the type of SQL JOIN operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinType {
    /// INNER JOIN - returns records that have matching values in both tables
    Inner,
    /// LEFT JOIN - returns all records from the left table and matched records from the right table
    Left,
}

impl JoinType {
    /// Convert JoinType to SQL string
    pub fn to_sql(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
        }
    }
}

/// A JOIN clause with an `ON left = right` condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinClause {
    /// Type of join (INNER, LEFT)
    pub join_type: JoinType,
    /// Table to join with
    pub table: String,
    /// Qualified column on the joined table
    pub left_field: String,
    /// Qualified column on a table already in the query
    pub right_field: String,
}

impl JoinClause {
    /// Create a new JOIN clause with ON condition
    pub fn new_on(
        join_type: JoinType,
        table: impl Into<String>,
        left_field: impl Into<String>,
        right_field: impl Into<String>,
    ) -> Self {
        Self {
            join_type,
            table: table.into(),
            left_field: left_field.into(),
            right_field: right_field.into(),
        }
    }

    /// LEFT JOIN shorthand
    pub fn left(
        table: impl Into<String>,
        left_field: impl Into<String>,
        right_field: impl Into<String>,
    ) -> Self {
        Self::new_on(JoinType::Left, table, left_field, right_field)
    }
}
