//! Query builder utilities
//!
//! This module provides the composed query handle produced by the repository
//! layer and its PostgreSQL rendering.

pub mod builder;
pub mod filter;
pub mod join;
pub mod ordering;
pub mod pagination;
pub mod param;
pub mod sql_generation;

#[cfg(test)]
mod tests;

pub use builder::QueryBuilder;
pub use filter::{LogicalOperator, QueryCondition, QueryFilter, QueryOperator};
pub use join::{JoinClause, JoinType};
pub use ordering::SortOrder;
pub use pagination::{Page, Pagination};
pub use param::SqlParam;
pub use sql_generation::SqlGenerator;
