//! Repository - request-driven query composition for Repohaus
//!
//! This crate turns loosely-typed request parameters (filters, sorts and
//! eager-load hints) into a composed query against an entity's table, and
//! guards writes with the entity's fillable whitelist. Execution is left to
//! a [`PersistenceEngine`]; a PostgreSQL engine is included.

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod errors;
pub mod generic_repository;
pub mod postgres;
pub mod prelude;
pub mod query_builder;
pub mod request;
pub mod resolve;
pub mod schema;
pub mod traits;
pub mod validation;

pub use errors::RepositoryError;
pub use generic_repository::{Repository, RepositoryDefinition};
pub use postgres::{load_schema, PgEngine};
pub use query_builder::{Page, QueryBuilder, QueryFilter, QueryOperator, SortOrder};
pub use request::{FilterSpec, RequestParams, SortSpec};
pub use resolve::{
    ExpandResolver, FillableGuard, FilterContext, OverrideRegistry, QueryAssembler, SortContext,
};
pub use schema::{
    ColumnKind, RelationDef, RelationKind, RelationResolver, SchemaProvider, StaticRelations,
    StaticSchema,
};
pub use traits::*;
pub use validation::{ValidatedFieldName, ValidatedTableName, ValidationError};

use sqlx::PgPool;

pub type DbPool = PgPool;
