//! Convenience re-exports for common repository usage

// Entity binding and persistence
pub use crate::traits::{Entity, EntityKey, EntityRef, PersistenceEngine};

// Error types
pub use crate::errors::RepositoryError;

// Repositories
pub use crate::generic_repository::{Repository, RepositoryDefinition};

// Request parameters and overrides
pub use crate::request::{FilterSpec, RequestParams, SortSpec};
pub use crate::resolve::{FilterContext, OverrideRegistry, SortContext};

// Schema
pub use crate::schema::{
    ColumnKind, RelationResolver, SchemaProvider, StaticRelations, StaticSchema,
};

// Query building
pub use crate::query_builder::{Page, QueryBuilder, QueryFilter, SortOrder};

// Validation
pub use crate::validation::{ValidatedFieldName, ValidatedTableName, ValidationError};

// PostgreSQL engine
pub use crate::postgres::{load_schema, PgEngine};

// Common external dependencies that are frequently used
pub use async_trait::async_trait;
pub use serde::{Deserialize, Serialize};
pub use serde_json::{json, Map, Value};
