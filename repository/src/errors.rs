//! Error types for repository operations
//!
//! Resolution misses (unknown filter or sort keys) are not errors and never
//! show up here. Persistence failures are passed through with the table and
//! operation they happened in.

use crate::validation::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("Database error on '{table}' during {operation}: {source}")]
    DatabaseOperation {
        table: String,
        operation: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationError),
}

impl RepositoryError {
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    pub fn database_operation(table: &str, operation: &str, source: sqlx::Error) -> Self {
        Self::DatabaseOperation {
            table: table.to_string(),
            operation: operation.to_string(),
            source,
        }
    }

    pub fn not_found(table: &str, key: &serde_json::Value) -> Self {
        Self::NotFound(format!("{} with key {}", table, key))
    }
}
