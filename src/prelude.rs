//! Convenience re-exports for common RepoHaus usage
//!
//! This prelude module re-exports the most commonly used items from the RepoHaus ecosystem,
//! making it easier to import everything you need with a single use statement.
//!
//! # Example
//!
//! ```rust
//! use repohaus::prelude::*;
//!
//! // Now you have access to all the common RepoHaus types and traits
//! ```

// Core RepoHaus components
pub use crate::core::RepoHaus;
pub use crate::errors::RepoHausError;

// Re-export centralized config
pub use config::{AppConfig, DatabaseConfig, QueryConfig};

// Re-export commonly used repository types for convenience
pub use repository::prelude::*;

// Common external dependencies
pub use anyhow;
pub use sqlx;
pub use tokio;

// Commonly used sqlx types
pub use sqlx::{PgPool, Postgres};
