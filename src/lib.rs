//! # RepoHaus
//!
//! Request-driven repositories for PostgreSQL: filters, sorts and eager-load
//! hints supplied by an API caller are resolved against a schema snapshot
//! into one composed query, with dotted relation paths joined once, per-field
//! overrides, and fillable whitelisting on writes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use repohaus::prelude::*;
//! use std::sync::Arc;
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct Post {
//!     pub id: Option<i64>,
//!     pub title: String,
//!     pub author_id: i64,
//!     #[serde(default, skip_serializing)]
//!     pub author: Option<Value>,
//! }
//!
//! impl Entity for Post {
//!     fn table_name() -> &'static str {
//!         "posts"
//!     }
//!
//!     fn fillable() -> &'static [&'static str] {
//!         &["title", "author_id"]
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let relations = StaticRelations::new()
//!         .belongs_to("posts", "author", "authors", "author_id", "id")?;
//!
//!     let repohaus = RepoHaus::new(config, relations, &["posts", "authors"]).await?;
//!     let posts = repohaus.repository(Arc::new(RepositoryDefinition::<Post>::new()))?;
//!
//!     let params = RequestParams::from_query_str("filters[author.name]=jane&sorts[id]=desc&expands=author");
//!     let page = posts.with_params(params).paginate(None, &[]).await?;
//!     println!("{} of {} posts", page.data.len(), page.total);
//!
//!     Ok(())
//! }
//! ```

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

pub mod core;
pub mod errors;
pub mod prelude;

// Re-export the main public types for convenience
pub use crate::core::RepoHaus;
pub use errors::RepoHausError;

// Re-export centralized config
pub use config::{AppConfig, DatabaseConfig, QueryConfig};

// Re-export internal crates used by the public API
pub use repository;
pub use type_mapping;

// Re-export external dependencies used in public API
pub use async_trait;
pub use sqlx;
