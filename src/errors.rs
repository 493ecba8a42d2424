//! Error types for the RepoHaus crate
//!
//! This module contains all error types that can be returned by RepoHaus operations.

use config::ConfigError;
use repository::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepoHausError {
    #[error("Database connection error: {0}")]
    DatabaseConnection(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Repository not found: {0}")]
    RepositoryNotFound(String),

    #[error("Repository already registered: {0}")]
    RepositoryAlreadyRegistered(String),
}
