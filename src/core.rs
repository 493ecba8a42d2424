//! Core RepoHaus functionality
//!
//! This module contains the main RepoHaus struct: it owns the connection
//! pool, the schema snapshot and relation map shared by every repository,
//! and a registry of named repositories.

use sqlx::PgPool;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::RepoHausError;
use config::{AppConfig, DatabaseConfig, QueryConfig};
use repository::{
    load_schema, Entity, PgEngine, Repository, RepositoryDefinition, StaticRelations,
    StaticSchema,
};

/// Main RepoHaus coordinator
pub struct RepoHaus {
    pool: PgPool,
    query_config: QueryConfig,
    schema: Arc<StaticSchema>,
    relations: Arc<StaticRelations>,
    engine: Arc<PgEngine>,
    repositories: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl std::fmt::Debug for RepoHaus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepoHaus")
            .field("query_config", &self.query_config)
            .field("tables", &self.schema.table_names())
            .field("repositories", &self.list_repositories())
            .finish()
    }
}

impl RepoHaus {
    /// Connect to the database and load the schema of `tables`
    pub async fn new(
        config: AppConfig,
        relations: StaticRelations,
        tables: &[&str],
    ) -> Result<Self, RepoHausError> {
        config.validate()?;
        let pool = connect(&config.database).await?;
        tracing::info!(
            host = %config.database.host,
            database = %config.database.database,
            "Connected to PostgreSQL"
        );

        let schema = load_schema(&pool, &config.query.schema, tables).await?;
        Ok(Self::from_parts(pool, config.query, schema, relations))
    }

    /// Assemble a coordinator from an existing pool and schema snapshot
    pub fn from_parts(
        pool: PgPool,
        query_config: QueryConfig,
        schema: StaticSchema,
        relations: StaticRelations,
    ) -> Self {
        let schema = Arc::new(schema);
        let relations = Arc::new(relations);
        let engine = Arc::new(PgEngine::new(
            pool.clone(),
            schema.clone(),
            relations.clone(),
        ));

        Self {
            pool,
            query_config,
            schema,
            relations,
            engine,
            repositories: HashMap::new(),
        }
    }

    /// Get database pool reference
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn schema(&self) -> &StaticSchema {
        &self.schema
    }

    pub fn engine(&self) -> Arc<PgEngine> {
        Arc::clone(&self.engine)
    }

    /// Build a repository for `T`, failing if `T` is not bound to a loaded table
    pub fn repository<T: Entity>(
        &self,
        definition: Arc<RepositoryDefinition<T>>,
    ) -> Result<Repository<T, PgEngine>, RepoHausError> {
        let repository = Repository::new(
            Arc::clone(&self.engine),
            self.schema.clone(),
            self.relations.clone(),
            definition,
            self.query_config.clone(),
        )?;
        Ok(repository)
    }

    /// Register a repository under a given name
    pub fn register_repository<T: Entity>(
        &mut self,
        name: String,
        repository: Repository<T, PgEngine>,
    ) -> Result<(), RepoHausError> {
        if self.repositories.contains_key(&name) {
            return Err(RepoHausError::RepositoryAlreadyRegistered(name));
        }

        crate::debug_log!("Registering repository '{}' for {}", name, T::table_name());
        self.repositories.insert(name, Box::new(repository));
        Ok(())
    }

    /// Get a registered repository by name.
    ///
    /// Clone it and attach the request's parameters with `with_params`.
    pub fn get_repository<T: Entity>(
        &self,
        name: &str,
    ) -> Result<&Repository<T, PgEngine>, RepoHausError> {
        self.repositories
            .get(name)
            .and_then(|repository| repository.downcast_ref::<Repository<T, PgEngine>>())
            .ok_or_else(|| RepoHausError::RepositoryNotFound(name.to_string()))
    }

    /// List all registered repository names
    pub fn list_repositories(&self) -> Vec<&String> {
        self.repositories.keys().collect()
    }

    /// Remove a repository by name
    pub fn unregister_repository(&mut self, name: &str) -> Result<(), RepoHausError> {
        self.repositories
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| RepoHausError::RepositoryNotFound(name.to_string()))
    }

    /// Check database connection health
    pub async fn health_check(&self) -> Result<(), RepoHausError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}

async fn connect(config: &DatabaseConfig) -> Result<PgPool, RepoHausError> {
    let mut pool_options = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
        .idle_timeout(Duration::from_secs(config.idle_timeout_seconds));

    // Set max lifetime if specified
    if config.max_lifetime_seconds > 0 {
        pool_options = pool_options.max_lifetime(Duration::from_secs(config.max_lifetime_seconds));
    }

    Ok(pool_options.connect(&config.connection_string()).await?)
}
