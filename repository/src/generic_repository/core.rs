use super::definition::RepositoryDefinition;
use crate::errors::RepositoryError;
use crate::query_builder::QueryBuilder;
use crate::request::{FilterSpec, RequestParams, SortSpec};
use crate::resolve::{ExpandResolver, QueryAssembler};
use crate::schema::{RelationResolver, SchemaProvider};
use crate::traits::{Entity, PersistenceEngine};
use crate::validation::ValidatedTableName;
use config::QueryConfig;
use std::sync::Arc;

/// Repository for one entity type, scoped to one request.
///
/// Everything behind an `Arc` is shared and immutable; the request
/// parameters and the suppress-filters flag belong to this value only.
pub struct Repository<T: Entity, E: PersistenceEngine> {
    pub(crate) engine: Arc<E>,
    pub(crate) schema: Arc<dyn SchemaProvider>,
    pub(crate) relations: Arc<dyn RelationResolver>,
    pub(crate) definition: Arc<RepositoryDefinition<T>>,
    pub(crate) query_config: QueryConfig,
    pub(crate) params: RequestParams,
    pub(crate) suppress_filters: bool,
}

impl<T: Entity, E: PersistenceEngine> Clone for Repository<T, E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            schema: Arc::clone(&self.schema),
            relations: Arc::clone(&self.relations),
            definition: Arc::clone(&self.definition),
            query_config: self.query_config.clone(),
            params: self.params.clone(),
            suppress_filters: self.suppress_filters,
        }
    }
}

impl<T: Entity, E: PersistenceEngine> std::fmt::Debug for Repository<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("table", &T::table_name())
            .field("definition", &self.definition)
            .field("params", &self.params)
            .field("suppress_filters", &self.suppress_filters)
            .finish()
    }
}

impl<T: Entity, E: PersistenceEngine> Repository<T, E> {
    /// Bind `T` to the engine and schema.
    ///
    /// Fails when the entity's table or primary key is not in the schema,
    /// before any query can be built.
    pub fn new(
        engine: Arc<E>,
        schema: Arc<dyn SchemaProvider>,
        relations: Arc<dyn RelationResolver>,
        definition: Arc<RepositoryDefinition<T>>,
        query_config: QueryConfig,
    ) -> Result<Self, RepositoryError> {
        let table = ValidatedTableName::new(T::table_name()).map_err(|e| {
            RepositoryError::invalid_configuration(format!(
                "entity table name '{}' is unusable: {}",
                T::table_name(),
                e
            ))
        })?;
        if !schema.has_table(table.as_str()) {
            return Err(RepositoryError::invalid_configuration(format!(
                "table '{}' is not in the schema",
                table
            )));
        }
        if !schema.has_column(table.as_str(), T::primary_key()) {
            return Err(RepositoryError::invalid_configuration(format!(
                "primary key '{}' is not a column of '{}'",
                T::primary_key(),
                table
            )));
        }

        Ok(Self {
            engine,
            schema,
            relations,
            definition,
            query_config,
            params: RequestParams::default(),
            suppress_filters: false,
        })
    }

    /// Use `params` as the request's filters, sorts, expands and page
    pub fn with_params(mut self, params: RequestParams) -> Self {
        self.params = params;
        self
    }

    /// Ignore the request's filters when composing queries
    pub fn suppress_filters(mut self, suppress: bool) -> Self {
        self.suppress_filters = suppress;
        self
    }

    pub fn params(&self) -> &RequestParams {
        &self.params
    }

    pub fn definition(&self) -> &RepositoryDefinition<T> {
        &self.definition
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Request expands merged with the definition's defaults
    pub fn expands(&self) -> Vec<String> {
        ExpandResolver::resolve(self.params.expands.as_deref(), &self.definition.default_expands)
    }

    /// The composed, unexecuted query for this request
    pub fn get_query(&self) -> QueryBuilder {
        self.assembler().build(
            QueryBuilder::new(T::table_name()),
            &self.params.filters,
            &self.params.sorts,
            &self.expands(),
            self.suppress_filters,
        )
    }

    /// Query used to reload a single record: expands only
    pub(crate) fn reload_query(&self) -> QueryBuilder {
        self.assembler().build(
            QueryBuilder::new(T::table_name()),
            &FilterSpec::new(),
            &SortSpec::new(),
            &self.expands(),
            true,
        )
    }

    fn assembler(&self) -> QueryAssembler<'_> {
        QueryAssembler::new(
            self.schema.as_ref(),
            self.relations.as_ref(),
            &self.definition.overrides,
        )
    }
}
