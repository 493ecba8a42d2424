//! Persistence engine seam
//!
//! The repository composes queries; an engine executes them. Engines must
//! honour the query's joins, conditions, ordering, window and eager-load
//! list.

use crate::errors::RepositoryError;
use crate::query_builder::{Page, Pagination, QueryBuilder, QueryFilter};
use crate::traits::entity::Entity;
use crate::validation::qualify;
use async_trait::async_trait;
use serde_json::{Map, Value};

#[async_trait]
pub trait PersistenceEngine: Send + Sync {
    /// Fetch every row matching `query`; an empty `columns` selects all
    async fn get<T: Entity>(
        &self,
        query: &QueryBuilder,
        columns: &[&str],
    ) -> Result<Vec<T>, RepositoryError>;

    /// Fetch the first row matching `query`
    async fn first<T: Entity>(
        &self,
        query: &QueryBuilder,
        columns: &[&str],
    ) -> Result<Option<T>, RepositoryError>;

    /// Number of rows matching `query`, ignoring its ordering and window
    async fn count(&self, query: &QueryBuilder) -> Result<u64, RepositoryError>;

    async fn exists(&self, query: &QueryBuilder) -> Result<bool, RepositoryError>;

    /// Insert a row built from `data` and return it as stored
    async fn create<T: Entity>(&self, data: Map<String, Value>) -> Result<T, RepositoryError>;

    /// Update the row with primary key `key`; `None` when there is no such row
    async fn update<T: Entity>(
        &self,
        key: &Value,
        data: Map<String, Value>,
    ) -> Result<Option<T>, RepositoryError>;

    /// Delete the row with primary key `key`; `false` when there is no such row
    async fn delete<T: Entity>(&self, key: &Value) -> Result<bool, RepositoryError>;

    /// Insert or update the whole entity
    async fn save<T: Entity>(&self, entity: &T) -> Result<bool, RepositoryError>;

    /// Fetch the row with primary key `key` within `query`
    async fn find_by_key<T: Entity>(
        &self,
        query: &QueryBuilder,
        key: &Value,
        columns: &[&str],
    ) -> Result<Option<T>, RepositoryError> {
        let pk = qualify(query.base_table(), T::primary_key());
        let query = query.clone().filter(QueryFilter::eq(&pk, key.clone()));
        self.first(&query, columns).await
    }

    /// Fetch one page of `query` together with the total row count
    async fn paginate<T: Entity>(
        &self,
        query: &QueryBuilder,
        per_page: u32,
        page: u64,
        columns: &[&str],
    ) -> Result<Page<T>, RepositoryError> {
        let page = page.max(1);
        let total = self.count(query).await?;
        let window = Pagination::for_page(page, per_page);
        let data = self
            .get(&query.clone().paginate(&window), columns)
            .await?;
        Ok(Page::new(data, total, per_page, page))
    }
}
