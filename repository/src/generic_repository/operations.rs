//! Repository operations
//!
//! Reads go through the composed query; writes are whitelisted by the
//! entity's fillable attributes and then reloaded with the effective
//! expands.

use super::core::Repository;
use crate::errors::RepositoryError;
use crate::query_builder::{Page, QueryBuilder, QueryFilter};
use crate::resolve::FillableGuard;
use crate::traits::{Entity, EntityRef, PersistenceEngine};
use serde_json::{Map, Value};

impl<T: Entity, E: PersistenceEngine> Repository<T, E> {
    /// Every record the composed query matches
    pub async fn all(&self, columns: &[&str]) -> Result<Vec<T>, RepositoryError> {
        self.engine.get(&self.get_query(), columns).await
    }

    /// Look a record up by key within the composed query, or reload a
    /// loaded entity with the current expands
    pub async fn find<'a>(
        &self,
        target: impl Into<EntityRef<'a, T>>,
        columns: &[&str],
    ) -> Result<Option<T>, RepositoryError> {
        match target.into() {
            EntityRef::Key(key) => {
                self.engine
                    .find_by_key(&self.get_query(), &key.to_value(), columns)
                    .await
            }
            EntityRef::Entity(entity) => self.reload(entity).await,
        }
    }

    /// First record matching `filter` on top of the composed query
    pub async fn find_by(&self, filter: QueryFilter) -> Result<Option<T>, RepositoryError> {
        self.engine.first(&self.get_query().filter(filter), &[]).await
    }

    pub async fn exists(&self, filter: QueryFilter) -> Result<bool, RepositoryError> {
        self.engine.exists(&self.get_query().filter(filter)).await
    }

    /// Insert the fillable part of `data`
    pub async fn create(&self, data: &Map<String, Value>) -> Result<T, RepositoryError> {
        let fields = FillableGuard::filter(data, T::fillable());
        crate::debug_log!("Creating {} with {} fields", T::table_name(), fields.len());
        let created: T = self.engine.create(fields).await?;
        Ok(self.reload(&created).await?.unwrap_or(created))
    }

    /// Update the fillable part of `data` on the target record
    pub async fn update<'a>(
        &self,
        data: &Map<String, Value>,
        target: impl Into<EntityRef<'a, T>>,
    ) -> Result<T, RepositoryError> {
        let key = target.into().key_value().ok_or_else(|| {
            RepositoryError::NotFound(format!("unsaved {} cannot be updated", T::table_name()))
        })?;
        let fields = FillableGuard::filter(data, T::fillable());
        let updated: T = self
            .engine
            .update(&key, fields)
            .await?
            .ok_or_else(|| RepositoryError::not_found(T::table_name(), &key))?;
        Ok(self.reload(&updated).await?.unwrap_or(updated))
    }

    /// `false` when the record does not exist
    pub async fn delete<'a>(
        &self,
        target: impl Into<EntityRef<'a, T>>,
    ) -> Result<bool, RepositoryError> {
        match target.into().key_value() {
            Some(key) => self.engine.delete::<T>(&key).await,
            None => Ok(false),
        }
    }

    /// One page of the composed query.
    ///
    /// The page number comes from the request; `per_page` falls back to the
    /// configured default and is capped at the configured maximum.
    pub async fn paginate(
        &self,
        per_page: Option<u32>,
        columns: &[&str],
    ) -> Result<Page<T>, RepositoryError> {
        self.paginate_with(per_page, columns, |query| query).await
    }

    /// [`paginate`](Self::paginate) after `constrain` has narrowed the
    /// composed query
    pub async fn paginate_with<F>(
        &self,
        per_page: Option<u32>,
        columns: &[&str],
        constrain: F,
    ) -> Result<Page<T>, RepositoryError>
    where
        F: FnOnce(QueryBuilder) -> QueryBuilder,
    {
        let per_page = self.query_config.effective_per_page(per_page);
        let page = self.params.page.unwrap_or(1).max(1);
        let query = constrain(self.get_query());
        self.engine.paginate(&query, per_page, page, columns).await
    }

    /// Persist the whole entity, inserting or updating
    pub async fn save(&self, entity: &T) -> Result<bool, RepositoryError> {
        self.engine.save(entity).await
    }

    /// An unsaved entity built from the fillable part of `data`
    pub fn fresh_model(&self, data: &Map<String, Value>) -> Result<T, RepositoryError> {
        let fields = FillableGuard::filter(data, T::fillable());
        Ok(serde_json::from_value(Value::Object(fields))?)
    }

    /// Read `entity` again by key with the current expands, ignoring request filters
    pub async fn reload(&self, entity: &T) -> Result<Option<T>, RepositoryError> {
        match entity.key() {
            Some(key) => self.engine.find_by_key(&self.reload_query(), &key, &[]).await,
            None => Ok(None),
        }
    }
}
