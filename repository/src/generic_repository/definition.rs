//! Static per-entity repository configuration

use crate::query_builder::QueryBuilder;
use crate::resolve::{FilterContext, OverrideRegistry, SortContext};
use crate::traits::Entity;
use std::fmt;
use std::marker::PhantomData;

/// Default expands and field overrides for one entity type.
///
/// Built once, then shared read-only by every request through an `Arc`.
pub struct RepositoryDefinition<T: Entity> {
    pub(crate) overrides: OverrideRegistry,
    pub(crate) default_expands: Vec<String>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> RepositoryDefinition<T> {
    pub fn new() -> Self {
        Self {
            overrides: OverrideRegistry::new(),
            default_expands: Vec::new(),
            _entity: PhantomData,
        }
    }

    /// Relations loaded on every read, in addition to the request's
    pub fn with_default_expands<I, S>(mut self, expands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_expands = expands.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_overrides(mut self, overrides: OverrideRegistry) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn filter_by<F>(mut self, field: &str, handler: F) -> Self
    where
        F: Fn(FilterContext<'_>) -> QueryBuilder + Send + Sync + 'static,
    {
        self.overrides = self.overrides.filter_by(field, handler);
        self
    }

    pub fn sort_by<F>(mut self, field: &str, handler: F) -> Self
    where
        F: Fn(SortContext) -> QueryBuilder + Send + Sync + 'static,
    {
        self.overrides = self.overrides.sort_by(field, handler);
        self
    }

    pub fn default_expands(&self) -> &[String] {
        &self.default_expands
    }

    pub fn overrides(&self) -> &OverrideRegistry {
        &self.overrides
    }
}

impl<T: Entity> Default for RepositoryDefinition<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> fmt::Debug for RepositoryDefinition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepositoryDefinition")
            .field("table", &T::table_name())
            .field("default_expands", &self.default_expands)
            .field("overrides", &self.overrides)
            .finish()
    }
}
