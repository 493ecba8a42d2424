//! Relation edges between tables

use super::RelationResolver;
use crate::validation::{ValidatedFieldName, ValidatedTableName, ValidationError};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// The current table holds the foreign key
    BelongsTo,
    /// The related table holds the foreign key, at most one row
    HasOne,
    /// The related table holds the foreign key
    HasMany,
}

impl RelationKind {
    /// Whether eager loading yields a list rather than a single record
    pub fn is_many(&self) -> bool {
        matches!(self, RelationKind::HasMany)
    }
}

/// How a relation is joined: `child_table.join_column = parent.parent_key_column`,
/// where the parent is the table the relation is declared on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDef {
    pub kind: RelationKind,
    pub child_table: String,
    pub join_column: String,
    pub parent_key_column: String,
}

/// Relation map implementing [`RelationResolver`]
#[derive(Debug, Clone, Default)]
pub struct StaticRelations {
    relations: HashMap<(String, String), RelationDef>,
}

impl StaticRelations {
    pub fn new() -> Self {
        Self::default()
    }

    /// `table.foreign_key` references `related.owner_key`
    pub fn belongs_to(
        self,
        table: &str,
        relation: &str,
        related: &str,
        foreign_key: &str,
        owner_key: &str,
    ) -> Result<Self, ValidationError> {
        self.insert(
            table,
            relation,
            RelationKind::BelongsTo,
            related,
            owner_key,
            foreign_key,
        )
    }

    /// `related.foreign_key` references `table.local_key`, single row
    pub fn has_one(
        self,
        table: &str,
        relation: &str,
        related: &str,
        foreign_key: &str,
        local_key: &str,
    ) -> Result<Self, ValidationError> {
        self.insert(
            table,
            relation,
            RelationKind::HasOne,
            related,
            foreign_key,
            local_key,
        )
    }

    /// `related.foreign_key` references `table.local_key`
    pub fn has_many(
        self,
        table: &str,
        relation: &str,
        related: &str,
        foreign_key: &str,
        local_key: &str,
    ) -> Result<Self, ValidationError> {
        self.insert(
            table,
            relation,
            RelationKind::HasMany,
            related,
            foreign_key,
            local_key,
        )
    }

    fn insert(
        mut self,
        table: &str,
        relation: &str,
        kind: RelationKind,
        child_table: &str,
        join_column: &str,
        parent_key_column: &str,
    ) -> Result<Self, ValidationError> {
        let table = ValidatedTableName::new(table)?;
        let def = RelationDef {
            kind,
            child_table: ValidatedTableName::new(child_table)?.into_string(),
            join_column: ValidatedFieldName::new(join_column)?.into_string(),
            parent_key_column: ValidatedFieldName::new(parent_key_column)?.into_string(),
        };
        self.relations
            .insert((table.into_string(), relation.to_string()), def);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}

impl RelationResolver for StaticRelations {
    fn resolve(&self, table: &str, relation: &str) -> Option<RelationDef> {
        self.relations
            .get(&(table.to_string(), relation.to_string()))
            .cloned()
    }
}
