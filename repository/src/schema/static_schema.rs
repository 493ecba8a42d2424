//! In-memory schema snapshot

use super::SchemaProvider;
use crate::validation::{ValidatedFieldName, ValidatedTableName, ValidationError};
use std::collections::{BTreeSet, HashMap};
use type_mapping::ColumnKind;

/// Columns of a single table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSchema {
    columns: HashMap<String, ColumnKind>,
}

impl TableSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column, validating its name
    pub fn column(mut self, name: &str, kind: ColumnKind) -> Result<Self, ValidationError> {
        let name = ValidatedFieldName::new(name)?;
        self.columns.insert(name.into_string(), kind);
        Ok(self)
    }

    pub fn kind_of(&self, column: &str) -> Option<ColumnKind> {
        self.columns.get(column).copied()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Immutable schema snapshot implementing [`SchemaProvider`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticSchema {
    tables: HashMap<String, TableSchema>,
}

impl StaticSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table from `(column, kind)` pairs
    pub fn with_table<'a, I>(mut self, table: &str, columns: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (&'a str, ColumnKind)>,
    {
        let table = ValidatedTableName::new(table)?;
        let mut schema = self.tables.remove(table.as_str()).unwrap_or_default();
        for (name, kind) in columns {
            schema = schema.column(name, kind)?;
        }
        self.tables.insert(table.into_string(), schema);
        Ok(self)
    }

    pub fn table(&self, table: &str) -> Option<&TableSchema> {
        self.tables.get(table)
    }

    pub fn table_names(&self) -> BTreeSet<&str> {
        self.tables.keys().map(String::as_str).collect()
    }
}

impl SchemaProvider for StaticSchema {
    fn column_names(&self, table: &str) -> BTreeSet<String> {
        self.tables
            .get(table)
            .map(|schema| schema.columns.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn column_type(&self, table: &str, column: &str) -> Option<ColumnKind> {
        self.tables.get(table)?.kind_of(column)
    }

    fn has_table(&self, table: &str) -> bool {
        self.tables.get(table).is_some_and(|schema| !schema.is_empty())
    }
}
