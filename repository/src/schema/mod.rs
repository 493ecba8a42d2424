//! Schema and relation metadata
//!
//! The query core never introspects a live database. Column names, column
//! kinds and relation edges are injected through the two traits below,
//! normally backed by a snapshot loaded once at startup.

pub mod relations;
pub mod static_schema;

pub use relations::{RelationDef, RelationKind, StaticRelations};
pub use static_schema::{StaticSchema, TableSchema};
pub use type_mapping::ColumnKind;

use std::collections::BTreeSet;

/// Column metadata per table
pub trait SchemaProvider: Send + Sync {
    /// Names of the columns of `table`; empty when the table is unknown
    fn column_names(&self, table: &str) -> BTreeSet<String>;

    /// Kind of `table.column`, `None` when the column does not exist
    fn column_type(&self, table: &str, column: &str) -> Option<ColumnKind>;

    fn has_table(&self, table: &str) -> bool {
        !self.column_names(table).is_empty()
    }

    fn has_column(&self, table: &str, column: &str) -> bool {
        self.column_type(table, column).is_some()
    }
}

/// Named relations from one table to another
pub trait RelationResolver: Send + Sync {
    /// Resolve `relation` on the entity stored in `table`
    fn resolve(&self, table: &str, relation: &str) -> Option<RelationDef>;
}
