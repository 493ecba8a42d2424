//! Schema snapshot from `information_schema`

use crate::errors::RepositoryError;
use crate::schema::{SchemaProvider, StaticSchema};
use crate::validation::{ValidatedFieldName, ValidatedTableName};
use sqlx::PgPool;
use std::collections::BTreeMap;
use type_mapping::{pg_type_to_column_kind, ColumnKind};

const COLUMNS_SQL: &str = "SELECT table_name::text, column_name::text, data_type::text \
     FROM information_schema.columns \
     WHERE table_schema = $1 AND table_name = ANY($2) \
     ORDER BY table_name, ordinal_position";

/// Read the columns of `tables` in `schema` once.
///
/// Tables that do not exist are left out of the snapshot; binding a
/// repository to one of them fails later with a configuration error.
pub async fn load_schema(
    pool: &PgPool,
    schema: &str,
    tables: &[&str],
) -> Result<StaticSchema, RepositoryError> {
    let names: Vec<String> = tables.iter().map(|table| table.to_string()).collect();
    let rows: Vec<(String, String, String)> = sqlx::query_as(COLUMNS_SQL)
        .bind(schema)
        .bind(names)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            RepositoryError::database_operation("information_schema.columns", "load_schema", e)
        })?;

    let snapshot = snapshot_from_rows(schema, rows);

    for table in tables {
        if !snapshot.has_table(table) {
            tracing::warn!(schema = %schema, table = %table, "Table not found while loading schema");
        }
    }

    tracing::info!(schema = %schema, tables = snapshot.table_names().len(), "Loaded schema snapshot");
    Ok(snapshot)
}

/// Build the snapshot from `(table, column, data_type)` rows.
///
/// A name that cannot be rendered safely into SQL is left out with a
/// warning instead of failing the whole snapshot.
fn snapshot_from_rows(schema: &str, rows: Vec<(String, String, String)>) -> StaticSchema {
    let mut columns: BTreeMap<String, Vec<(String, ColumnKind)>> = BTreeMap::new();
    for (table, column, data_type) in rows {
        if let Err(e) = ValidatedTableName::new(&table) {
            tracing::warn!(schema = %schema, table = %table, error = %e, "Skipping table");
            continue;
        }
        if let Err(e) = ValidatedFieldName::new(&column) {
            tracing::warn!(schema = %schema, table = %table, column = %column, error = %e, "Skipping column");
            continue;
        }
        columns
            .entry(table)
            .or_default()
            .push((column, pg_type_to_column_kind(&data_type)));
    }

    let mut snapshot = StaticSchema::new();
    for (table, table_columns) in &columns {
        let table_columns = table_columns
            .iter()
            .map(|(column, kind)| (column.as_str(), *kind));
        match snapshot.clone().with_table(table, table_columns) {
            Ok(next) => snapshot = next,
            Err(e) => tracing::warn!(schema = %schema, table = %table, error = %e, "Skipping table"),
        }
    }
    snapshot
}
