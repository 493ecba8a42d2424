//! PostgreSQL persistence engine
//!
//! Rows travel as JSONB: reads select `to_jsonb(table.*)` and writes go
//! through `jsonb_populate_record`, so PostgreSQL does the conversion to
//! each column's type and entities only need serde.

use super::bind::{bind_param, bind_scalar_param};
use crate::errors::RepositoryError;
use crate::query_builder::{QueryBuilder, SqlParam};
use crate::schema::{RelationResolver, SchemaProvider};
use crate::traits::{Entity, PersistenceEngine};
use crate::validation::{qualify, quote_ident, ValidatedFieldName, ValidatedTableName};
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone)]
pub struct PgEngine {
    pool: PgPool,
    schema: Arc<dyn SchemaProvider>,
    relations: Arc<dyn RelationResolver>,
}

impl std::fmt::Debug for PgEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgEngine")
            .field("pool_size", &self.pool.size())
            .finish()
    }
}

impl PgEngine {
    pub fn new(
        pool: PgPool,
        schema: Arc<dyn SchemaProvider>,
        relations: Arc<dyn RelationResolver>,
    ) -> Self {
        Self {
            pool,
            schema,
            relations,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// `to_jsonb(t.*)`, or an object of the requested columns
    fn projection(table: &str, columns: &[&str]) -> Result<String, RepositoryError> {
        if columns.is_empty() || columns.contains(&"*") {
            return Ok(format!("to_jsonb({}.*)", quote_ident(table)));
        }
        let mut pairs = Vec::with_capacity(columns.len());
        for column in columns {
            let column = ValidatedFieldName::new(column)?;
            pairs.push(format!("'{}', {}", column.as_str(), qualify(table, column.as_str())));
        }
        Ok(format!("jsonb_build_object({})", pairs.join(", ")))
    }

    /// Keep the payload entries that are columns of `table`
    fn column_payload(&self, table: &str, data: Map<String, Value>) -> Map<String, Value> {
        data.into_iter()
            .filter(|(key, _)| {
                let known = self.schema.has_column(table, key);
                if !known {
                    crate::trace_log!("Dropping '{}' from {} payload: not a column", key, table);
                }
                known
            })
            .collect()
    }

    async fn fetch_records(
        &self,
        query: &QueryBuilder,
        columns: &[&str],
    ) -> Result<Vec<Value>, RepositoryError> {
        let table = ValidatedTableName::new(query.base_table())?;
        let projection = Self::projection(table.as_str(), columns)?;
        let (sql, params) = query.to_select_sql(&projection);
        tracing::debug!(table = %table, sql = %sql, params = params.len(), "Executing select");

        let mut select = sqlx::query_scalar::<_, Value>(&sql);
        for param in params {
            select = bind_scalar_param(select, param);
        }
        let mut records = select
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::database_operation(table.as_str(), "select", e))?;

        for relation in query.eager_loads() {
            self.load_relation(table.as_str(), relation, &mut records)
                .await?;
        }
        Ok(records)
    }

    /// Nest the related rows of `relation` into each record
    async fn load_relation(
        &self,
        table: &str,
        relation: &str,
        records: &mut [Value],
    ) -> Result<(), RepositoryError> {
        let Some(def) = self.relations.resolve(table, relation) else {
            crate::trace_log!("Eager load '{}' is not a relation of {}", relation, table);
            return Ok(());
        };
        let child = ValidatedTableName::new(&def.child_table)?;
        let join_column = ValidatedFieldName::new(&def.join_column)?;

        let mut keys: Vec<Value> = Vec::new();
        for record in records.iter() {
            if let Some(key) = record.get(&def.parent_key_column).filter(|key| !key.is_null()) {
                if !keys.contains(key) {
                    keys.push(key.clone());
                }
            }
        }

        let mut related: HashMap<String, Vec<Value>> = HashMap::new();
        if !keys.is_empty() {
            let sql = format!(
                "SELECT to_jsonb({child}.*) FROM {child} WHERE $1::jsonb @> to_jsonb({column})",
                child = child,
                column = join_column.qualified(&child),
            );
            tracing::debug!(table = %table, relation = %relation, sql = %sql, keys = keys.len(), "Loading relation");

            let rows = sqlx::query_scalar::<_, Value>(&sql)
                .bind(Value::Array(keys))
                .fetch_all(&self.pool)
                .await
                .map_err(|e| RepositoryError::database_operation(child.as_str(), "eager_load", e))?;
            for row in rows {
                if let Some(key) = row.get(join_column.as_str()) {
                    related.entry(key.to_string()).or_default().push(row);
                }
            }
        }

        for record in records.iter_mut() {
            let matches = record
                .get(&def.parent_key_column)
                .and_then(|key| related.get(&key.to_string()))
                .cloned()
                .unwrap_or_default();
            let nested = if def.kind.is_many() {
                Value::Array(matches)
            } else {
                matches.into_iter().next().unwrap_or(Value::Null)
            };
            if let Value::Object(fields) = record {
                fields.insert(relation.to_string(), nested);
            }
        }
        Ok(())
    }

    fn decode<T: Entity>(records: Vec<Value>) -> Result<Vec<T>, RepositoryError> {
        records
            .into_iter()
            .map(|record| serde_json::from_value(record).map_err(RepositoryError::from))
            .collect()
    }

    async fn fetch_one_returning<T: Entity>(
        &self,
        table: &str,
        operation: &str,
        sql: &str,
        params: Vec<SqlParam>,
    ) -> Result<Option<T>, RepositoryError> {
        tracing::debug!(table = %table, sql = %sql, params = params.len(), "Executing {}", operation);
        let mut statement = sqlx::query_scalar::<_, Value>(sql);
        for param in params {
            statement = bind_scalar_param(statement, param);
        }
        let record = statement
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::database_operation(table, operation, e))?;
        record
            .map(|record| serde_json::from_value(record).map_err(RepositoryError::from))
            .transpose()
    }
}

/// Validated column names of `payload`, in their SQL form
fn column_list(payload: &Map<String, Value>) -> Result<Vec<String>, RepositoryError> {
    payload
        .keys()
        .map(|key| Ok(ValidatedFieldName::new(key)?.to_string()))
        .collect()
}

/// `INSERT` of the `payload` columns read from the JSONB document in `$1`
fn insert_sql(
    table: &ValidatedTableName,
    payload: &Map<String, Value>,
) -> Result<String, RepositoryError> {
    if payload.is_empty() {
        return Ok(format!("INSERT INTO {} DEFAULT VALUES", table));
    }
    Ok(format!(
        "INSERT INTO {t} ({c}) SELECT {c} FROM jsonb_populate_record(NULL::{t}, $1::jsonb)",
        t = table,
        c = column_list(payload)?.join(", "),
    ))
}

/// `UPDATE` of the `payload` columns from `$1`, keyed by `$2`
fn update_sql(
    table: &ValidatedTableName,
    pk: &ValidatedFieldName,
    payload: &Map<String, Value>,
) -> Result<String, RepositoryError> {
    let assignments: Vec<String> = column_list(payload)?
        .iter()
        .map(|column| format!("{c} = r.{c}", c = column))
        .collect();
    Ok(format!(
        "UPDATE {t} SET {a} FROM jsonb_populate_record(NULL::{t}, $1::jsonb) AS r \
         WHERE {pk} = $2 RETURNING to_jsonb({t}.*)",
        t = table,
        a = assignments.join(", "),
        pk = pk.qualified(table),
    ))
}

/// Split an entity's fields into the `save` payload and whether it has a key.
///
/// Without a key the row is new: the key and every null field are left out
/// so the table's defaults apply.
fn save_payload(pk: &str, mut payload: Map<String, Value>) -> (Map<String, Value>, bool) {
    let has_key = payload.get(pk).is_some_and(|key| !key.is_null());
    if !has_key {
        payload.remove(pk);
        payload.retain(|_, value| !value.is_null());
    }
    (payload, has_key)
}

/// Plain insert for new rows, upsert on the primary key otherwise
fn save_sql(
    table: &ValidatedTableName,
    pk: &ValidatedFieldName,
    payload: &Map<String, Value>,
    has_key: bool,
) -> Result<String, RepositoryError> {
    let mut sql = insert_sql(table, payload)?;
    if !has_key {
        return Ok(sql);
    }

    let key = pk.to_string();
    let updates: Vec<String> = column_list(payload)?
        .into_iter()
        .filter(|column| *column != key)
        .map(|column| format!("{c} = EXCLUDED.{c}", c = column))
        .collect();
    if updates.is_empty() {
        sql.push_str(&format!(" ON CONFLICT ({}) DO NOTHING", key));
    } else {
        sql.push_str(&format!(" ON CONFLICT ({}) DO UPDATE SET {}", key, updates.join(", ")));
    }
    Ok(sql)
}

#[async_trait]
impl PersistenceEngine for PgEngine {
    async fn get<T: Entity>(
        &self,
        query: &QueryBuilder,
        columns: &[&str],
    ) -> Result<Vec<T>, RepositoryError> {
        let records = self.fetch_records(query, columns).await?;
        Self::decode(records)
    }

    async fn first<T: Entity>(
        &self,
        query: &QueryBuilder,
        columns: &[&str],
    ) -> Result<Option<T>, RepositoryError> {
        let query = query.clone().limit(1);
        let records = self.fetch_records(&query, columns).await?;
        Ok(Self::decode(records)?.into_iter().next())
    }

    async fn count(&self, query: &QueryBuilder) -> Result<u64, RepositoryError> {
        let table = ValidatedTableName::new(query.base_table())?;
        let (sql, params) = query.to_count_sql();
        tracing::debug!(table = %table, sql = %sql, params = params.len(), "Executing count");

        let mut statement = sqlx::query_scalar::<_, i64>(&sql);
        for param in params {
            statement = bind_scalar_param(statement, param);
        }
        let total = statement
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::database_operation(table.as_str(), "count", e))?;
        Ok(u64::try_from(total).unwrap_or_default())
    }

    async fn exists(&self, query: &QueryBuilder) -> Result<bool, RepositoryError> {
        let table = ValidatedTableName::new(query.base_table())?;
        let (sql, params) = query.to_exists_sql();
        tracing::debug!(table = %table, sql = %sql, params = params.len(), "Executing exists");

        let mut statement = sqlx::query_scalar::<_, bool>(&sql);
        for param in params {
            statement = bind_scalar_param(statement, param);
        }
        statement
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::database_operation(table.as_str(), "exists", e))
    }

    async fn create<T: Entity>(&self, data: Map<String, Value>) -> Result<T, RepositoryError> {
        let table = ValidatedTableName::new(T::table_name())?;
        let payload = self.column_payload(table.as_str(), data);

        let sql = format!("{} RETURNING to_jsonb({}.*)", insert_sql(&table, &payload)?, table);
        let params = if payload.is_empty() {
            Vec::new()
        } else {
            vec![SqlParam::untyped(Value::Object(payload))]
        };

        self.fetch_one_returning(table.as_str(), "insert", &sql, params)
            .await?
            .ok_or_else(|| {
                RepositoryError::database_operation(table.as_str(), "insert", sqlx::Error::RowNotFound)
            })
    }

    async fn update<T: Entity>(
        &self,
        key: &Value,
        data: Map<String, Value>,
    ) -> Result<Option<T>, RepositoryError> {
        let table = ValidatedTableName::new(T::table_name())?;
        let pk = ValidatedFieldName::new(T::primary_key())?;
        let mut payload = self.column_payload(table.as_str(), data);
        payload.remove(pk.as_str());

        if payload.is_empty() {
            let query = QueryBuilder::new(table.as_str());
            return self.find_by_key(&query, key, &[]).await;
        }

        let sql = update_sql(&table, &pk, &payload)?;
        self.fetch_one_returning(
            table.as_str(),
            "update",
            &sql,
            vec![
                SqlParam::untyped(Value::Object(payload)),
                SqlParam::untyped(key.clone()),
            ],
        )
        .await
    }

    async fn delete<T: Entity>(&self, key: &Value) -> Result<bool, RepositoryError> {
        let table = ValidatedTableName::new(T::table_name())?;
        let pk = ValidatedFieldName::new(T::primary_key())?;
        let sql = format!("DELETE FROM {} WHERE {} = $1", table, pk.qualified(&table));
        tracing::debug!(table = %table, sql = %sql, "Executing delete");

        let result = bind_param(sqlx::query(&sql), SqlParam::untyped(key.clone()))
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::database_operation(table.as_str(), "delete", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn save<T: Entity>(&self, entity: &T) -> Result<bool, RepositoryError> {
        let table = ValidatedTableName::new(T::table_name())?;
        let pk = ValidatedFieldName::new(T::primary_key())?;
        let Value::Object(fields) = serde_json::to_value(entity)? else {
            return Err(RepositoryError::invalid_configuration(format!(
                "{} does not serialize to an object",
                table
            )));
        };
        let (payload, has_key) = save_payload(pk.as_str(), self.column_payload(table.as_str(), fields));
        let sql = save_sql(&table, &pk, &payload, has_key)?;
        tracing::debug!(table = %table, sql = %sql, "Executing save");

        let mut statement = sqlx::query(&sql);
        if !payload.is_empty() {
            statement = statement.bind(Value::Object(payload));
        }
        let result = statement
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::database_operation(table.as_str(), "save", e))?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_projection() {
        assert_eq!(
            PgEngine::projection("posts", &[]).unwrap(),
            "to_jsonb(posts.*)"
        );
        assert_eq!(
            PgEngine::projection("posts", &["*"]).unwrap(),
            "to_jsonb(posts.*)"
        );
        assert_eq!(
            PgEngine::projection("posts", &["id", "title"]).unwrap(),
            "jsonb_build_object('id', posts.id, 'title', posts.title)"
        );
        assert!(PgEngine::projection("posts", &["title; drop"]).is_err());
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn posts() -> (ValidatedTableName, ValidatedFieldName) {
        (
            ValidatedTableName::new("posts").unwrap(),
            ValidatedFieldName::new("id").unwrap(),
        )
    }

    #[test]
    fn test_column_list_validates() {
        let payload = object(json!({"title": "a", "views": 1, "user": "x"}));
        assert_eq!(column_list(&payload).unwrap(), vec!["title", "\"user\"", "views"]);

        assert!(column_list(&object(json!({"bad name": 1}))).is_err());
    }

    #[test]
    fn test_projection_quotes_keywords() {
        assert_eq!(
            PgEngine::projection("orders", &["id", "user"]).unwrap(),
            "jsonb_build_object('id', orders.id, 'user', orders.\"user\")"
        );
        assert_eq!(PgEngine::projection("group", &[]).unwrap(), "to_jsonb(\"group\".*)");
    }

    #[test]
    fn test_insert_and_update_sql() {
        let (table, pk) = posts();
        let payload = object(json!({"title": "a", "order": 2}));

        assert_eq!(
            insert_sql(&table, &payload).unwrap(),
            "INSERT INTO posts (\"order\", title) SELECT \"order\", title \
             FROM jsonb_populate_record(NULL::posts, $1::jsonb)"
        );
        assert_eq!(
            insert_sql(&table, &Map::new()).unwrap(),
            "INSERT INTO posts DEFAULT VALUES"
        );
        assert_eq!(
            update_sql(&table, &pk, &payload).unwrap(),
            "UPDATE posts SET \"order\" = r.\"order\", title = r.title \
             FROM jsonb_populate_record(NULL::posts, $1::jsonb) AS r \
             WHERE posts.id = $2 RETURNING to_jsonb(posts.*)"
        );
    }

    #[test]
    fn test_new_row_leaves_unset_columns_to_defaults() {
        let (table, pk) = posts();
        let fields = object(json!({"id": null, "title": "Fresh", "status": null, "views": 0}));

        let (payload, has_key) = save_payload(pk.as_str(), fields);
        assert!(!has_key);
        assert_eq!(payload, object(json!({"title": "Fresh", "views": 0})));
        assert_eq!(
            save_sql(&table, &pk, &payload, has_key).unwrap(),
            "INSERT INTO posts (title, views) SELECT title, views \
             FROM jsonb_populate_record(NULL::posts, $1::jsonb)"
        );
    }

    #[test]
    fn test_new_row_without_values_uses_defaults() {
        let (table, pk) = posts();
        let (payload, has_key) = save_payload(pk.as_str(), object(json!({"id": null, "title": null})));
        assert!(payload.is_empty());
        assert_eq!(
            save_sql(&table, &pk, &payload, has_key).unwrap(),
            "INSERT INTO posts DEFAULT VALUES"
        );
    }

    #[test]
    fn test_keyed_save_upserts_and_keeps_nulls() {
        let (table, pk) = posts();
        let (payload, has_key) =
            save_payload(pk.as_str(), object(json!({"id": 4, "title": "T", "status": null})));
        assert!(has_key);
        assert_eq!(payload.len(), 3);
        assert_eq!(
            save_sql(&table, &pk, &payload, has_key).unwrap(),
            "INSERT INTO posts (id, status, title) SELECT id, status, title \
             FROM jsonb_populate_record(NULL::posts, $1::jsonb) \
             ON CONFLICT (id) DO UPDATE SET status = EXCLUDED.status, title = EXCLUDED.title"
        );

        let (key_only, has_key) = save_payload(pk.as_str(), object(json!({"id": 4})));
        assert!(save_sql(&table, &pk, &key_only, has_key)
            .unwrap()
            .ends_with("ON CONFLICT (id) DO NOTHING"));
    }
}
