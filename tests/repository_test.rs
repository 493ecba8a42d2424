//! Integration tests for request-driven repositories
//!
//! Runs the repository against an in-memory engine that records every query
//! it is handed, so no database is needed.

use repohaus::prelude::*;
use repohaus::repository::query_builder::{QueryCondition, QueryOperator};
use serde_json::json;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct Post {
    id: Option<i64>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    views: Option<i64>,
    #[serde(default)]
    secret: Option<String>,
    #[serde(default)]
    author_id: Option<i64>,
}

impl Entity for Post {
    fn table_name() -> &'static str {
        "posts"
    }

    fn fillable() -> &'static [&'static str] {
        &["title", "views", "author_id"]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Ghost {
    id: Option<i64>,
}

impl Entity for Ghost {
    fn table_name() -> &'static str {
        "ghosts"
    }

    fn fillable() -> &'static [&'static str] {
        &[]
    }
}

/// Engine keeping rows in memory; only primary-key equality is evaluated
#[derive(Default)]
struct RecordingEngine {
    rows: Mutex<Vec<Value>>,
    queries: Mutex<Vec<QueryBuilder>>,
    writes: Mutex<Vec<Map<String, Value>>>,
}

impl RecordingEngine {
    fn with_rows(rows: Vec<Value>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Self::default()
        }
    }

    fn record(&self, query: &QueryBuilder) {
        self.queries.lock().unwrap().push(query.clone());
    }

    fn last_query(&self) -> QueryBuilder {
        self.queries.lock().unwrap().last().cloned().unwrap()
    }

    fn key_condition(query: &QueryBuilder) -> Option<Value> {
        query.conditions().iter().find_map(|filter| match filter {
            QueryFilter::Condition(QueryCondition {
                field,
                operator: QueryOperator::Eq,
                value,
                ..
            }) if field == "posts.id" => value.clone(),
            _ => None,
        })
    }

    fn matching(&self, query: &QueryBuilder) -> Vec<Value> {
        let rows = self.rows.lock().unwrap();
        match Self::key_condition(query) {
            Some(key) => rows.iter().filter(|row| row["id"] == key).cloned().collect(),
            None => rows.clone(),
        }
    }
}

#[async_trait]
impl PersistenceEngine for RecordingEngine {
    async fn get<T: Entity>(
        &self,
        query: &QueryBuilder,
        _columns: &[&str],
    ) -> Result<Vec<T>, RepositoryError> {
        self.record(query);
        let offset = query.offset_value().unwrap_or(0) as usize;
        let limit = query.limit_value().map(|l| l as usize).unwrap_or(usize::MAX);
        self.matching(query)
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|row| serde_json::from_value(row).map_err(RepositoryError::from))
            .collect()
    }

    async fn first<T: Entity>(
        &self,
        query: &QueryBuilder,
        columns: &[&str],
    ) -> Result<Option<T>, RepositoryError> {
        Ok(self.get(&query.clone().limit(1), columns).await?.into_iter().next())
    }

    async fn count(&self, query: &QueryBuilder) -> Result<u64, RepositoryError> {
        self.record(query);
        Ok(self.matching(query).len() as u64)
    }

    async fn exists(&self, query: &QueryBuilder) -> Result<bool, RepositoryError> {
        self.record(query);
        Ok(!self.matching(query).is_empty())
    }

    async fn create<T: Entity>(&self, data: Map<String, Value>) -> Result<T, RepositoryError> {
        self.writes.lock().unwrap().push(data.clone());
        let mut rows = self.rows.lock().unwrap();
        let mut row = data;
        row.insert("id".into(), json!(rows.len() as i64 + 1));
        rows.push(Value::Object(row.clone()));
        Ok(serde_json::from_value(Value::Object(row))?)
    }

    async fn update<T: Entity>(
        &self,
        key: &Value,
        data: Map<String, Value>,
    ) -> Result<Option<T>, RepositoryError> {
        self.writes.lock().unwrap().push(data.clone());
        let mut rows = self.rows.lock().unwrap();
        let Some(Value::Object(row)) = rows.iter_mut().find(|row| &row["id"] == key) else {
            return Ok(None);
        };
        row.extend(data);
        Ok(Some(serde_json::from_value(Value::Object(row.clone()))?))
    }

    async fn delete<T: Entity>(&self, key: &Value) -> Result<bool, RepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|row| &row["id"] != key);
        Ok(rows.len() < before)
    }

    async fn save<T: Entity>(&self, entity: &T) -> Result<bool, RepositoryError> {
        let Value::Object(row) = serde_json::to_value(entity)? else {
            return Ok(false);
        };
        self.writes.lock().unwrap().push(row);
        Ok(true)
    }
}

fn schema() -> StaticSchema {
    StaticSchema::new()
        .with_table(
            "posts",
            [
                ("id", ColumnKind::Numeric),
                ("title", ColumnKind::String),
                ("views", ColumnKind::Numeric),
                ("secret", ColumnKind::String),
                ("author_id", ColumnKind::Numeric),
                ("created_at", ColumnKind::Date),
            ],
        )
        .unwrap()
        .with_table(
            "authors",
            [("id", ColumnKind::Numeric), ("name", ColumnKind::String)],
        )
        .unwrap()
        .with_table(
            "comments",
            [("id", ColumnKind::Numeric), ("post_id", ColumnKind::Numeric)],
        )
        .unwrap()
}

fn relations() -> StaticRelations {
    StaticRelations::new()
        .belongs_to("posts", "author", "authors", "author_id", "id")
        .unwrap()
        .has_many("posts", "comments", "comments", "post_id", "id")
        .unwrap()
}

fn seeded_rows() -> Vec<Value> {
    vec![
        json!({"id": 1, "title": "Hello", "views": 10, "secret": "s1", "author_id": 1}),
        json!({"id": 2, "title": "World", "views": 20, "secret": "s2", "author_id": 2}),
        json!({"id": 3, "title": "Again", "views": 30, "secret": "s3", "author_id": 1}),
    ]
}

fn repository_with(
    engine: RecordingEngine,
    definition: RepositoryDefinition<Post>,
) -> Repository<Post, RecordingEngine> {
    Repository::new(
        Arc::new(engine),
        Arc::new(schema()),
        Arc::new(relations()),
        Arc::new(definition),
        QueryConfig::default(),
    )
    .unwrap()
}

fn repository() -> Repository<Post, RecordingEngine> {
    repository_with(
        RecordingEngine::with_rows(seeded_rows()),
        RepositoryDefinition::new(),
    )
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected a JSON object"),
    }
}

#[test]
fn test_unbound_entity_is_a_configuration_error() {
    let result = Repository::<Ghost, RecordingEngine>::new(
        Arc::new(RecordingEngine::default()),
        Arc::new(schema()),
        Arc::new(relations()),
        Arc::new(RepositoryDefinition::new()),
        QueryConfig::default(),
    );

    assert!(matches!(
        result,
        Err(RepositoryError::InvalidConfiguration { .. })
    ));
}

#[test]
fn test_get_query_composes_expands_filters_and_sorts() {
    let definition = RepositoryDefinition::new().with_default_expands(["comments"]);
    let params = RequestParams::from_query_str(
        "filters[author.name]=Jane&filters[author.id]=2&filters[title]=ann\
         &sorts[created_at]=desc&sorts[author.name]=asc&expands=author,bogus",
    );
    let repo = repository_with(RecordingEngine::default(), definition).with_params(params);

    let query = repo.get_query();

    assert_eq!(query.eager_loads(), ["author", "comments"]);
    assert_eq!(query.joins().len(), 1);
    assert!(query.has_join("authors"));
    assert_eq!(query.conditions().len(), 3);
    assert_eq!(
        query.ordering(),
        &[("posts.created_at".to_string(), SortOrder::Desc)]
    );
}

#[test]
fn test_string_filter_is_case_insensitive_substring() {
    let repo = repository().with_params(RequestParams::new().with_filter("title", json!("ann")));

    let (sql, values) = repo.get_query().to_select_sql("*");

    assert_eq!(sql, "SELECT * FROM posts WHERE posts.title ILIKE $1");
    assert_eq!(values, vec![json!("%ann%")]);
}

#[test]
fn test_non_string_filter_is_equality() {
    let repo = repository().with_params(RequestParams::new().with_filter("views", json!("20")));

    let (sql, values) = repo.get_query().to_select_sql("*");

    assert_eq!(sql, "SELECT * FROM posts WHERE posts.views = $1");
    assert_eq!(values, vec![json!(20)]);
}

#[test]
fn test_empty_json_filter_leaves_query_unchanged() {
    let params: RequestParams =
        serde_json::from_str(r#"{"filters": {"title": ""}}"#).unwrap();
    let with_empty = repository().with_params(params).get_query();

    assert_eq!(with_empty.to_select_sql("*"), repository().get_query().to_select_sql("*"));
}

#[test]
fn test_null_filter_leaves_query_unchanged() {
    let with_null = repository()
        .with_params(RequestParams::new().with_filter("title", Value::Null))
        .get_query();
    let without = repository().get_query();

    assert_eq!(with_null.to_select_sql("*"), without.to_select_sql("*"));
}

#[test]
fn test_suppressed_filters_equal_empty_filters() {
    let params = RequestParams::new()
        .with_filter("author.name", json!("Jane"))
        .with_filter("views", json!(3))
        .with_sort("id", "desc");
    let suppressed = repository()
        .with_params(params.clone())
        .suppress_filters(true)
        .get_query();

    let mut unfiltered = params;
    unfiltered.filters.clear();
    let empty = repository().with_params(unfiltered).get_query();

    assert_eq!(suppressed, empty);
    assert!(suppressed.joins().is_empty());
    assert_eq!(suppressed.ordering().len(), 1);
}

#[test]
fn test_join_dedupe_across_builds() {
    let params = RequestParams::new()
        .with_filter("author.name", json!("Jane"))
        .with_filter("author.id", json!(1));
    let repo = repository().with_params(params);

    let first = repo.get_query();
    let second = repo.get_query();

    assert_eq!(first.joins().len(), 1);
    assert_eq!(first, second);
}

#[test]
fn test_override_beats_literal_column() {
    let definition = RepositoryDefinition::new().filter_by("views", |ctx| {
        ctx.query
            .filter(QueryFilter::gte("posts.views", ctx.value.clone()))
    });
    let repo = repository_with(RecordingEngine::default(), definition)
        .with_params(RequestParams::new().with_filter("views", json!(15)));

    assert_eq!(
        repo.get_query().conditions(),
        &[QueryFilter::gte("posts.views", json!(15))]
    );
}

#[test]
fn test_override_receives_all_filters() {
    let definition = RepositoryDefinition::new().filter_by("min_views", |ctx| {
        let query = ctx
            .query
            .filter(QueryFilter::gte("posts.views", ctx.value.clone()));
        match ctx.filters.get("max_views") {
            Some(max) => query.filter(QueryFilter::lte("posts.views", max.clone())),
            None => query,
        }
    });
    let params = RequestParams::new()
        .with_filter("min_views", json!(5))
        .with_filter("max_views", json!(25));
    let repo = repository_with(RecordingEngine::default(), definition).with_params(params);

    // max_views has no handler and no column, so only the override contributes
    assert_eq!(
        repo.get_query().conditions(),
        &[
            QueryFilter::gte("posts.views", json!(5)),
            QueryFilter::lte("posts.views", json!(25)),
        ]
    );
}

#[test]
fn test_expands_merge_request_and_defaults() {
    let definition = RepositoryDefinition::new().with_default_expands(["comments", "author"]);
    let repo = repository_with(RecordingEngine::default(), definition)
        .with_params(RequestParams::new().with_expands("author, tags"));

    assert_eq!(repo.expands(), vec!["author", "tags", "comments"]);
    assert_eq!(repo.definition().default_expands(), ["comments", "author"]);
}

#[test]
fn test_fresh_model_only_uses_fillable() {
    let repo = repository();
    let post = repo
        .fresh_model(&object(json!({"title": "Draft", "secret": "x", "id": 9})))
        .unwrap();

    assert_eq!(post.title, "Draft");
    assert_eq!(post.secret, None);
    assert_eq!(post.id, None);
}

#[tokio::test]
async fn test_create_drops_unfillable_and_reloads() {
    let engine = Arc::new(RecordingEngine::default());
    let repo = Repository::<Post, _>::new(
        engine.clone(),
        Arc::new(schema()),
        Arc::new(relations()),
        Arc::new(RepositoryDefinition::new().with_default_expands(["author"])),
        QueryConfig::default(),
    )
    .unwrap()
    .with_params(RequestParams::new().with_filter("title", json!("unrelated")));

    let created = repo
        .create(&object(json!({"title": "New", "secret": "hidden", "views": 1})))
        .await
        .unwrap();

    assert_eq!(created.id, Some(1));
    assert_eq!(created.title, "New");
    assert_eq!(created.secret, None);
    assert_eq!(
        engine.writes.lock().unwrap()[0],
        object(json!({"title": "New", "views": 1}))
    );

    let reload = engine.last_query();
    assert_eq!(reload.eager_loads(), ["author"]);
    assert_eq!(
        reload.conditions(),
        &[QueryFilter::eq("posts.id", json!(1))]
    );
}

#[tokio::test]
async fn test_update_by_key_and_missing_key() {
    let repo = repository();

    let updated = repo
        .update(&object(json!({"title": "Renamed", "secret": "nope"})), 2i64)
        .await
        .unwrap();
    assert_eq!(updated.title, "Renamed");
    assert_eq!(updated.secret.as_deref(), Some("s2"));

    let missing = repo
        .update(&object(json!({"title": "x"})), 99i64)
        .await;
    assert!(matches!(missing, Err(RepositoryError::NotFound(_))));
}

#[tokio::test]
async fn test_update_with_entity() {
    let repo = repository();
    let post = repo.find(1i64, &[]).await.unwrap().unwrap();

    let updated = repo
        .update(&object(json!({"views": 11})), &post)
        .await
        .unwrap();
    assert_eq!(updated.views, Some(11));
    assert_eq!(updated.id, Some(1));
}

#[tokio::test]
async fn test_delete_reports_absence() {
    let repo = repository();

    assert!(repo.delete(3i64).await.unwrap());
    assert!(!repo.delete(3i64).await.unwrap());

    let unsaved = Post {
        id: None,
        title: "never saved".into(),
        views: None,
        secret: None,
        author_id: None,
    };
    assert!(!repo.delete(&unsaved).await.unwrap());
}

#[tokio::test]
async fn test_find_goes_through_composed_query() {
    let repo = repository().with_params(
        RequestParams::new()
            .with_filter("title", json!("ell"))
            .with_expands("author"),
    );

    let post = repo.find(1i64, &[]).await.unwrap().unwrap();
    assert_eq!(post.title, "Hello");

    let query = repo.engine().last_query();
    assert_eq!(query.eager_loads(), ["author"]);
    assert_eq!(
        query.conditions(),
        &[
            QueryFilter::contains("posts.title", "ell").with_kind(ColumnKind::String),
            QueryFilter::eq("posts.id", json!(1)),
        ]
    );
}

#[tokio::test]
async fn test_find_with_entity_ignores_request_filters() {
    let repo = repository().with_params(RequestParams::new().with_filter("title", json!("zzz")));
    let loaded = Post {
        id: Some(2),
        title: "stale".into(),
        views: None,
        secret: None,
        author_id: None,
    };

    let fresh = repo.find(&loaded, &[]).await.unwrap().unwrap();
    assert_eq!(fresh.title, "World");
    assert_eq!(
        repo.engine().last_query().conditions(),
        &[QueryFilter::eq("posts.id", json!(2))]
    );
}

#[tokio::test]
async fn test_find_by_and_exists() {
    let repo = repository();

    let found = repo
        .find_by(QueryFilter::eq("posts.id", json!(3)))
        .await
        .unwrap();
    assert_eq!(found.map(|post| post.title), Some("Again".to_string()));

    assert!(repo.exists(QueryFilter::eq("posts.id", json!(1))).await.unwrap());
    assert!(!repo.exists(QueryFilter::eq("posts.id", json!(42))).await.unwrap());
}

#[tokio::test]
async fn test_all_returns_every_row() {
    let posts = repository().all(&[]).await.unwrap();
    assert_eq!(posts.len(), 3);
}

#[tokio::test]
async fn test_paginate_uses_request_page_and_clamps_size() {
    let repo = repository().with_params(RequestParams::new().with_page(2));

    let page = repo.paginate(Some(2), &[]).await.unwrap();
    assert_eq!(page.current_page, 2);
    assert_eq!(page.per_page, 2);
    assert_eq!(page.total, 3);
    assert_eq!(page.last_page, 2);
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].id, Some(3));

    let clamped = repository().paginate(Some(10_000), &[]).await.unwrap();
    assert_eq!(clamped.per_page, 100);

    let defaulted = repository().paginate(None, &[]).await.unwrap();
    assert_eq!(defaulted.per_page, 15);
    assert_eq!(defaulted.current_page, 1);
}

#[tokio::test]
async fn test_paginate_with_narrows_the_composed_query() {
    let repo = repository().with_params(RequestParams::new().with_expands("author"));

    let page = repo
        .paginate_with(Some(5), &[], |query| {
            query.filter(QueryFilter::eq("posts.id", json!(2)))
        })
        .await
        .unwrap();

    assert_eq!(page.total, 1);
    assert_eq!(page.data[0].title, "World");
    let query = repo.engine().last_query();
    assert_eq!(query.eager_loads(), ["author"]);
    assert_eq!(query.limit_value(), Some(5));
}

#[tokio::test]
async fn test_save_passes_entity_through() {
    let repo = repository();
    let post = repo.fresh_model(&object(json!({"title": "Saved"}))).unwrap();

    assert!(repo.save(&post).await.unwrap());
    assert_eq!(
        repo.engine().writes.lock().unwrap()[0]["title"],
        json!("Saved")
    );
}
