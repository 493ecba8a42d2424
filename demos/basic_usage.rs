//! # Basic Usage Example
//!
//! Demonstrates request-driven repositories:
//! - Binding entities to tables and declaring relations
//! - Filter and sort overrides registered on a repository definition
//! - Composing queries from a raw query string
//! - Create, find, update, paginate and delete
//!
//! Expects the tables below and a `repohaus.toml` (or `REPOHAUS_CONFIG`):
//!
//! ```sql
//! CREATE TABLE authors (id BIGSERIAL PRIMARY KEY, name TEXT NOT NULL);
//! CREATE TABLE posts (
//!     id BIGSERIAL PRIMARY KEY,
//!     title TEXT NOT NULL,
//!     views BIGINT NOT NULL DEFAULT 0,
//!     author_id BIGINT REFERENCES authors(id),
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT now()
//! );
//! ```

use chrono::{DateTime, Utc};
use repohaus::prelude::*;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub views: i64,
    pub author_id: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing)]
    pub author: Option<Author>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    pub name: String,
}

impl Entity for Post {
    fn table_name() -> &'static str {
        "posts"
    }

    fn fillable() -> &'static [&'static str] {
        &["title", "views", "author_id"]
    }
}

fn payload(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,repository=debug,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load()?;
    let relations = StaticRelations::new()
        .belongs_to("posts", "author", "authors", "author_id", "id")?;
    let repohaus = RepoHaus::new(config, relations, &["posts", "authors"]).await?;
    repohaus.health_check().await?;

    // `filters[popular]=1` has no column behind it; the override gives it meaning
    let definition = RepositoryDefinition::<Post>::new()
        .with_default_expands(["author"])
        .filter_by("popular", |ctx| {
            let threshold = ctx
                .filters
                .get("popular_threshold")
                .and_then(Value::as_i64)
                .unwrap_or(100);
            ctx.query.filter(QueryFilter::gte("posts.views", json!(threshold)))
        })
        .sort_by("recent", |ctx| ctx.query.order_by("posts.created_at", ctx.direction));
    let posts = repohaus.repository(Arc::new(definition))?;

    let created = posts
        .create(&payload(json!({
            "title": "Hello RepoHaus",
            "views": 250,
            "author_id": null,
            "id": 999
        })))
        .await?;
    println!("Created post {:?}: {}", created.id, created.title);

    let params = RequestParams::from_query_str(
        "filters[title]=hello&filters[popular]=1&sorts[recent]=desc&page=1",
    );
    let request = posts.clone().with_params(params);
    println!("Composed query: {:?}", request.get_query().to_select_sql("*"));

    let page = request.paginate(Some(10), &[]).await?;
    println!(
        "Page {}/{}: {} of {} posts",
        page.current_page,
        page.last_page,
        page.data.len(),
        page.total
    );

    if let Some(id) = created.id {
        let renamed = posts
            .update(&payload(json!({"title": "Hello again"})), id)
            .await?;
        println!("Renamed to: {}", renamed.title);

        let found = posts.find(id, &["id", "title"]).await?;
        println!("Found: {:?}", found.map(|post| post.title));

        let deleted = posts.delete(id).await?;
        println!("Deleted: {}", deleted);
    }

    Ok(())
}
