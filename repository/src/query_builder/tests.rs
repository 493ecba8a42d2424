//! Query builder tests

#[cfg(test)]
mod tests {
    use crate::query_builder::filter::escape_like;
    use crate::query_builder::sql_generation::SqlGenerator;
    use crate::query_builder::{QueryBuilder, QueryFilter, QueryOperator, SortOrder};
    use serde_json::json;

    // ========================================
    // QueryFilter Edge Cases
    // ========================================

    #[test]
    fn test_contains_escapes_like_metacharacters() {
        assert_eq!(escape_like("ann"), "ann");
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");

        let filter = QueryFilter::contains("authors.name", "50%");
        assert_eq!(
            filter,
            QueryFilter::ilike("authors.name", "%50\\%%")
        );
    }

    #[test]
    fn test_contains_renders_ilike() {
        let filter = QueryFilter::contains("posts.title", "ann");
        let (where_clause, values) = SqlGenerator::build_where_clause(&[filter]);

        assert_eq!(where_clause, "WHERE posts.title ILIKE $1");
        assert_eq!(values, vec![json!("%ann%")]);
    }

    // ========================================
    // SQL Generation Edge Cases
    // ========================================

    #[test]
    fn test_sql_generation_empty_conditions() {
        let (where_clause, values) = SqlGenerator::build_where_clause(&[]);
        assert_eq!(where_clause, "");
        assert!(values.is_empty());
    }

    #[test]
    fn test_sql_generation_empty_arrays() {
        let filter = QueryFilter::in_values("status", vec![]);
        let (where_clause, values) = SqlGenerator::build_where_clause(&[filter]);
        assert!(where_clause.contains("1=0"));
        assert!(values.is_empty());

        let filter = QueryFilter::not_in_values("type", vec![]);
        let (where_clause, values) = SqlGenerator::build_where_clause(&[filter]);
        assert!(where_clause.contains("1=1"));
        assert!(values.is_empty());
    }

    #[test]
    fn test_sql_generation_null_conditions() {
        let (where_clause, values) =
            SqlGenerator::build_where_clause(&[QueryFilter::is_null("posts.deleted_at")]);
        assert_eq!(where_clause, "WHERE posts.deleted_at IS NULL");
        assert!(values.is_empty());

        let filter = QueryFilter::condition("posts.amount", QueryOperator::Gt, None);
        let (where_clause, values) = SqlGenerator::build_where_clause(&[filter]);
        assert!(where_clause.contains("1=0"));
        assert!(values.is_empty());
    }

    #[test]
    fn test_sql_generation_nested_groups_and_numbering() {
        let filters = vec![
            QueryFilter::eq("posts.author_id", json!(3)),
            QueryFilter::or(vec![
                QueryFilter::eq("posts.status", json!("draft")),
                QueryFilter::in_values("posts.status", vec![json!("review"), json!("live")]),
            ]),
            QueryFilter::gte("posts.views", json!(10)),
        ];

        let (where_clause, values) = SqlGenerator::build_where_clause(&filters);

        assert_eq!(
            where_clause,
            "WHERE posts.author_id = $1 AND (posts.status = $2 OR posts.status IN ($3, $4)) AND posts.views >= $5"
        );
        assert_eq!(values.len(), 5);
    }

    #[test]
    fn test_empty_group_is_dropped() {
        let filters = vec![
            QueryFilter::and(vec![]),
            QueryFilter::eq("posts.id", json!(1)),
        ];
        let (where_clause, _) = SqlGenerator::build_where_clause(&filters);
        assert_eq!(where_clause, "WHERE posts.id = $1");
    }

    #[test]
    fn test_order_clause_generation() {
        assert_eq!(SqlGenerator::build_order_clause(&[]), "");

        let orders = vec![
            ("posts.priority".to_string(), SortOrder::Desc),
            ("posts.name".to_string(), SortOrder::Asc),
        ];
        assert_eq!(
            SqlGenerator::build_order_clause(&orders),
            "ORDER BY posts.priority DESC, posts.name ASC"
        );
    }

    // ========================================
    // QueryBuilder
    // ========================================

    #[test]
    fn test_query_builder_empty_state() {
        let builder = QueryBuilder::new("posts");
        let (where_clause, order_clause, limit_clause, values) = builder.build();

        assert_eq!(where_clause, "");
        assert_eq!(order_clause, "");
        assert_eq!(limit_clause, "");
        assert!(values.is_empty());
        assert_eq!(builder.to_select_sql("*").0, "SELECT * FROM posts");
    }

    #[test]
    fn test_select_with_joins_filters_order_and_window() {
        let builder = QueryBuilder::new("posts")
            .left_join("authors", "authors.id", "posts.author_id")
            .filter(QueryFilter::contains("authors.name", "jane"))
            .order_by("posts.created_at", SortOrder::Desc)
            .limit(15)
            .offset(30);

        let (sql, values) = builder.to_select_sql("to_jsonb(posts.*) AS record");

        assert_eq!(
            sql,
            "SELECT to_jsonb(posts.*) AS record FROM posts \
             LEFT JOIN authors ON authors.id = posts.author_id \
             WHERE authors.name ILIKE $1 \
             ORDER BY posts.created_at DESC LIMIT 15 OFFSET 30"
        );
        assert_eq!(values, vec![json!("%jane%")]);
    }

    #[test]
    fn test_count_and_exists_ignore_window() {
        let builder = QueryBuilder::new("posts")
            .filter(QueryFilter::eq("posts.published", json!(true)))
            .order_by("posts.id", SortOrder::Asc)
            .limit(5);

        let (count_sql, count_values) = builder.to_count_sql();
        assert_eq!(
            count_sql,
            "SELECT COUNT(*) AS total FROM posts WHERE posts.published = $1"
        );
        assert_eq!(count_values, vec![json!(true)]);

        let (exists_sql, _) = builder.to_exists_sql();
        assert_eq!(
            exists_sql,
            "SELECT EXISTS(SELECT 1 FROM posts WHERE posts.published = $1)"
        );
    }

    #[test]
    fn test_eager_loads_are_deduplicated() {
        let builder = QueryBuilder::new("posts")
            .with(["author", "comments"])
            .with(vec!["author".to_string()]);

        assert_eq!(builder.eager_loads(), ["author", "comments"]);
        // eager loads never change the SQL of the base query
        assert_eq!(builder.to_select_sql("*").0, "SELECT * FROM posts");
    }

    #[test]
    fn test_has_join() {
        let builder = QueryBuilder::new("posts").left_join("authors", "authors.id", "posts.author_id");
        assert!(builder.has_join("authors"));
        assert!(!builder.has_join("comments"));
    }

    #[test]
    fn test_query_builder_method_chaining_order() {
        let builder1 = QueryBuilder::new("posts")
            .filter(QueryFilter::eq("posts.name", json!("test")))
            .order_by("posts.created_at", SortOrder::Desc)
            .limit(10)
            .offset(5);

        let builder2 = QueryBuilder::new("posts")
            .limit(10)
            .filter(QueryFilter::eq("posts.name", json!("test")))
            .offset(5)
            .order_by("posts.created_at", SortOrder::Desc);

        assert_eq!(builder1.build(), builder2.build());
    }
}
