#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::database::entity::post;
    use crate::database::postgres_repo::PostgresPostRepository;
    use blog_core::domain::{Post, PostChanges};
    use blog_core::error::RepoError;
    use blog_core::ports::{BaseRepository, PostRepository};
    use blog_core::query::{ListParams, ParamMode, PostQuery};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};

    fn model(title: &str, author: &str) -> post::Model {
        let now = chrono::Utc::now();
        post::Model {
            id: uuid::Uuid::new_v4(),
            title: title.to_owned(),
            content: "Content".to_owned(),
            author: author.to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn test_find_post_by_id() {
        let row = model("Test Post", "Ada");
        let post_id = row.id;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![row]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

        let post = result.expect("post should exist");
        assert_eq!(post.title, "Test Post");
        assert_eq!(post.id, post_id);
    }

    #[tokio::test]
    async fn test_insert_returns_stored_post() {
        let row = model("Created", "Ada");
        let post: Post = row.clone().into();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![row]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let saved = repo.insert(post.clone()).await.unwrap();

        assert_eq!(saved, post);
    }

    #[tokio::test]
    async fn test_delete_missing_post() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let result = BaseRepository::<Post, uuid::Uuid>::delete(&repo, uuid::Uuid::new_v4()).await;

        assert!(matches!(result, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_update_returns_updated_row() {
        let mut row = model("Renamed", "Ada");
        row.content = "Edited".to_owned();
        let post_id = row.id;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![row]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let changes = PostChanges {
            title: Some("Renamed".into()),
            content: Some("Edited".into()),
            author: None,
        };
        let updated = repo.update(post_id, changes).await.unwrap();

        assert_eq!(updated.id, post_id);
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.content, "Edited");
    }

    #[tokio::test]
    async fn test_update_missing_post() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<post::Model>::new()])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let result = repo
            .update(uuid::Uuid::new_v4(), PostChanges::default())
            .await;

        assert!(matches!(result, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_list_builds_envelope_from_page_and_count() {
        let rows: Vec<post::Model> = (0..5).map(|i| model(&format!("Post {i}"), "Ada")).collect();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![rows])
            .append_query_results(vec![vec![BTreeMap::from([(
                "num_items",
                Value::BigInt(Some(15)),
            )])]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let params = ListParams {
            page: Some("2".into()),
            page_size: Some("10".into()),
            ..Default::default()
        };
        let query = PostQuery::from_params(&params, ParamMode::Lenient).unwrap();

        let page = repo.list(&query).await.unwrap();

        assert_eq!(page.data.len(), 5);
        assert_eq!(page.meta.total, 15);
        assert_eq!(page.meta.page, 2);
        assert_eq!(page.meta.page_size, 10);
        assert_eq!(page.meta.total_pages, 2);
    }

    #[tokio::test]
    async fn test_list_reads_page_and_count_in_one_transaction() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model("Only", "Ada")]])
            .append_query_results(vec![vec![BTreeMap::from([(
                "num_items",
                Value::BigInt(Some(15)),
            )])]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let params = ListParams {
            page: Some("3".into()),
            page_size: Some("7".into()),
            ..Default::default()
        };
        let query = PostQuery::from_params(&params, ParamMode::Lenient).unwrap();
        repo.list(&query).await.unwrap();

        let log = repo.db.into_transaction_log();
        assert_eq!(log.len(), 1, "{log:?}");

        let statements = format!("{:?}", log[0]);
        let position = |needle: &str| {
            statements
                .find(needle)
                .unwrap_or_else(|| panic!("missing {needle}: {statements}"))
        };
        assert!(position("BEGIN") < position("ORDER BY"));
        assert!(position("ORDER BY") < position("COUNT(*)"));
        assert!(position("COUNT(*)") < position("COMMIT"));
        assert!(statements.contains("BigUnsigned(Some(7))"), "{statements}");
        assert!(statements.contains("BigUnsigned(Some(14))"), "{statements}");
    }
}
