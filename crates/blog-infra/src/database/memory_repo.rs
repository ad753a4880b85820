//! In-memory post repository - used when no database is configured, and in tests.

use std::cmp::Reverse;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use blog_core::domain::{Post, PostChanges};
use blog_core::error::RepoError;
use blog_core::ports::{BaseRepository, PostRepository};
use blog_core::query::{Page, PostQuery};

/// Post store backed by a `HashMap` behind an async `RwLock`.
///
/// Note: Data is lost on process restart.
pub struct InMemoryPostRepository {
    store: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let store = self.store.read().await;
        Ok(store.get(&id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        if store.contains_key(&post.id) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        store.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut store = self.store.write().await;
        store.remove(&id).map(|_| ()).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        let post = store.get_mut(&id).ok_or(RepoError::NotFound)?;
        post.apply(changes, Utc::now());
        Ok(post.clone())
    }

    async fn list(&self, query: &PostQuery) -> Result<Page<Post>, RepoError> {
        // One read guard covers both the count and the page.
        let store = self.store.read().await;

        let mut matching: Vec<&Post> = store
            .values()
            .filter(|post| query.filter.matches(post))
            .collect();
        matching.sort_by_key(|post| Reverse((post.created_at, post.id)));

        let total = matching.len() as u64;
        let offset = usize::try_from(query.pagination.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.pagination.limit()).unwrap_or(usize::MAX);

        let data = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        Ok(Page::new(data, total, query.pagination))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blog_core::domain::NewPost;
    use blog_core::query::{ListParams, ParamMode};
    use chrono::{DateTime, Duration, TimeZone};

    fn new_post(title: &str, author: &str) -> Post {
        Post::new(NewPost {
            title: title.to_string(),
            content: "Body".to_string(),
            author: author.to_string(),
        })
    }

    fn post_at(author: &str, created_at: DateTime<Utc>) -> Post {
        let mut post = new_post("Title", author);
        post.created_at = created_at;
        post.updated_at = created_at;
        post
    }

    fn query(params: ListParams) -> PostQuery {
        PostQuery::from_params(&params, ParamMode::Lenient).unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let repo = InMemoryPostRepository::new();
        let post = repo.insert(new_post("Hello", "Ada")).await.unwrap();

        let found = repo.find_by_id(post.id).await.unwrap();
        assert_eq!(found, Some(post));
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let repo = InMemoryPostRepository::new();
        let post = repo.insert(new_post("Hello", "Ada")).await.unwrap();

        repo.delete(post.id).await.unwrap();
        assert!(matches!(repo.delete(post.id).await, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_update_missing_post() {
        let repo = InMemoryPostRepository::new();
        let result = repo.update(Uuid::new_v4(), PostChanges::default()).await;
        assert!(matches!(result, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_update_keeps_unsupplied_fields() {
        let repo = InMemoryPostRepository::new();
        let post = repo.insert(new_post("Hello", "Ada")).await.unwrap();

        let changes = PostChanges {
            title: Some("Hello again".into()),
            ..Default::default()
        };
        let updated = repo.update(post.id, changes).await.unwrap();

        assert_eq!(updated.title, "Hello again");
        assert_eq!(updated.author, "Ada");
        assert_eq!(updated.created_at, post.created_at);
        assert!(updated.updated_at >= post.updated_at);
    }

    #[tokio::test]
    async fn test_list_second_page() {
        let repo = InMemoryPostRepository::new();
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        for i in 0..15 {
            repo.insert(post_at("Ada", base + Duration::minutes(i)))
                .await
                .unwrap();
        }

        let page = repo
            .list(&query(ListParams {
                page: Some("2".into()),
                page_size: Some("10".into()),
                ..Default::default()
            }))
            .await
            .unwrap();

        assert_eq!(page.data.len(), 5);
        assert_eq!(page.meta.total, 15);
        assert_eq!(page.meta.total_pages, 2);
        // Newest first: the second page holds the five oldest posts.
        assert_eq!(page.data[0].created_at, base + Duration::minutes(4));
        assert_eq!(page.data[4].created_at, base);
    }

    #[tokio::test]
    async fn test_list_filters_by_author_and_day() {
        let repo = InMemoryPostRepository::new();
        let late = Utc.with_ymd_and_hms(2024, 1, 15, 23, 59, 59).unwrap();
        let next = Utc.with_ymd_and_hms(2024, 1, 16, 0, 0, 0).unwrap();
        repo.insert(post_at("Ada", late)).await.unwrap();
        repo.insert(post_at("Ada", next)).await.unwrap();
        repo.insert(post_at("Grace", late)).await.unwrap();

        let page = repo
            .list(&query(ListParams {
                author: Some("ada".into()),
                created_at_date: Some("2024-01-15".into()),
                ..Default::default()
            }))
            .await
            .unwrap();

        assert_eq!(page.meta.total, 1);
        assert_eq!(page.data[0].created_at, late);
        assert_eq!(page.data[0].author, "Ada");
    }

    #[tokio::test]
    async fn test_list_past_the_end() {
        let repo = InMemoryPostRepository::new();
        repo.insert(new_post("Only", "Ada")).await.unwrap();

        let page = repo
            .list(&query(ListParams {
                page: Some("9".into()),
                ..Default::default()
            }))
            .await
            .unwrap();

        assert!(page.data.is_empty());
        assert_eq!(page.meta.total, 1);
        assert_eq!(page.meta.total_pages, 1);
    }
}
