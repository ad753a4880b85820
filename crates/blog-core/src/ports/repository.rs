use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Post, PostChanges};
use crate::error::RepoError;
use crate::query::{Page, PostQuery};

/// Generic repository trait defining the identity-keyed operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Persist a new entity and return it as stored.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID. Returns `RepoError::NotFound` if nothing was removed.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Apply `changes` and bump `updated_at` in one statement.
    /// Returns `RepoError::NotFound` if the post does not exist.
    async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Post, RepoError>;

    /// Fetch one page of posts newest-first, with the total number of matches.
    ///
    /// The page and the count observe the same filter and the same snapshot.
    async fn list(&self, query: &PostQuery) -> Result<Page<Post>, RepoError>;
}
