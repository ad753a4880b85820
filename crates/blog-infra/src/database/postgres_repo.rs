//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Expr, LikeExpr};
use sea_orm::{
    AccessMode, ColumnTrait, Condition, EntityTrait, IsolationLevel, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, TransactionTrait,
};
use uuid::Uuid;

use blog_core::domain::{Post, PostChanges};
use blog_core::error::RepoError;
use blog_core::ports::PostRepository;
use blog_core::query::{Page, PostFilter, PostQuery};

use super::entity::post::{self, Entity as PostEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// Escape LIKE metacharacters so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Build the `WHERE` clause shared by the page query and the count query.
pub(crate) fn filter_condition(filter: &PostFilter) -> Condition {
    let mut condition = Condition::all();

    if let Some(author) = &filter.author {
        let pattern = format!("%{}%", escape_like(author));
        condition = condition.add(
            Expr::col((PostEntity, post::Column::Author))
                .ilike(LikeExpr::new(pattern).escape('\\')),
        );
    }

    if let Some(range) = filter.created_on {
        condition = condition
            .add(post::Column::CreatedAt.gte(range.start))
            .add(post::Column::CreatedAt.lt(range.end));
    }

    if let Some(range) = filter.updated_on {
        condition = condition
            .add(post::Column::UpdatedAt.gte(range.start))
            .add(post::Column::UpdatedAt.lt(range.end));
    }

    condition
}

/// Newest-first page of posts matching the query.
fn page_select(query: &PostQuery) -> Select<PostEntity> {
    PostEntity::find()
        .filter(filter_condition(&query.filter))
        .order_by_desc(post::Column::CreatedAt)
        .order_by_desc(post::Column::Id)
        .offset(query.pagination.offset())
        .limit(query.pagination.limit())
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Post, RepoError> {
        tracing::debug!(post_id = %id, "Updating post");

        let now: DateTimeWithTimeZone = Utc::now().into();
        let mut statement = PostEntity::update_many()
            .col_expr(post::Column::UpdatedAt, Expr::value(now))
            .filter(post::Column::Id.eq(id));

        if let Some(title) = changes.title {
            statement = statement.col_expr(post::Column::Title, Expr::value(title));
        }
        if let Some(content) = changes.content {
            statement = statement.col_expr(post::Column::Content, Expr::value(content));
        }
        if let Some(author) = changes.author {
            statement = statement.col_expr(post::Column::Author, Expr::value(author));
        }

        let updated = statement
            .exec_with_returning(&self.db)
            .await
            .map_err(map_db_err)?;

        updated
            .into_iter()
            .next()
            .map(Into::into)
            .ok_or(RepoError::NotFound)
    }

    async fn list(&self, query: &PostQuery) -> Result<Page<Post>, RepoError> {
        tracing::debug!(
            page = query.pagination.page,
            page_size = query.pagination.page_size,
            filtered = !query.filter.is_empty(),
            "Listing posts"
        );

        // Both reads share one snapshot so `total` agrees with `data`.
        let txn = self
            .db
            .begin_with_config(
                Some(IsolationLevel::RepeatableRead),
                Some(AccessMode::ReadOnly),
            )
            .await
            .map_err(map_db_err)?;

        let rows = page_select(query)
            .all(&txn)
            .await
            .map_err(map_db_err)?;

        let total = PostEntity::find()
            .filter(filter_condition(&query.filter))
            .count(&txn)
            .await
            .map_err(map_db_err)?;

        txn.commit().await.map_err(map_db_err)?;

        Ok(Page::new(
            rows.into_iter().map(Into::into).collect(),
            total,
            query.pagination,
        ))
    }
}
