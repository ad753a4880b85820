//! Blog post handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use blog_core::domain::{NewPost, Post, PostChanges};
use blog_core::query::{ListParams, PostQuery};
use blog_shared::dto::{CreatePostRequest, UpdatePostRequest};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// A path segment that is not a UUID cannot name a post.
fn parse_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::post_not_found())
}

/// POST /api/blogs
pub async fn create_post(
    state: web::Data<AppState>,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let input = NewPost::validate(req.title, req.content, req.author)?;

    let post = state.posts.insert(Post::new(input)).await?;
    tracing::info!(post_id = %post.id, "Post created");

    Ok(HttpResponse::Created().json(post))
}

/// GET /api/blogs?page&pageSize&author&createdAtDate&updatedAtDate
pub async fn list_posts(
    state: web::Data<AppState>,
    params: web::Query<Vec<(String, String)>>,
) -> AppResult<HttpResponse> {
    let params = ListParams::from_pairs(params.into_inner());
    let query = PostQuery::from_params(&params, state.param_mode)?;
    let page = state.posts.list(&query).await?;

    Ok(HttpResponse::Ok().json(page))
}

/// GET /api/blogs/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    let post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(AppError::post_not_found)?;

    Ok(HttpResponse::Ok().json(post))
}

/// PUT /api/blogs/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let changes = PostChanges::validate(req.title, req.content, req.author)?;
    let id = parse_id(&path)?;

    let post = state.posts.update(id, changes).await?;
    tracing::info!(post_id = %post.id, "Post updated");

    Ok(HttpResponse::Ok().json(post))
}

/// DELETE /api/blogs/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    state.posts.delete(id).await?;
    tracing::info!(post_id = %id, "Post deleted");

    Ok(HttpResponse::NoContent().finish())
}
