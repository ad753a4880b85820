//! HTTP handlers and route configuration.

mod health;
mod posts;

use actix_web::{HttpResponse, web};
use blog_shared::ErrorResponse;

use crate::middleware::error::AppError;
use crate::middleware::rate_limit::RateLimitMiddleware;

/// Configure all application routes.
///
/// The rate limiter wraps the whole `/api` scope so it runs ahead of any
/// handler.
pub fn configure_routes(cfg: &mut web::ServiceConfig, rate_limit: RateLimitMiddleware) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .service(
        web::scope("/api")
            .wrap(rate_limit)
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/blogs")
                    .route("", web::get().to(posts::list_posts))
                    .route("", web::post().to(posts::create_post))
                    .route("/{id}", web::get().to(posts::get_post))
                    .route("/{id}", web::put().to(posts::update_post))
                    .route("/{id}", web::delete().to(posts::delete_post)),
            ),
    );
}

/// Fallback for unknown routes.
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::not_found("Route not found"))
}
