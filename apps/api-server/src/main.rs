//! # Blog API Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod middleware;
mod state;
mod telemetry;

use config::AppConfig;
use middleware::rate_limit::RateLimitMiddleware;
use state::AppState;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    telemetry::init_telemetry(&config.telemetry);

    tracing::info!("Starting Blog API Server on {}:{}", config.host, config.port);

    // The pool is opened once here and cloned into every worker.
    let state = AppState::new(&config).await?;
    let rate_limit = build_rate_limit(&config)?;
    let cors_origins = config.cors_allowed_origins.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::security::security_headers())
            .wrap(middleware::cors::cors(&cors_origins))
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(|cfg| handlers::configure_routes(cfg, rate_limit.clone()))
            .default_service(web::to(handlers::not_found))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}

#[cfg(feature = "rate-limit")]
fn build_rate_limit(config: &AppConfig) -> anyhow::Result<RateLimitMiddleware> {
    use std::sync::Arc;

    use blog_infra::{InMemoryRateLimiter, RateLimitConfig};

    let settings = &config.rate_limit;
    if !settings.enabled {
        tracing::warn!("Rate limiting disabled by configuration");
        return Ok(RateLimitMiddleware::disabled());
    }

    let limiter = InMemoryRateLimiter::new(RateLimitConfig {
        max_requests: settings.max_requests,
        window: settings.window,
    })?;
    tracing::info!(
        max_requests = settings.max_requests,
        window_secs = settings.window.as_secs(),
        "Rate limiting enabled"
    );

    Ok(RateLimitMiddleware::new(
        Arc::new(limiter),
        settings.trust_proxy_headers,
    ))
}

#[cfg(not(feature = "rate-limit"))]
fn build_rate_limit(_config: &AppConfig) -> anyhow::Result<RateLimitMiddleware> {
    tracing::info!("Running without rate-limit feature");
    Ok(RateLimitMiddleware::disabled())
}
