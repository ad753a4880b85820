//! Application state - shared across all handlers.

use std::sync::Arc;

use blog_core::ports::PostRepository;
use blog_core::query::ParamMode;
use blog_infra::InMemoryPostRepository;

use crate::config::AppConfig;

#[cfg(feature = "postgres")]
use blog_infra::{DatabaseConnections, PostgresPostRepository};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<dyn PostRepository>,
    pub param_mode: ParamMode,
    /// Name of the storage backend, reported by the health check.
    pub storage: &'static str,
}

impl AppState {
    /// Build state around an existing repository.
    pub fn with_repository(
        posts: Arc<dyn PostRepository>,
        param_mode: ParamMode,
        storage: &'static str,
    ) -> Self {
        Self {
            posts,
            param_mode,
            storage,
        }
    }

    /// Build the application state with appropriate implementations.
    ///
    /// The pool is opened once here and shared by every request. A configured
    /// database that cannot be reached is a startup error.
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        #[cfg(feature = "postgres")]
        if let Some(db_config) = &config.database {
            let connections = DatabaseConnections::init(db_config).await?;
            let repo = Arc::new(PostgresPostRepository::new(connections.main));
            tracing::info!("Application state initialized (postgres)");
            return Ok(Self::with_repository(repo, config.param_mode, "postgres"));
        }

        #[cfg(not(feature = "postgres"))]
        if config.database.is_some() {
            tracing::warn!("DATABASE_URL is set but the postgres feature is disabled");
        }

        tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        Ok(Self::with_repository(
            Arc::new(InMemoryPostRepository::new()),
            config.param_mode,
            "memory",
        ))
    }
}
