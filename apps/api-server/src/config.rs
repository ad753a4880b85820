//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use blog_core::query::ParamMode;
use blog_infra::database::DatabaseConfig;

use crate::telemetry::TelemetryConfig;

const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    /// Origins allowed to call the API. `*` allows any origin.
    pub cors_allowed_origins: Vec<String>,
    pub rate_limit: RateLimitSettings,
    /// How malformed list parameters are handled.
    pub param_mode: ParamMode,
    pub telemetry: TelemetryConfig,
}

/// Per-client request quota.
#[derive(Debug, Clone)]
pub struct RateLimitSettings {
    pub enabled: bool,
    pub max_requests: u32,
    pub window: Duration,
    /// Key clients by `Forwarded`/`X-Forwarded-For` instead of the socket peer.
    pub trust_proxy_headers: bool,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let database = lookup("DATABASE_URL")
            .filter(|url| !url.is_empty())
            .map(|url| {
                let mut config = DatabaseConfig::new(url);
                config.max_connections = parsed(&lookup, "DB_MAX_CONNECTIONS", 100);
                config.min_connections = parsed(&lookup, "DB_MIN_CONNECTIONS", 10);
                config
            });

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(String::from)
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty())
            .unwrap_or_else(|| vec![DEFAULT_CORS_ORIGIN.to_string()]);

        let rate_limit = RateLimitSettings {
            enabled: flag(&lookup, "RATE_LIMIT_ENABLED", true),
            max_requests: parsed(&lookup, "RATE_LIMIT_MAX_REQUESTS", 100),
            window: Duration::from_secs(parsed(&lookup, "RATE_LIMIT_WINDOW_SECS", 15 * 60)),
            trust_proxy_headers: flag(&lookup, "TRUST_PROXY_HEADERS", false),
        };

        let param_mode = if flag(&lookup, "STRICT_QUERY_PARAMS", false) {
            ParamMode::Strict
        } else {
            ParamMode::Lenient
        };

        Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parsed(&lookup, "PORT", 8080),
            database,
            cors_allowed_origins,
            rate_limit,
            param_mode,
            telemetry: TelemetryConfig::from_lookup(&lookup),
        }
    }
}

/// Parse a variable, falling back to `default` when absent or malformed.
fn parsed<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Read a boolean flag. `false`, `0`, `no` and `off` disable it.
fn flag<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| !matches!(v.trim().to_lowercase().as_str(), "false" | "0" | "no" | "off"))
        .unwrap_or(default)
}
