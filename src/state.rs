use std::sync::Arc;
use std::time::{Duration, Instant};

use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::db;

/// Shared per-request context. The pool is opened once at startup and
/// injected into handlers through axum's `State`; nothing else is shared
/// across requests.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub http: reqwest::Client,
    pub started_at: Instant,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = db::connect(&config.database_url).await?;
        // A hung provider must not block a request forever.
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self::from_parts(db, config, http))
    }

    pub fn from_parts(db: SqlitePool, config: Arc<AppConfig>, http: reqwest::Client) -> Self {
        crate::error::set_development(config.is_development());
        Self {
            db,
            config,
            http,
            started_at: Instant::now(),
        }
    }
}
