use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::info;
use url::Url;

use crate::config::config;

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Duplicate value: {0}")]
    UniqueViolation(String),

    #[error("Invalid reference: {0}")]
    ForeignKeyViolation(String),

    #[error("Domain hook failed: {0}")]
    Hook(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Map engine-level failures onto the distinguishable cases callers care
/// about (duplicates, dangling references); everything else passes through.
pub(crate) fn classify(err: sqlx::Error) -> DatabaseError {
    if let sqlx::Error::Database(dbe) = &err {
        match dbe.code().as_deref() {
            Some("23505") => {
                return DatabaseError::UniqueViolation(
                    "a record with this value already exists".to_string(),
                )
            }
            Some("23503") => {
                return DatabaseError::ForeignKeyViolation(
                    "referenced record does not exist".to_string(),
                )
            }
            _ => {}
        }
    }
    DatabaseError::Sqlx(err)
}

/// Process-wide lazily initialized connection pool
pub struct DatabaseManager {
    pool: OnceCell<PgPool>,
}

impl DatabaseManager {
    fn instance() -> &'static DatabaseManager {
        use std::sync::OnceLock;
        static INSTANCE: OnceLock<DatabaseManager> = OnceLock::new();
        INSTANCE.get_or_init(|| DatabaseManager { pool: OnceCell::new() })
    }

    /// Get the shared pool, connecting on first use
    pub async fn pool() -> Result<PgPool, DatabaseError> {
        Self::instance().get_pool().await
    }

    async fn get_pool(&self) -> Result<PgPool, DatabaseError> {
        let pool = self
            .pool
            .get_or_try_init(|| async {
                let connection_string = Self::connection_string()?;
                let cfg = &config().database;
                let pool = PgPoolOptions::new()
                    .max_connections(cfg.max_connections)
                    .acquire_timeout(Duration::from_secs(cfg.connect_timeout_secs))
                    .connect(&connection_string)
                    .await?;
                info!("created database pool (max_connections={})", cfg.max_connections);
                Ok::<_, DatabaseError>(pool)
            })
            .await?;
        Ok(pool.clone())
    }

    fn connection_string() -> Result<String, DatabaseError> {
        let raw = std::env::var("DATABASE_URL")
            .map_err(|_| DatabaseError::ConfigMissing("DATABASE_URL"))?;
        let parsed = Url::parse(&raw).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if !matches!(parsed.scheme(), "postgres" | "postgresql") {
            return Err(DatabaseError::InvalidDatabaseUrl);
        }
        Ok(raw)
    }

    /// Cheap connectivity probe for the health endpoint
    pub async fn health_check() -> Result<(), DatabaseError> {
        let pool = Self::pool().await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }
}
