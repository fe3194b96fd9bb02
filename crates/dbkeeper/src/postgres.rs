//! PostgreSQL backend implementation over sqlx.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

use crate::backend::{DatabaseBackend, DatabasePool, PoolStats};
use crate::config::PoolConfig;
use crate::error::PoolError;

/// Backend that opens [`PostgresPool`] handles with `PgPoolOptions`.
#[derive(Debug, Default)]
pub struct PostgresBackend;

impl PostgresBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DatabaseBackend for PostgresBackend {
    async fn open(&self, config: &PoolConfig) -> Result<Arc<dyn DatabasePool>, PoolError> {
        let mut options = PgPoolOptions::new().min_connections(config.max_idle);

        // 0 means "leave the driver default in place", matching the
        // config's unlimited/unset convention.
        if config.max_open > 0 {
            options = options.max_connections(config.max_open);
        }

        if let Some(max_lifetime) = config.max_lifetime {
            options = options.max_lifetime(max_lifetime);
        }

        if let Some(max_idle_time) = config.max_idle_time {
            options = options.idle_timeout(max_idle_time);
        }

        let pool = options
            .connect(&config.data_source_url)
            .await
            .map_err(|e| PoolError::Connect(e.to_string()))?;

        tracing::debug!(
            "opened PostgreSQL pool (max_open: {}, max_idle: {})",
            config.max_open,
            config.max_idle
        );
        Ok(Arc::new(PostgresPool { pool }))
    }
}

/// Pooled PostgreSQL handle.
#[derive(Debug)]
pub struct PostgresPool {
    pool: Pool<Postgres>,
}

impl PostgresPool {
    /// The underlying sqlx pool, for callers that need the full driver API.
    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }
}

#[async_trait]
impl DatabasePool for PostgresPool {
    async fn ping(&self) -> Result<(), PoolError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| PoolError::HealthCheck {
                reason: e.to_string(),
            })
    }

    async fn close(&self) -> Result<(), PoolError> {
        // sqlx pool close does not fail; it resolves once the pool's
        // connections have been released.
        self.pool.close().await;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    fn stats(&self) -> PoolStats {
        let total = self.pool.size();
        let idle = self.pool.num_idle() as u32;

        PoolStats {
            total_connections: total,
            idle_connections: idle,
            active_connections: total.saturating_sub(idle),
        }
    }

    async fn execute(&self, sql: &str) -> Result<u64, PoolError> {
        let result = sqlx::query(sql)
            .execute(&self.pool)
            .await
            .map_err(|e| PoolError::Query(e.to_string()))?;

        Ok(result.rows_affected())
    }

    async fn fetch_scalar(&self, sql: &str) -> Result<i64, PoolError> {
        let (value,): (i64,) = sqlx::query_as(sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| PoolError::Query(e.to_string()))?;

        Ok(value)
    }
}
