//! Database backend abstraction.
//!
//! The registry talks to the underlying client library through these two
//! traits and nothing else: a backend opens pooled handles, a handle can
//! be probed, queried, and closed. Everything database-specific lives
//! behind the seam (see [`crate::postgres`] for the shipped sqlx
//! implementation).

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::PoolConfig;
use crate::error::PoolError;

/// Snapshot of a pool's connection counts.
#[derive(Debug, Clone)]
pub struct PoolStats {
    pub total_connections: u32,
    pub idle_connections: u32,
    pub active_connections: u32,
}

/// Abstract pooled-client handle.
#[async_trait]
pub trait DatabasePool: Send + Sync + std::fmt::Debug {
    /// Liveness probe: a lightweight round-trip confirming the handle can
    /// currently serve queries.
    async fn ping(&self) -> Result<(), PoolError>;

    /// Close the underlying pooled client.
    async fn close(&self) -> Result<(), PoolError>;

    /// Whether the handle has been closed. Not a liveness check: an open
    /// handle may still fail its next ping.
    fn is_closed(&self) -> bool;

    /// Current connection counts.
    fn stats(&self) -> PoolStats;

    /// Execute a statement, returning the affected row count.
    async fn execute(&self, sql: &str) -> Result<u64, PoolError>;

    /// Run a query returning a single 64-bit integer column, for
    /// diagnostics such as `SELECT COUNT(*)`.
    async fn fetch_scalar(&self, sql: &str) -> Result<i64, PoolError>;
}

/// Opens pooled handles against a data source.
#[async_trait]
pub trait DatabaseBackend: Send + Sync {
    /// Open a pool against the config's data-source URL with the config's
    /// sizing and timing parameters applied.
    async fn open(&self, config: &PoolConfig) -> Result<Arc<dyn DatabasePool>, PoolError>;
}
