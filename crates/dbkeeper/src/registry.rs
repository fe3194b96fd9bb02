//! Named connection registry.
//!
//! Maps logical names to live pooled handles and the configurations they
//! were opened from. Lookup health-checks the handle and transparently
//! closes and reopens it from the remembered configuration when the probe
//! fails, so callers never have to detect staleness themselves.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::backend::{DatabaseBackend, DatabasePool, PoolStats};
use crate::config::PoolConfig;
use crate::error::{PoolError, RegistryError, RegistryResult};
use crate::postgres::PostgresBackend;

/// Both maps live behind the registry's single lock, so an entry is
/// present in `connections` iff its config is present in `configs`
/// (configs outlive a closed connection only transiently, mid-reconnect).
struct RegistryInner {
    connections: HashMap<String, Arc<dyn DatabasePool>>,
    configs: HashMap<String, PoolConfig>,
}

/// Registry of named database connections.
///
/// Construct one at the application's composition root and share it via
/// `Arc`; there is deliberately no process-global instance. All operations
/// take `&self` and are safe to call from any number of tasks.
pub struct ConnectionRegistry {
    backend: Arc<dyn DatabaseBackend>,
    inner: Mutex<RegistryInner>,
}

impl ConnectionRegistry {
    /// Registry over an arbitrary backend. Tests pass a mock here.
    pub fn new(backend: Arc<dyn DatabaseBackend>) -> Self {
        Self {
            backend,
            inner: Mutex::new(RegistryInner {
                connections: HashMap::new(),
                configs: HashMap::new(),
            }),
        }
    }

    /// Registry over the shipped sqlx/PostgreSQL backend.
    pub fn postgres() -> Self {
        Self::new(Arc::new(PostgresBackend::new()))
    }

    /// Open and register a named connection.
    ///
    /// Idempotent: a name that already maps to a live entry is a no-op
    /// success, so multiple callers (or restarts) may initialize the same
    /// name safely. On any failure the registry is left unchanged.
    ///
    /// The lock is held across the open and the initial probe, so
    /// concurrent initializes for one name serialize and exactly one
    /// stores an entry.
    pub async fn initialize(&self, name: &str, config: PoolConfig) -> RegistryResult<()> {
        let mut inner = self.inner.lock().await;

        if inner.connections.contains_key(name) {
            tracing::debug!("connection '{}' already exists, skipping initialization", name);
            return Ok(());
        }

        let pool = self
            .backend
            .open(&config)
            .await
            .map_err(|source| RegistryError::Init {
                name: name.to_string(),
                source,
            })?;

        // A pool that cannot answer its first probe is never stored.
        if let Err(source) = pool.ping().await {
            if let Err(close_err) = pool.close().await {
                tracing::warn!(
                    "failed to close pool for '{}' after failed initial probe: {}",
                    name,
                    close_err
                );
            }
            return Err(RegistryError::Init {
                name: name.to_string(),
                source,
            });
        }

        inner.connections.insert(name.to_string(), pool);
        inner.configs.insert(name.to_string(), config);
        tracing::info!("connection '{}' initialized", name);
        Ok(())
    }

    /// Fetch a named connection, probing its liveness first.
    ///
    /// Returns either a handle that just passed a ping or a descriptive
    /// error. An unhealthy handle is closed and reopened from the
    /// remembered configuration before being returned.
    pub async fn get(&self, name: &str) -> RegistryResult<Arc<dyn DatabasePool>> {
        // Snapshot under lock; the probe is a network round-trip and must
        // not block other registry operations.
        let (pool, config) = {
            let inner = self.inner.lock().await;
            (
                inner.connections.get(name).cloned(),
                inner.configs.get(name).cloned(),
            )
        };

        let Some(pool) = pool else {
            return Err(RegistryError::NotFound {
                name: name.to_string(),
            });
        };

        match pool.ping().await {
            Ok(()) => Ok(pool),
            Err(err) => {
                tracing::warn!(
                    "connection '{}' is unhealthy ({}), attempting to reconnect",
                    name,
                    err
                );

                let Some(config) = config else {
                    return Err(RegistryError::MissingConfig {
                        name: name.to_string(),
                    });
                };

                self.reconnect(name, config).await
            }
        }
    }

    /// Replace an unhealthy entry: evict it, re-initialize from the
    /// remembered config, and hand back the fresh handle.
    ///
    /// The pre-probe snapshot is never trusted; each step re-derives state
    /// from the maps, which makes the window between `get`'s unlock and
    /// its probe tolerable. On failure the name ends up absent from the
    /// registry, so a later `get`/`initialize` starts clean.
    async fn reconnect(
        &self,
        name: &str,
        config: PoolConfig,
    ) -> RegistryResult<Arc<dyn DatabasePool>> {
        match self.close(name).await {
            Ok(()) => {}
            // Another task already removed the entry; that is the state
            // the eviction was meant to reach.
            Err(RegistryError::NotFound { .. }) => {}
            Err(err) => {
                // The stale entry must not survive a failed eviction.
                let mut inner = self.inner.lock().await;
                inner.connections.remove(name);
                inner.configs.remove(name);
                return Err(RegistryError::Reconnect {
                    name: name.to_string(),
                    source: Box::new(err),
                });
            }
        }

        self.initialize(name, config)
            .await
            .map_err(|err| RegistryError::Reconnect {
                name: name.to_string(),
                source: Box::new(err),
            })?;

        let inner = self.inner.lock().await;
        inner
            .connections
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::Reconnect {
                name: name.to_string(),
                source: Box::new(RegistryError::NotFound {
                    name: name.to_string(),
                }),
            })
    }

    /// Close a named connection and forget its configuration.
    ///
    /// If the underlying close fails the entry is left untouched and the
    /// error surfaces to the caller.
    pub async fn close(&self, name: &str) -> RegistryResult<()> {
        let mut inner = self.inner.lock().await;

        let Some(pool) = inner.connections.get(name).cloned() else {
            return Err(RegistryError::NotFound {
                name: name.to_string(),
            });
        };

        pool.close()
            .await
            .map_err(|source| RegistryError::Close {
                name: name.to_string(),
                source,
            })?;

        inner.connections.remove(name);
        inner.configs.remove(name);
        tracing::info!("connection '{}' closed and config removed", name);
        Ok(())
    }

    /// Close every registered connection and clear all bookkeeping.
    ///
    /// Best-effort drain: individual close failures are logged, never
    /// raised, and the entry is dropped from bookkeeping regardless. A
    /// handle whose close truly failed may keep its resources until
    /// process exit.
    pub async fn close_all(&self) {
        let mut inner = self.inner.lock().await;

        for (name, pool) in &inner.connections {
            match pool.close().await {
                Ok(()) => tracing::debug!("connection '{}' closed", name),
                Err(err) => tracing::warn!("failed to close connection '{}': {}", name, err),
            }
        }

        inner.connections = HashMap::new();
        inner.configs = HashMap::new();
    }

    /// Names of entries whose handle is currently obtainable.
    ///
    /// Presence check only: a listed connection is not guaranteed to
    /// answer a ping. Use [`ConnectionRegistry::health_check_all`] for
    /// liveness.
    pub async fn names(&self) -> Vec<String> {
        let inner = self.inner.lock().await;
        let mut names: Vec<String> = inner
            .connections
            .iter()
            .filter(|(_, pool)| !pool.is_closed())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// The stored configuration for a name, or `None` if the name was
    /// never initialized (or has been closed).
    pub async fn config(&self, name: &str) -> Option<PoolConfig> {
        let inner = self.inner.lock().await;
        inner.configs.get(name).cloned()
    }

    /// Connection counts for one named pool.
    pub async fn stats(&self, name: &str) -> RegistryResult<PoolStats> {
        let inner = self.inner.lock().await;
        inner
            .connections
            .get(name)
            .map(|pool| pool.stats())
            .ok_or_else(|| RegistryError::NotFound {
                name: name.to_string(),
            })
    }

    /// Connection counts for every registered pool.
    pub async fn stats_all(&self) -> HashMap<String, PoolStats> {
        let inner = self.inner.lock().await;
        inner
            .connections
            .iter()
            .map(|(name, pool)| (name.clone(), pool.stats()))
            .collect()
    }

    /// Ping every registered pool, reporting per-name round-trip time or
    /// the probe error. Probes run outside the lock.
    pub async fn health_check_all(&self) -> HashMap<String, Result<Duration, PoolError>> {
        let pools: Vec<(String, Arc<dyn DatabasePool>)> = {
            let inner = self.inner.lock().await;
            inner
                .connections
                .iter()
                .map(|(name, pool)| (name.clone(), pool.clone()))
                .collect()
        };

        let mut results = HashMap::new();
        for (name, pool) in pools {
            let start = Instant::now();
            let result = pool.ping().await.map(|()| start.elapsed());
            results.insert(name, result);
        }
        results
    }
}
