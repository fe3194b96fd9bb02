//! # dbkeeper: Named Database Connection Registry
//!
//! Process-wide registry of named, pooled database connections. Each entry
//! pairs a live pooled-client handle with the configuration it was opened
//! from, so that an unhealthy connection can be transparently closed and
//! reopened on the next lookup.
//!
//! The registry is an explicit object: the application's composition root
//! constructs one (usually behind an `Arc`) and hands it to whoever needs
//! database access. Tests construct their own independent registries.
//!
//! ```no_run
//! use dbkeeper::{ConnectionRegistry, PoolConfig};
//!
//! # async fn run() -> dbkeeper::RegistryResult<()> {
//! let registry = ConnectionRegistry::postgres();
//! let config = PoolConfig::new("postgres://localhost/app").with_max_open(10);
//! registry.initialize("primary", config).await?;
//!
//! // Every successful get returns a handle that just passed a liveness probe.
//! let db = registry.get("primary").await?;
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod postgres;
pub mod registry;

pub use backend::{DatabaseBackend, DatabasePool, PoolStats};
pub use config::PoolConfig;
pub use error::{PoolError, RegistryError, RegistryResult};
pub use postgres::{PostgresBackend, PostgresPool};
pub use registry::ConnectionRegistry;
