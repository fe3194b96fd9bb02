//! Error types for backend and registry operations.

/// Result type alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors surfaced by the pooled-client backend.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("health check failed: {reason}")]
    HealthCheck { reason: String },

    #[error("close failed: {0}")]
    Close(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("pool is closed")]
    PoolClosed,
}

/// Errors surfaced by registry operations.
///
/// Every variant carries the connection name; variants wrapping a lower
/// level failure keep it reachable through `std::error::Error::source`.
/// Re-initializing an existing name is not an error: `initialize` treats
/// it as a no-op success.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("connection '{name}' does not exist")]
    NotFound { name: String },

    #[error("no configuration recorded to reconnect connection '{name}'")]
    MissingConfig { name: String },

    #[error("failed to initialize connection '{name}': {source}")]
    Init {
        name: String,
        #[source]
        source: PoolError,
    },

    #[error("failed to reconnect connection '{name}': {source}")]
    Reconnect {
        name: String,
        #[source]
        source: Box<RegistryError>,
    },

    #[error("failed to close connection '{name}': {source}")]
    Close {
        name: String,
        #[source]
        source: PoolError,
    },
}
