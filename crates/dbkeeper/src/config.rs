//! Pool configuration for named connections.

use std::time::Duration;

/// Configuration a named connection is opened from.
///
/// The registry remembers the config alongside the live handle so it can
/// reopen the connection with identical parameters when a health check
/// fails. Equality is structural; `Default` is the all-empty value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PoolConfig {
    /// Opaque data-source URL, owned by the client library.
    pub data_source_url: String,

    /// Maximum number of open connections in the pool. 0 leaves the
    /// client library's default in place.
    pub max_open: u32,

    /// Maximum number of idle connections held ready.
    pub max_idle: u32,

    /// Maximum lifetime of a single connection. `None` = unlimited.
    pub max_lifetime: Option<Duration>,

    /// Maximum time a connection may sit idle before being closed.
    /// `None` = unlimited.
    pub max_idle_time: Option<Duration>,
}

impl PoolConfig {
    pub fn new(data_source_url: impl Into<String>) -> Self {
        Self {
            data_source_url: data_source_url.into(),
            ..Self::default()
        }
    }

    pub fn with_max_open(mut self, max_open: u32) -> Self {
        self.max_open = max_open;
        self
    }

    pub fn with_max_idle(mut self, max_idle: u32) -> Self {
        self.max_idle = max_idle;
        self
    }

    pub fn with_max_lifetime(mut self, max_lifetime: Duration) -> Self {
        self.max_lifetime = Some(max_lifetime);
        self
    }

    pub fn with_max_idle_time(mut self, max_idle_time: Duration) -> Self {
        self.max_idle_time = Some(max_idle_time);
        self
    }
}
