//! Configuration for the sync engine.

use std::time::Duration;
use uuid::Uuid;

/// Configuration for sync operations.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Remote backend URL, informational for transport bindings.
    pub server_url: String,
    /// Device id, unique per installation.
    pub device_id: Uuid,
    /// Bound on each push/pull call.
    pub request_timeout: Duration,
    /// Bound on the connectivity probe.
    pub ping_timeout: Duration,
    /// Default period for scheduled periodic sync.
    pub sync_interval: Duration,
}

impl SyncConfig {
    /// Creates a configuration with default timeouts.
    pub fn new(server_url: impl Into<String>, device_id: Uuid) -> Self {
        Self {
            server_url: server_url.into(),
            device_id,
            request_timeout: Duration::from_secs(30),
            ping_timeout: Duration::from_secs(5),
            sync_interval: Duration::from_secs(15 * 60),
        }
    }

    /// Sets the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the connectivity probe timeout.
    pub fn with_ping_timeout(mut self, timeout: Duration) -> Self {
        self.ping_timeout = timeout;
        self
    }

    /// Sets the default periodic sync interval.
    pub fn with_sync_interval(mut self, interval: Duration) -> Self {
        self.sync_interval = interval;
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new("", Uuid::nil())
    }
}
