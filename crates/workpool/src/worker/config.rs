//! Worker pool configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::pool::WorkerPoolError;

/// Default executor count when none is configured
pub const DEFAULT_POOL_SIZE: usize = 4;

/// Worker pool configuration
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use workpool::worker::WorkerPoolConfig;
///
/// let config = WorkerPoolConfig::new(8)
///     .with_pool_id("ingest")
///     .with_slow_task_threshold(Duration::from_secs(30));
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkerPoolConfig {
    /// Pool identifier used in logs (generated if not provided)
    pub pool_id: String,

    /// Number of executors, fixed for the lifetime of the pool
    pub size: usize,

    /// Warn when a single task runs longer than this (None = never warn)
    #[serde(with = "option_duration_millis")]
    pub slow_task_threshold: Option<Duration>,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            pool_id: format!("pool-{}", Uuid::now_v7()),
            size: DEFAULT_POOL_SIZE,
            slow_task_threshold: None,
        }
    }
}

impl WorkerPoolConfig {
    /// Create a new configuration with `size` executors
    pub fn new(size: usize) -> Self {
        Self {
            size,
            ..Default::default()
        }
    }

    /// Load configuration from environment variables
    ///
    /// - `WORKPOOL_ID`: pool identifier
    /// - `WORKPOOL_SIZE`: executor count (default: 4)
    /// - `WORKPOOL_SLOW_TASK_MS`: slow task warning threshold in milliseconds
    ///
    /// Unparseable values fall back to the defaults; `validate()` still
    /// rejects an explicit `WORKPOOL_SIZE=0`.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let pool_id = std::env::var("WORKPOOL_ID").unwrap_or(defaults.pool_id);

        let size = std::env::var("WORKPOOL_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.size);

        let slow_task_threshold = std::env::var("WORKPOOL_SLOW_TASK_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_millis);

        Self {
            pool_id,
            size,
            slow_task_threshold,
        }
    }

    /// Set the pool ID
    pub fn with_pool_id(mut self, id: impl Into<String>) -> Self {
        self.pool_id = id.into();
        self
    }

    /// Set the executor count
    ///
    /// Not clamped: a zero size is reported by [`validate`](Self::validate).
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    /// Set the slow task warning threshold
    pub fn with_slow_task_threshold(mut self, threshold: Duration) -> Self {
        self.slow_task_threshold = Some(threshold);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), WorkerPoolError> {
        if self.size == 0 {
            return Err(WorkerPoolError::InvalidSize(self.size));
        }
        if self.pool_id.trim().is_empty() {
            return Err(WorkerPoolError::InvalidConfig(
                "pool_id must not be empty".into(),
            ));
        }
        if self.slow_task_threshold == Some(Duration::ZERO) {
            return Err(WorkerPoolError::InvalidConfig(
                "slow_task_threshold must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Serde support for Option<Duration> as milliseconds
mod option_duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => d.as_millis().serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis: Option<u64> = Option::deserialize(deserializer)?;
        Ok(millis.map(Duration::from_millis))
    }
}
