//! Builder for [`WorkerPool`]

use std::sync::Arc;
use std::time::Duration;

use super::config::WorkerPoolConfig;
use super::failure::{FailureHandler, TaskFailure};
use super::pool::{WorkerPool, WorkerPoolError};

/// Builder for a [`WorkerPool`]
///
/// # Example
///
/// ```ignore
/// let pool = WorkerPool::builder()
///     .size(4)
///     .pool_id("reports")
///     .on_failure(|failure| eprintln!("{} failed: {}", failure.task_name, failure.kind))
///     .build()?;
/// ```
#[derive(Default)]
pub struct WorkerPoolBuilder {
    config: WorkerPoolConfig,
    failure_handler: Option<FailureHandler>,
}

impl WorkerPoolBuilder {
    /// Create a builder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: WorkerPoolConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the executor count
    pub fn size(mut self, size: usize) -> Self {
        self.config = self.config.with_size(size);
        self
    }

    /// Set the pool ID
    pub fn pool_id(mut self, id: impl Into<String>) -> Self {
        self.config = self.config.with_pool_id(id);
        self
    }

    /// Warn about tasks running longer than `threshold`
    pub fn slow_task_threshold(mut self, threshold: Duration) -> Self {
        self.config = self.config.with_slow_task_threshold(threshold);
        self
    }

    /// Register a callback invoked for every failed task
    pub fn on_failure<F>(mut self, handler: F) -> Self
    where
        F: Fn(&TaskFailure) + Send + Sync + 'static,
    {
        self.failure_handler = Some(Arc::new(handler));
        self
    }

    /// Validate the configuration and start the executors
    ///
    /// # Errors
    ///
    /// - [`WorkerPoolError::InvalidSize`] / [`WorkerPoolError::InvalidConfig`]
    ///   when validation fails
    /// - [`WorkerPoolError::NoRuntime`] outside a Tokio runtime
    pub fn build(self) -> Result<WorkerPool, WorkerPoolError> {
        WorkerPool::start(self.config, self.failure_handler)
    }
}

impl std::fmt::Debug for WorkerPoolBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPoolBuilder")
            .field("config", &self.config)
            .field("failure_handler", &self.failure_handler.is_some())
            .finish()
    }
}
