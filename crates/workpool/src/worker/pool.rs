//! Worker pool for task execution
//!
//! Owns a fixed set of executors, hands submitted tasks to whichever one is
//! idle, and drains them on shutdown.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::builder::WorkerPoolBuilder;
use super::config::WorkerPoolConfig;
use super::executor::{Executor, ExecutorShared};
use super::failure::FailureHandler;
use super::intake::{intake, IntakeSender};
use super::stats::{PoolCounters, PoolStats};
use crate::task::Task;

/// Worker pool status
///
/// Transitions are one-directional: `Open -> Draining -> Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerPoolStatus {
    /// Accepting submissions, executors running
    Open,
    /// Intake closed, executors finishing queued and in-flight tasks
    Draining,
    /// Every executor has exited
    Closed,
}

impl std::fmt::Display for WorkerPoolStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WorkerPoolStatus::Open => "open",
            WorkerPoolStatus::Draining => "draining",
            WorkerPoolStatus::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Worker pool errors
#[derive(Debug, thiserror::Error)]
pub enum WorkerPoolError {
    /// Executor count must be positive
    #[error("worker pool size must be at least 1 (got {0})")]
    InvalidSize(usize),

    /// Other configuration problem
    #[error("invalid worker pool configuration: {0}")]
    InvalidConfig(String),

    /// Executors need a Tokio runtime to be spawned on
    #[error("worker pool must be created inside a Tokio runtime")]
    NoRuntime,

    /// Submission after shutdown began
    #[error("worker pool is not accepting tasks (status: {0})")]
    NotAccepting(WorkerPoolStatus),

    /// Every executor vanished before accepting the task
    #[error("worker pool executors are gone, task was not accepted")]
    ExecutorsGone,

    /// Bounded shutdown gave up waiting
    #[error("graceful shutdown timed out ({busy_executors} executors still busy)")]
    ShutdownTimeout {
        /// Executors that had not exited yet
        busy_executors: usize,
    },
}

/// Bounded worker pool
///
/// Exactly `size` executors are spawned at construction. `submit` blocks
/// until an executor accepts the task, so at most `size` tasks run at once
/// and excess submitters wait instead of queueing without bound.
///
/// Task failures (errors and panics) are isolated per task: they are logged,
/// counted and passed to the failure handler, and the executor keeps
/// serving. A task that never finishes occupies its executor for good; the
/// pool does not cancel or time out tasks.
///
/// # Example
///
/// ```ignore
/// use workpool::prelude::*;
///
/// let pool = WorkerPool::new(2)?;
///
/// pool.submit(task_fn("greet", || async {
///     tracing::info!("hello");
///     Ok(())
/// }))
/// .await?;
///
/// // Closes the intake and waits for every executor to drain
/// pool.shutdown().await;
/// ```
pub struct WorkerPool {
    config: WorkerPoolConfig,
    intake: Mutex<Option<IntakeSender>>,
    status_tx: watch::Sender<WorkerPoolStatus>,
    executors: TaskTracker,
    counters: Arc<PoolCounters>,
}

impl WorkerPool {
    /// Create a pool with `size` executors and default settings
    ///
    /// Must be called inside a Tokio runtime.
    pub fn new(size: usize) -> Result<Self, WorkerPoolError> {
        Self::builder().size(size).build()
    }

    /// Create a pool from a configuration
    pub fn with_config(config: WorkerPoolConfig) -> Result<Self, WorkerPoolError> {
        Self::builder().config(config).build()
    }

    /// Start building a pool
    pub fn builder() -> WorkerPoolBuilder {
        WorkerPoolBuilder::new()
    }

    /// Validate the configuration and spawn the executors
    pub(crate) fn start(
        config: WorkerPoolConfig,
        failure_handler: Option<FailureHandler>,
    ) -> Result<Self, WorkerPoolError> {
        config.validate()?;
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| WorkerPoolError::NoRuntime)?;

        let (sender, receiver) = intake();
        let counters = Arc::new(PoolCounters::new());
        let shared = Arc::new(ExecutorShared {
            pool_id: config.pool_id.clone(),
            intake: receiver,
            counters: Arc::clone(&counters),
            failure_handler,
            slow_task_threshold: config.slow_task_threshold,
        });

        let executors = TaskTracker::new();
        for id in 0..config.size {
            executors.spawn_on(Executor::new(id, Arc::clone(&shared)).run(), &runtime);
        }
        // No executor is added after construction
        executors.close();

        let (status_tx, _) = watch::channel(WorkerPoolStatus::Open);

        info!(
            pool_id = %config.pool_id,
            size = config.size,
            slow_task_threshold_ms = config.slow_task_threshold.map(|d| d.as_millis() as u64),
            "Worker pool started"
        );

        Ok(Self {
            config,
            intake: Mutex::new(Some(sender)),
            status_tx,
            executors,
            counters,
        })
    }

    /// Submit a task
    ///
    /// Waits until an executor accepts the task and returns the ID assigned
    /// to it. The ID shows up in logs and in failure reports.
    ///
    /// Ordering is only guaranteed between one submitter and a single
    /// executor; with several executors, tasks race to whichever is idle.
    ///
    /// # Errors
    ///
    /// [`WorkerPoolError::NotAccepting`] once shutdown has begun.
    pub async fn submit<T: Task>(&self, task: T) -> Result<Uuid, WorkerPoolError> {
        self.submit_boxed(Box::new(task)).await
    }

    /// Submit an already boxed task
    #[instrument(skip(self, task), fields(pool_id = %self.config.pool_id, task = task.name()))]
    pub async fn submit_boxed(&self, task: Box<dyn Task>) -> Result<Uuid, WorkerPoolError> {
        // Cloned under the lock; a clone taken before shutdown keeps the
        // intake open until this hand-off completes.
        let sender = self.intake.lock().clone();
        let Some(sender) = sender else {
            self.counters.task_rejected();
            let status = self.status();
            warn!(%status, "Rejected task submitted after shutdown began");
            return Err(WorkerPoolError::NotAccepting(status));
        };

        let task_id = Uuid::now_v7();
        if sender.hand_off(task_id, task).await.is_err() {
            error!(%task_id, "No executor left to accept task");
            return Err(WorkerPoolError::ExecutorsGone);
        }

        debug!(%task_id, "Task accepted by executor");
        Ok(task_id)
    }

    /// Shut the pool down gracefully
    ///
    /// Closes the intake, then waits until every executor has finished its
    /// current task and exited. Tasks already accepted always run.
    ///
    /// Safe to call more than once and from several callers at the same
    /// time: only the first call closes the intake, and every call returns
    /// once the pool is closed.
    ///
    /// Calling this from inside a task running on the same pool deadlocks,
    /// since the calling executor waits for itself.
    #[instrument(skip(self), fields(pool_id = %self.config.pool_id))]
    pub async fn shutdown(&self) {
        self.close_intake();
        self.executors.wait().await;
        self.mark_closed();
    }

    /// Shut down, waiting at most `timeout` for executors to drain
    ///
    /// On timeout the pool stays [`Draining`](WorkerPoolStatus::Draining);
    /// running tasks are not cancelled and a later [`shutdown`](Self::shutdown)
    /// completes the drain.
    #[instrument(skip(self), fields(pool_id = %self.config.pool_id))]
    pub async fn shutdown_timeout(&self, timeout: Duration) -> Result<(), WorkerPoolError> {
        self.close_intake();

        if tokio::time::timeout(timeout, self.executors.wait()).await.is_err() {
            let busy_executors = self.active_executors();
            warn!(busy_executors, "Shutdown timeout reached");
            return Err(WorkerPoolError::ShutdownTimeout { busy_executors });
        }

        self.mark_closed();
        Ok(())
    }

    /// Get current status
    ///
    /// A pool whose shutdown future was dropped mid-drain is marked
    /// [`Closed`](WorkerPoolStatus::Closed) by the first call made after its
    /// last executor exited; subscribers are notified by that call.
    pub fn status(&self) -> WorkerPoolStatus {
        let status = *self.status_tx.borrow();
        if status == WorkerPoolStatus::Draining && self.executors.is_empty() {
            self.mark_closed();
            return WorkerPoolStatus::Closed;
        }
        status
    }

    /// Subscribe to status changes
    pub fn subscribe(&self) -> watch::Receiver<WorkerPoolStatus> {
        self.status_tx.subscribe()
    }

    /// Whether submissions are still accepted
    pub fn is_accepting(&self) -> bool {
        self.status() == WorkerPoolStatus::Open
    }

    /// Executor count fixed at construction
    pub fn size(&self) -> usize {
        self.config.size
    }

    /// Executors that have not exited yet
    pub fn active_executors(&self) -> usize {
        self.executors.len()
    }

    /// Get the pool ID
    pub fn pool_id(&self) -> &str {
        &self.config.pool_id
    }

    /// Get the configuration the pool was built with
    pub fn config(&self) -> &WorkerPoolConfig {
        &self.config
    }

    /// Snapshot of task counters
    pub fn stats(&self) -> PoolStats {
        self.counters.snapshot()
    }

    /// Move `Open -> Draining` and drop the intake sender
    ///
    /// Returns `true` for the single call that performed the transition.
    fn close_intake(&self) -> bool {
        let began = self.status_tx.send_if_modified(|status| {
            if *status == WorkerPoolStatus::Open {
                *status = WorkerPoolStatus::Draining;
                true
            } else {
                false
            }
        });

        if began {
            drop(self.intake.lock().take());
            info!(
                pool_id = %self.config.pool_id,
                active_executors = self.active_executors(),
                "Intake closed, draining executors"
            );
        }
        began
    }

    fn mark_closed(&self) {
        let closed = self.status_tx.send_if_modified(|status| {
            if *status == WorkerPoolStatus::Closed {
                false
            } else {
                *status = WorkerPoolStatus::Closed;
                true
            }
        });

        if closed {
            let stats = self.stats();
            info!(
                pool_id = %self.config.pool_id,
                submitted = stats.submitted,
                completed = stats.completed,
                failed = stats.failed,
                panicked = stats.panicked,
                rejected = stats.rejected,
                "Worker pool closed"
            );
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if self.close_intake() {
            debug!(
                pool_id = %self.config.pool_id,
                "Worker pool dropped without shutdown, executors drain in background"
            );
        }
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("pool_id", &self.config.pool_id)
            .field("size", &self.config.size)
            .field("status", &self.status())
            .field("active_executors", &self.active_executors())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::task_fn;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_new_requires_runtime() {
        let err = WorkerPool::new(2).unwrap_err();
        assert!(matches!(err, WorkerPoolError::NoRuntime));
    }

    #[tokio::test]
    async fn test_new_rejects_zero_size() {
        let err = WorkerPool::new(0).unwrap_err();
        assert!(matches!(err, WorkerPoolError::InvalidSize(0)));
        assert_eq!(err.to_string(), "worker pool size must be at least 1 (got 0)");
    }

    #[tokio::test]
    async fn test_new_spawns_size_executors() {
        let pool = WorkerPool::new(5).unwrap();
        assert_eq!(pool.size(), 5);
        assert_eq!(pool.active_executors(), 5);
        assert_eq!(pool.status(), WorkerPoolStatus::Open);
        assert!(pool.is_accepting());

        pool.shutdown().await;
        assert_eq!(pool.active_executors(), 0);
        assert_eq!(pool.status(), WorkerPoolStatus::Closed);
    }

    #[tokio::test]
    async fn test_submit_after_shutdown_is_rejected() {
        let pool = WorkerPool::new(1).unwrap();
        pool.shutdown().await;

        let err = pool
            .submit(task_fn("late", || async { Ok(()) }))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkerPoolError::NotAccepting(WorkerPoolStatus::Closed)
        ));
        assert_eq!(pool.stats().rejected, 1);
        assert_eq!(pool.stats().submitted, 0);
    }

    #[tokio::test]
    async fn test_shutdown_drains_accepted_tasks() {
        let pool = WorkerPool::new(2).unwrap();
        let done = Arc::new(AtomicUsize::new(0));

        for _ in 0..6 {
            let done = Arc::clone(&done);
            pool.submit(task_fn("sleepy", move || {
                let done = Arc::clone(&done);
                async move {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    done.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            }))
            .await
            .unwrap();
        }

        pool.shutdown().await;
        assert_eq!(done.load(Ordering::SeqCst), 6);
        assert_eq!(pool.stats().completed, 6);
    }

    #[tokio::test]
    async fn test_status_subscription_sees_transitions() {
        let pool = WorkerPool::new(1).unwrap();
        let mut rx = pool.subscribe();
        assert_eq!(*rx.borrow_and_update(), WorkerPoolStatus::Open);

        pool.shutdown().await;

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), WorkerPoolStatus::Closed);
    }

    #[tokio::test]
    async fn test_shutdown_timeout_leaves_pool_draining() {
        let pool = WorkerPool::new(1).unwrap();
        let (release_tx, release_rx) = tokio::sync::watch::channel(false);

        pool.submit(task_fn("gated", move || {
            let mut release_rx = release_rx.clone();
            async move {
                let _ = release_rx.wait_for(|released| *released).await;
                Ok(())
            }
        }))
        .await
        .unwrap();

        let err = pool
            .shutdown_timeout(Duration::from_millis(30))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkerPoolError::ShutdownTimeout { busy_executors: 1 }
        ));
        assert_eq!(pool.status(), WorkerPoolStatus::Draining);

        release_tx.send(true).unwrap();
        pool.shutdown_timeout(Duration::from_secs(5)).await.unwrap();
        assert_eq!(pool.status(), WorkerPoolStatus::Closed);
    }

    #[tokio::test]
    async fn test_cancelled_shutdown_still_reaches_closed() {
        let pool = WorkerPool::new(1).unwrap();
        let (release_tx, release_rx) = tokio::sync::watch::channel(false);

        pool.submit(task_fn("gated", move || {
            let mut release_rx = release_rx.clone();
            async move {
                let _ = release_rx.wait_for(|released| *released).await;
                Ok(())
            }
        }))
        .await
        .unwrap();

        // Dropping the shutdown future leaves the drain unfinished
        let cancelled = tokio::time::timeout(Duration::from_millis(30), pool.shutdown()).await;
        assert!(cancelled.is_err());
        assert_eq!(pool.status(), WorkerPoolStatus::Draining);

        let mut rx = pool.subscribe();
        release_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(5), async {
            while pool.active_executors() > 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        assert_eq!(pool.status(), WorkerPoolStatus::Closed);
        assert_eq!(*rx.borrow_and_update(), WorkerPoolStatus::Closed);
        assert_eq!(pool.stats().completed, 1);
    }

    #[tokio::test]
    async fn test_dropped_pool_drains_in_background() {
        let done = Arc::new(AtomicUsize::new(0));
        let pool = WorkerPool::new(1).unwrap();
        let counter = Arc::clone(&done);
        pool.submit(task_fn("bg", move || {
            let counter = Arc::clone(&counter);
            async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }))
        .await
        .unwrap();
        drop(pool);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(done.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(WorkerPoolStatus::Open.to_string(), "open");
        assert_eq!(WorkerPoolStatus::Draining.to_string(), "draining");
        assert_eq!(WorkerPoolStatus::Closed.to_string(), "closed");
    }
}
