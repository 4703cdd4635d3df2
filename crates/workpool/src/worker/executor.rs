//! Executor loop
//!
//! Each executor repeatedly takes one task from the intake and runs it to
//! completion. It exits when the intake is closed and empty.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use tracing::{debug, error, warn};
use uuid::Uuid;

use super::failure::{panic_message, FailureHandler, FailureKind, TaskFailure};
use super::intake::IntakeReceiver;
use super::stats::PoolCounters;
use crate::task::Task;

/// State shared by every executor of a pool
pub(crate) struct ExecutorShared {
    pub(crate) pool_id: String,
    pub(crate) intake: IntakeReceiver,
    pub(crate) counters: Arc<PoolCounters>,
    pub(crate) failure_handler: Option<FailureHandler>,
    pub(crate) slow_task_threshold: Option<Duration>,
}

/// A single executor
pub(crate) struct Executor {
    id: usize,
    shared: Arc<ExecutorShared>,
}

impl Executor {
    pub(crate) fn new(id: usize, shared: Arc<ExecutorShared>) -> Self {
        Self { id, shared }
    }

    /// Serve tasks until the intake is closed and drained
    pub(crate) async fn run(self) {
        debug!(pool_id = %self.shared.pool_id, executor_id = self.id, "Executor started");

        let mut served = 0u64;
        while let Some(envelope) = self.shared.intake.next().await {
            let (task_id, task) = envelope.accept();
            self.shared.counters.task_submitted();
            self.run_task(task_id, task).await;
            served += 1;
        }

        debug!(
            pool_id = %self.shared.pool_id,
            executor_id = self.id,
            served,
            "Executor exited"
        );
    }

    /// Run one task, isolating errors and panics
    async fn run_task(&self, task_id: Uuid, task: Box<dyn Task>) {
        let started = Instant::now();
        debug!(
            executor_id = self.id,
            %task_id,
            task = task.name(),
            "Task started"
        );

        let execution = AssertUnwindSafe(task.execute()).catch_unwind();
        tokio::pin!(execution);

        let outcome = match self.shared.slow_task_threshold {
            Some(threshold) => {
                tokio::select! {
                    outcome = &mut execution => outcome,
                    _ = tokio::time::sleep(threshold) => {
                        warn!(
                            pool_id = %self.shared.pool_id,
                            executor_id = self.id,
                            %task_id,
                            task = task.name(),
                            threshold_ms = threshold.as_millis() as u64,
                            "Task exceeded slow task threshold, executor stays occupied"
                        );
                        execution.await
                    }
                }
            }
            None => execution.await,
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        let kind = match outcome {
            Ok(Ok(())) => {
                self.shared.counters.task_completed();
                debug!(executor_id = self.id, %task_id, elapsed_ms, "Task completed");
                return;
            }
            Ok(Err(err)) => {
                self.shared.counters.task_failed();
                FailureKind::Error(err)
            }
            Err(payload) => {
                self.shared.counters.task_panicked();
                FailureKind::Panic(panic_message(payload.as_ref()))
            }
        };

        let failure = TaskFailure::new(task_id, task.name(), self.id, kind);
        error!(
            pool_id = %self.shared.pool_id,
            executor_id = self.id,
            %task_id,
            task = %failure.task_name,
            elapsed_ms,
            "Task failed: {}",
            failure.kind
        );

        if let Some(handler) = &self.shared.failure_handler {
            // A panicking handler must not take the executor down with it
            let delivered = std::panic::catch_unwind(AssertUnwindSafe(|| handler(&failure)));
            if let Err(payload) = delivered {
                error!(
                    pool_id = %self.shared.pool_id,
                    executor_id = self.id,
                    %task_id,
                    "Failure handler panicked: {}",
                    panic_message(payload.as_ref())
                );
            }
        }
    }
}
