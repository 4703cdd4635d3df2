//! # Workpool
//!
//! A bounded worker pool: a fixed number of executors consume tasks from a
//! shared rendezvous hand-off and shut down cooperatively.
//!
//! ## Features
//!
//! - **Bounded concurrency**: exactly `size` executors, spawned once
//! - **Backpressure**: `submit` waits for an idle executor instead of queueing
//! - **Failure isolation**: errors and panics in a task never take down an executor
//! - **Leak-free shutdown**: idempotent, drains every accepted task
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Task                                 │
//! │  (one async execute(), owns its payload)                    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ submit
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      WorkerPool                              │
//! │  (rendezvous intake, N executors, exit barrier)             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use workpool::prelude::*;
//!
//! struct NamePrinter {
//!     name: String,
//! }
//!
//! #[async_trait]
//! impl Task for NamePrinter {
//!     async fn execute(&self) -> Result<(), TaskError> {
//!         tracing::info!(name = %self.name, "printing");
//!         Ok(())
//!     }
//! }
//!
//! let pool = WorkerPool::new(2)?;
//! pool.submit(NamePrinter { name: "ira".into() }).await?;
//! pool.shutdown().await;
//! ```

pub mod task;
pub mod worker;

/// Prelude for common imports
pub mod prelude {
    pub use crate::task::{task_fn, FnTask, Task, TaskError};
    pub use crate::worker::{
        PoolStats, TaskFailure, WorkerPool, WorkerPoolConfig, WorkerPoolError, WorkerPoolStatus,
    };
    pub use async_trait::async_trait;
}

// Re-export key types at crate root
pub use task::{task_fn, FnTask, Task, TaskError};
pub use worker::{
    FailureKind, PoolStats, TaskFailure, WorkerPool, WorkerPoolBuilder, WorkerPoolConfig,
    WorkerPoolError, WorkerPoolStatus,
};
