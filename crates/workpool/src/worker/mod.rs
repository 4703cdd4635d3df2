//! Worker pool for task execution
//!
//! This module provides:
//! - [`WorkerPool`] - Fixed-size pool with rendezvous submission and graceful shutdown
//! - [`WorkerPoolConfig`] - Pool configuration (size, ID, slow task threshold)
//! - [`TaskFailure`] - Report of a failed task, passed to the failure handler
//! - [`PoolStats`] - Task counters
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       WorkerPool                             │
//! │                                                              │
//! │  submit() ──▶ ┌──────────────────────────────┐               │
//! │  submit() ──▶ │  Intake (1 slot + ack)       │               │
//! │  submit() ──▶ └──────────────┬───────────────┘               │
//! │                              │ rendezvous                    │
//! │          ┌───────────────────┼───────────────────┐           │
//! │          ▼                   ▼                   ▼           │
//! │   [Executor 0]        [Executor 1]   ...  [Executor N-1]     │
//! │          │                   │                   │           │
//! │          └──── TaskTracker (exit barrier) ───────┘           │
//! │                              │                               │
//! │  shutdown() ── close intake ─┴─ wait for every executor      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use workpool::worker::{WorkerPool, WorkerPoolConfig};
//!
//! let config = WorkerPoolConfig::new(4).with_pool_id("thumbnails");
//!
//! let pool = WorkerPool::builder()
//!     .config(config)
//!     .on_failure(|failure| tracing::warn!(task = %failure.task_name, "failed"))
//!     .build()?;
//!
//! pool.submit(ResizeImage { path }).await?;
//!
//! // Graceful shutdown
//! pool.shutdown().await;
//! ```

mod builder;
mod config;
mod executor;
mod failure;
mod intake;
mod pool;
mod stats;

pub use builder::WorkerPoolBuilder;
pub use config::{WorkerPoolConfig, DEFAULT_POOL_SIZE};
pub use failure::{FailureHandler, FailureKind, TaskFailure};
pub use pool::{WorkerPool, WorkerPoolError, WorkerPoolStatus};
pub use stats::PoolStats;
