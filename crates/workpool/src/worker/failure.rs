//! Task failure reporting
//!
//! Executors isolate failures per task: an error or a panic inside
//! `execute()` is turned into a [`TaskFailure`], logged, counted and handed
//! to the optional failure handler. The executor then takes the next task.

use std::any::Any;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::task::TaskError;

/// How a task failed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureKind {
    /// `execute()` returned an error
    Error(TaskError),
    /// `execute()` panicked; holds the panic message
    Panic(String),
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Error(err) => write!(f, "error: {}", err),
            FailureKind::Panic(msg) => write!(f, "panic: {}", msg),
        }
    }
}

/// A failed task execution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskFailure {
    /// ID assigned to the task at submission
    pub task_id: Uuid,
    /// Task name as reported by `Task::name`
    pub task_name: String,
    /// Index of the executor that ran the task
    pub executor_id: usize,
    /// What went wrong
    pub kind: FailureKind,
    /// When the failure was observed
    pub failed_at: DateTime<Utc>,
}

impl TaskFailure {
    pub(crate) fn new(
        task_id: Uuid,
        task_name: impl Into<String>,
        executor_id: usize,
        kind: FailureKind,
    ) -> Self {
        Self {
            task_id,
            task_name: task_name.into(),
            executor_id,
            kind,
            failed_at: Utc::now(),
        }
    }

    /// Whether the task panicked rather than returning an error
    pub fn is_panic(&self) -> bool {
        matches!(self.kind, FailureKind::Panic(_))
    }
}

/// Callback invoked by executors for every failed task
///
/// Runs on the executor, so it should return quickly.
pub type FailureHandler = Arc<dyn Fn(&TaskFailure) + Send + Sync>;

/// Extract a readable message from a panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
