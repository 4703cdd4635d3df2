//! Task trait definition

use std::future::Future;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Error type for task failures
///
/// Returned from [`Task::execute`]. The pool never hands it back to the
/// submitter; it is logged, counted and passed to the failure handler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskError {
    /// Error message
    pub message: String,

    /// Error type/code for programmatic handling
    pub error_type: Option<String>,
}

impl TaskError {
    /// Create a new task error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error_type: None,
        }
    }

    /// Set the error type
    pub fn with_type(mut self, error_type: impl Into<String>) -> Self {
        self.error_type = Some(error_type.into());
        self
    }
}

impl std::fmt::Display for TaskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.error_type {
            Some(error_type) => write!(f, "[{}] {}", error_type, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for TaskError {}

impl From<anyhow::Error> for TaskError {
    fn from(err: anyhow::Error) -> Self {
        Self::new(format!("{:#}", err))
    }
}

/// A unit of work executed by one of the pool's executors
///
/// Tasks are fire-and-forget: the pool runs `execute()` exactly once and
/// discards the outcome after reporting failures. A task must not assume
/// which executor runs it, nor in which order relative to tasks submitted
/// by other callers.
///
/// A task that never returns from `execute()` occupies its executor for
/// the rest of the pool's life. The pool does not time tasks out.
///
/// # Example
///
/// ```ignore
/// use workpool::prelude::*;
///
/// struct NamePrinter {
///     name: String,
/// }
///
/// #[async_trait]
/// impl Task for NamePrinter {
///     fn name(&self) -> &str {
///         "name_printer"
///     }
///
///     async fn execute(&self) -> Result<(), TaskError> {
///         tracing::info!(name = %self.name, "hello");
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Task: Send + Sync + 'static {
    /// Human readable name used in logs and failure reports
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Execute the task
    ///
    /// # Errors
    ///
    /// Return a [`TaskError`] when the work failed. Panics are caught by the
    /// executor and reported the same way.
    async fn execute(&self) -> Result<(), TaskError>;
}

/// Task backed by an async closure
///
/// Created with [`task_fn`].
pub struct FnTask<F> {
    name: String,
    f: F,
}

impl<F> std::fmt::Debug for FnTask<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnTask").field("name", &self.name).finish()
    }
}

#[async_trait]
impl<F, Fut> Task for FnTask<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self) -> Result<(), TaskError> {
        (self.f)().await
    }
}

/// Wrap an async closure into a named [`Task`]
///
/// ```ignore
/// pool.submit(task_fn("greet", || async {
///     println!("hello");
///     Ok(())
/// }))
/// .await?;
/// ```
pub fn task_fn<F, Fut>(name: impl Into<String>, f: F) -> FnTask<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    FnTask {
        name: name.into(),
        f,
    }
}
