//! Task abstractions
//!
//! A task is a unit of work handed to the pool. It:
//! - Exposes a single `execute()` operation
//! - Owns its payload; the pool never inspects it
//! - Reports failure through [`TaskError`] (the pool isolates it)

mod definition;

pub use definition::{task_fn, FnTask, Task, TaskError};
