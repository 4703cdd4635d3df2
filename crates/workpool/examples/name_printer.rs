//! Name printer demo
//!
//! Two executors, six concurrent submitters, each task logs a name and sleeps.
//!
//! Run with: cargo run -p workpool --example name_printer
//!
//! Configure via environment variables (or a `.env` file):
//! - WORKPOOL_SIZE: executor count (default: 2 for this demo)
//! - WORKPOOL_SLOW_TASK_MS: warn when a task runs longer than this
//! - NAME_PRINTER_SLEEP_MS: how long each task sleeps (default: 4000)
//! - RUST_LOG: log filter (default: "workpool=debug,name_printer=info")

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use workpool::prelude::*;

const NAMES: [&str; 3] = ["ira", "mary", "nastea"];

/// Prints a name, then pretends to be busy
struct NamePrinter {
    name: String,
    pause: Duration,
}

#[async_trait]
impl Task for NamePrinter {
    fn name(&self) -> &str {
        "name_printer"
    }

    async fn execute(&self) -> Result<(), TaskError> {
        tracing::info!(name = %self.name, "Printing name");
        tokio::time::sleep(self.pause).await;
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "workpool=debug,name_printer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = WorkerPoolConfig::from_env().with_pool_id("name-printer");
    if std::env::var("WORKPOOL_SIZE").is_err() {
        config = config.with_size(2);
    }

    let pause = std::env::var("NAME_PRINTER_SLEEP_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(4));

    let pool = Arc::new(
        WorkerPool::builder()
            .config(config)
            .on_failure(|failure| {
                tracing::warn!(task = %failure.task_name, "Task failed: {}", failure.kind)
            })
            .build()
            .context("Failed to start worker pool")?,
    );

    // Every name twice, each submitted from its own task
    let mut submitters = Vec::new();
    for _ in 0..2 {
        for name in NAMES {
            let pool = Arc::clone(&pool);
            submitters.push(tokio::spawn(async move {
                pool.submit(NamePrinter {
                    name: name.to_string(),
                    pause,
                })
                .await
            }));
        }
    }

    // When submit returns the task is being handled
    for submitter in submitters {
        submitter
            .await
            .context("Submitter task panicked")?
            .context("Submission rejected")?;
    }

    // Wait for all existing work to complete
    pool.shutdown().await;

    let stats = pool.stats();
    tracing::info!(
        completed = stats.completed,
        failed = stats.failed,
        "Worker pool shut down"
    );
    Ok(())
}
