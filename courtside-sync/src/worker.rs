//! Bounded pool for blocking store and file work.
//!
//! Blocking closures run on tokio's blocking threads, with a semaphore
//! capping how many run at once.

use std::sync::Arc;
use tokio::sync::Semaphore;

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("Worker pool is closed")]
    Closed,
    #[error("Blocking task panicked: {0}")]
    Panicked(String),
    #[error("Blocking task was cancelled")]
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            permits: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Permits not currently held by a running task.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Run `task` on a blocking thread once a permit is free.
    ///
    /// The permit moves into the task, so it stays held until the closure
    /// returns even if the caller stops waiting.
    pub async fn run<F, T>(&self, task: F) -> Result<T, WorkerError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| WorkerError::Closed)?;

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            task()
        })
        .await
        .map_err(|e| {
            if e.is_panic() {
                WorkerError::Panicked(e.to_string())
            } else {
                WorkerError::Cancelled
            }
        })
    }
}
