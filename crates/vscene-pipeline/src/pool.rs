//! Bounded worker pool.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Bounds the number of concurrent runs.
///
/// Downloads and external decoder invocations happen inside a run, so the
/// pool also caps those; request intake is never blocked, submissions just
/// wait for a permit.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
}

impl WorkerPool {
    /// Create a pool with `workers` permits.
    pub fn new(workers: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    /// Wait for a free worker slot.
    pub async fn acquire(&self) -> OwnedSemaphorePermit {
        // The semaphore is never closed, so acquire cannot fail.
        self.semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("worker pool semaphore closed")
    }

    /// Number of currently free slots.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pool_limits_concurrency() {
        let pool = WorkerPool::new(2);
        let a = pool.acquire().await;
        let _b = pool.acquire().await;
        assert_eq!(pool.available(), 0);

        drop(a);
        assert_eq!(pool.available(), 1);
        let _c = pool.acquire().await;
        assert_eq!(pool.available(), 0);
    }

    #[test]
    fn zero_workers_still_gets_one_permit() {
        let pool = WorkerPool::new(0);
        assert_eq!(pool.available(), 1);
    }
}
