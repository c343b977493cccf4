//! Worker pool for one BFS level
//!
//! This module handles:
//! - Global concurrency limiting via a semaphore
//! - Fan-out of one level of URLs onto tokio tasks and the join barrier
//!   before the next level starts
//! - The shutdown hook: in-flight workers are cancelled, which drops their
//!   pending HTTP and render requests

use std::future::Future;
use std::sync::Arc;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;

/// Cloneable handle that stops a [`WorkerPool`]
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    signal: Arc<watch::Sender<bool>>,
    permits: Arc<Semaphore>,
}

impl ShutdownHandle {
    /// Stops the pool
    ///
    /// Workers waiting for a permit give up, running workers are cancelled
    /// at their next suspension point, and no new work is accepted.
    pub fn shutdown(&self) {
        self.signal.send_replace(true);
        self.permits.close();
    }

    /// Returns true once [`ShutdownHandle::shutdown`] has been called
    pub fn is_shutdown(&self) -> bool {
        *self.signal.borrow()
    }

    /// Returns a receiver that observes the shutdown flag
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.signal.subscribe()
    }

    /// Resolves once shutdown has been requested
    pub async fn cancelled(&self) {
        wait_for_shutdown(self.subscribe()).await;
    }
}

/// Bounded pool that runs the URLs of one level concurrently
#[derive(Debug)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    handle: ShutdownHandle,
}

impl WorkerPool {
    /// Creates a pool that runs at most `concurrency` workers at a time
    pub fn new(concurrency: usize) -> Self {
        let permits = Arc::new(Semaphore::new(concurrency.max(1)));
        let (signal, _) = watch::channel(false);

        Self {
            handle: ShutdownHandle {
                signal: Arc::new(signal),
                permits: Arc::clone(&permits),
            },
            permits,
        }
    }

    /// Returns the shutdown hook for this pool
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.handle.clone()
    }

    /// Returns true once the pool has been shut down
    pub fn is_shutdown(&self) -> bool {
        self.handle.is_shutdown()
    }

    /// Runs `work` for every item and waits for all of them
    ///
    /// Results come back in the order of `items`. Items whose worker was
    /// cancelled by shutdown, or panicked, produce no result.
    pub async fn run_level<T, R, F, Fut>(&self, items: Vec<T>, work: F) -> Vec<R>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> Fut,
        Fut: Future<Output = R> + Send + 'static,
    {
        if self.is_shutdown() {
            return Vec::new();
        }

        let mut set = JoinSet::new();

        for (index, item) in items.into_iter().enumerate() {
            let permits = Arc::clone(&self.permits);
            let stop = self.handle.subscribe();
            let job = work(item);

            set.spawn(async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    return (index, None);
                };

                tokio::select! {
                    out = job => (index, Some(out)),
                    _ = wait_for_shutdown(stop) => (index, None),
                }
            });
        }

        let mut results = Vec::with_capacity(set.len());
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, Some(out))) => results.push((index, out)),
                Ok((_, None)) => {}
                Err(e) => tracing::debug!("Crawl worker failed: {}", e),
            }
        }

        results.sort_by_key(|(index, _)| *index);
        results.into_iter().map(|(_, out)| out).collect()
    }
}

async fn wait_for_shutdown(mut stop: watch::Receiver<bool>) {
    if stop.wait_for(|stopped| *stopped).await.is_err() {
        // Sender gone: shutdown can no longer be requested
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_results_follow_input_order() {
        let pool = WorkerPool::new(4);
        let results = pool
            .run_level(vec![30u64, 10, 20], |delay| async move {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                delay
            })
            .await;
        assert_eq!(results, vec![30, 10, 20]);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let pool = WorkerPool::new(2);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        pool.run_level((0..8).collect::<Vec<_>>(), |_| {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                running.fetch_sub(1, Ordering::SeqCst);
            }
        })
        .await;

        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_shutdown_cancels_in_flight_work() {
        let pool = WorkerPool::new(2);
        let handle = pool.shutdown_handle();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            handle.shutdown();
        });

        let results = pool
            .run_level(vec![1, 2, 3], |n| async move {
                tokio::time::sleep(Duration::from_secs(30)).await;
                n
            })
            .await;

        assert!(results.is_empty());
        assert!(pool.is_shutdown());
    }

    #[tokio::test]
    async fn test_no_work_after_shutdown() {
        let pool = WorkerPool::new(2);
        pool.shutdown_handle().shutdown();

        let results = pool.run_level(vec![1, 2], |n| async move { n }).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_resolves_after_shutdown() {
        let pool = WorkerPool::new(1);
        let handle = pool.shutdown_handle();
        handle.shutdown();
        tokio::time::timeout(Duration::from_secs(1), handle.cancelled())
            .await
            .unwrap();
    }
}
