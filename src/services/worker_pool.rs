//! Bounded worker pool for per-traveler fan-out
//!
//! Every unit of work is spawned onto the tokio runtime but must hold a
//! semaphore permit while it runs, so at most `size` units execute at once.
//! `join_all` returns only after every unit has finished.

use crate::infra::config::Config;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Pool size for a host: `max(min_workers, cores * workers_per_core)`
pub fn pool_size(available_parallelism: usize, min_workers: usize, workers_per_core: usize) -> usize {
    min_workers.max(available_parallelism.saturating_mul(workers_per_core)).max(1)
}

/// Cores reported by the OS (1 if unknown)
pub fn available_parallelism() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

#[derive(Debug)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self { permits: Arc::new(Semaphore::new(size)), size }
    }

    /// Size the pool from config and the host's core count
    pub fn from_config(config: &Config) -> Self {
        let cores = available_parallelism();
        let size = pool_size(cores, config.min_workers(), config.workers_per_core());
        info!(available_processors = %cores, parallelism = %size, "worker_pool_initialized");
        Self::new(size)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Run `f` for every item with bounded parallelism and wait for all
    ///
    /// Slot `i` holds the output for item `i`, or `None` if that unit was
    /// cancelled. A panicking unit re-raises its panic here.
    pub async fn join_all<T, F, Fut>(&self, items: Vec<T>, f: F) -> Vec<Option<Fut::Output>>
    where
        F: Fn(T) -> Fut,
        Fut: Future + Send + 'static,
        Fut::Output: Send + 'static,
    {
        let total = items.len();
        let mut set = JoinSet::new();

        for (idx, item) in items.into_iter().enumerate() {
            let permits = self.permits.clone();
            let unit = f(item);
            set.spawn(async move {
                // The semaphore is never closed, so acquisition only waits
                let _permit = permits.acquire_owned().await.ok();
                (idx, unit.await)
            });
        }

        let mut completed = Vec::with_capacity(total);
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(done) => completed.push(done),
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                Err(e) => warn!(error = %e, "worker_unit_cancelled"),
            }
        }

        in_input_order(total, completed)
    }
}

/// Place `(index, output)` pairs into their input slots; missing ones stay `None`
fn in_input_order<O>(total: usize, completed: Vec<(usize, O)>) -> Vec<Option<O>> {
    let mut slots: Vec<Option<O>> = (0..total).map(|_| None).collect();
    for (idx, output) in completed {
        if let Some(slot) = slots.get_mut(idx) {
            *slot = Some(output);
        }
    }
    slots
}
