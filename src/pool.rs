//! # Bounded Worker Pool
//!
//! Every batch stage (discovery, provisioning, synchronization) runs its
//! per-item operation through [`WorkerPool::run`]: a fixed number of OS
//! threads drain one unbuffered work channel and hand their results to a
//! results channel owned by the calling thread.
//!
//! ## Guarantees
//!
//! - **Completeness**: `run` returns exactly one result per input item.
//! - **Exclusivity**: each item is received by exactly one worker.
//! - **Isolation**: a panic inside the operation is caught and converted by
//!   the caller-supplied `on_panic` function into a result for that item;
//!   the worker then carries on with the next item.
//! - **No ordering**: results arrive in completion order.
//!
//! The work channel has capacity zero, so the feeding thread hands an item
//! over only when a worker is ready for it. The receiving end is shared by
//! the workers behind a mutex that is held only while waiting for the next
//! item, never while the operation runs. Results flow back through a second
//! channel; the caller is the only owner of the collected vector, so no lock
//! guards the accumulator.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{mpsc, Mutex};
use std::thread;

use indicatif::ProgressBar;
use log::{debug, warn};

/// Default number of concurrent workers per stage.
pub const DEFAULT_WORKERS: usize = 5;

/// A fixed-size pool of worker threads, spawned anew for every `run`.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    workers: usize,
    progress: Option<ProgressBar>,
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(DEFAULT_WORKERS)
    }
}

impl WorkerPool {
    /// Create a pool with `workers` threads. Zero is treated as one.
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            progress: None,
        }
    }

    /// Advance `progress` once for every completed item.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `op` over every item and collect one result per item.
    ///
    /// `on_panic` receives the item whose operation panicked and the panic
    /// message, and must produce the result recorded for that item.
    pub fn run<I, O, F, P>(&self, items: Vec<I>, op: F, on_panic: P) -> Vec<O>
    where
        I: Send,
        O: Send,
        F: Fn(&I) -> O + Sync,
        P: Fn(&I, String) -> O + Sync,
    {
        let expected = items.len();
        if expected == 0 {
            return Vec::new();
        }

        let workers = self.workers.min(expected);
        debug!("dispatching {} items to {} workers", expected, workers);

        let (work_tx, work_rx) = mpsc::sync_channel::<I>(0);
        let work_rx = Mutex::new(work_rx);
        let (result_tx, result_rx) = mpsc::channel::<O>();

        let results: Vec<O> = thread::scope(|scope| {
            for _ in 0..workers {
                let result_tx = result_tx.clone();
                let work_rx = &work_rx;
                let op = &op;
                let on_panic = &on_panic;
                let progress = self.progress.as_ref();

                scope.spawn(move || loop {
                    let next = match work_rx.lock() {
                        Ok(rx) => rx.recv(),
                        Err(poisoned) => poisoned.into_inner().recv(),
                    };
                    let Ok(item) = next else {
                        break;
                    };

                    let result = match panic::catch_unwind(AssertUnwindSafe(|| op(&item))) {
                        Ok(result) => result,
                        Err(payload) => {
                            let message = panic_message(payload.as_ref());
                            warn!("worker operation panicked: {}", message);
                            on_panic(&item, message)
                        }
                    };

                    if let Some(progress) = progress {
                        progress.inc(1);
                    }
                    if result_tx.send(result).is_err() {
                        break;
                    }
                });
            }
            // Only the workers hold senders now; the iterator below ends once
            // every worker has drained the work channel and exited.
            drop(result_tx);

            for item in items {
                if work_tx.send(item).is_err() {
                    break;
                }
            }
            drop(work_tx);

            result_rx.iter().collect()
        });

        if results.len() != expected {
            warn!(
                "worker pool produced {} results for {} items",
                results.len(),
                expected
            );
        }
        results
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker panicked".to_string()
    }
}
