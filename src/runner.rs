//! Bounded Job Runner
//!
//! Executes asynchronous jobs over a fixed number of slots and collects their
//! results all-or-nothing: the first job error wins, every other result of
//! the batch is discarded, and jobs still queued behind it never start.
//! In-flight jobs are never interrupted; [`JobRunner::wait`] lets them finish.

use crate::error::RunnerError;
use anyhow::Result;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;

/// Default number of concurrent jobs per runner
pub const DEFAULT_PARALLELISM: usize = 10;

/// Cancellable scope for one enumeration run
///
/// Clones share the same cancellation state.
#[derive(Debug, Clone)]
pub struct EnumerationContext {
    cancelled: Arc<watch::Sender<bool>>,
}

impl EnumerationContext {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            cancelled: Arc::new(tx),
        }
    }

    /// Cancel the run. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }

    /// Resolves once the context is cancelled
    pub async fn cancelled(&self) {
        let mut rx = self.cancelled.subscribe();
        // The sender lives as long as `self`, so this only returns on cancel.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for EnumerationContext {
    fn default() -> Self {
        Self::new()
    }
}

/// State shared between the runner and its spawned jobs
struct RunState<T> {
    slots: Arc<Semaphore>,
    results: Mutex<Vec<T>>,
    first_error: Mutex<Option<anyhow::Error>>,
    failed: AtomicBool,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    completed: AtomicUsize,
}

impl<T> RunState<T> {
    /// Keep the first error only, and stop handing out slots
    fn record_error(&self, err: anyhow::Error) {
        let mut slot = self.first_error.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            *slot = Some(err);
        }
        self.failed.store(true, Ordering::SeqCst);
        self.slots.close();
    }

    fn push_result(&self, value: T) {
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(value);
        self.completed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Fixed-width job pool for one batch of work
///
/// One runner serves one supplier invocation; [`wait`](Self::wait) consumes
/// it so fail-fast state never leaks into an unrelated batch.
pub struct JobRunner<T> {
    ctx: EnumerationContext,
    state: Arc<RunState<T>>,
    tasks: JoinSet<()>,
    width: usize,
    submitted: usize,
}

impl<T: Send + 'static> JobRunner<T> {
    /// Create a runner allowing `width` jobs in flight at once
    ///
    /// A width of zero would never make progress and is raised to one.
    pub fn new(ctx: EnumerationContext, width: usize) -> Self {
        let width = if width == 0 {
            tracing::warn!("runner width 0 is invalid, using 1");
            1
        } else {
            width
        };

        Self {
            ctx,
            state: Arc::new(RunState {
                slots: Arc::new(Semaphore::new(width)),
                results: Mutex::new(Vec::new()),
                first_error: Mutex::new(None),
                failed: AtomicBool::new(false),
                in_flight: AtomicUsize::new(0),
                peak_in_flight: AtomicUsize::new(0),
                completed: AtomicUsize::new(0),
            }),
            tasks: JoinSet::new(),
            width,
            submitted: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of jobs submitted so far
    pub fn submitted(&self) -> usize {
        self.submitted
    }

    /// Highest number of jobs observed running at the same time
    pub fn peak_in_flight(&self) -> usize {
        self.state.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Queue a job. It starts as soon as a slot is free.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit<F, Fut>(&mut self, job: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        self.submitted += 1;
        let ctx = self.ctx.clone();
        let state = Arc::clone(&self.state);

        self.tasks.spawn(async move {
            let permit = tokio::select! {
                biased;
                _ = ctx.cancelled() => {
                    state.record_error(RunnerError::Cancelled.into());
                    return;
                }
                permit = Arc::clone(&state.slots).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    // Slots are closed once a job failed
                    Err(_) => return,
                },
            };

            if ctx.is_cancelled() {
                state.record_error(RunnerError::Cancelled.into());
                return;
            }
            if state.failed.load(Ordering::SeqCst) {
                return;
            }

            let running = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            state.peak_in_flight.fetch_max(running, Ordering::SeqCst);

            let outcome = job().await;

            state.in_flight.fetch_sub(1, Ordering::SeqCst);
            drop(permit);

            match outcome {
                Ok(value) => state.push_result(value),
                Err(err) => state.record_error(err),
            }
        });
    }

    /// Wait for every job to finish or be skipped
    ///
    /// Returns all values (in completion order) when every job succeeded,
    /// otherwise the first error. Cancellation of the context yields
    /// [`RunnerError::Cancelled`].
    pub async fn wait(mut self) -> Result<Vec<T>> {
        while let Some(joined) = self.tasks.join_next().await {
            if let Err(join_err) = joined {
                self.state
                    .record_error(RunnerError::JobPanicked(join_err.to_string()).into());
            }
        }

        let completed = self.state.completed.load(Ordering::SeqCst);
        let first_error = self
            .state
            .first_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(err) = first_error {
            tracing::debug!(
                "runner failed after {}/{} jobs completed, discarding results",
                completed,
                self.submitted
            );
            return Err(err);
        }

        if self.ctx.is_cancelled() {
            return Err(RunnerError::Cancelled.into());
        }

        let results = std::mem::take(
            &mut *self
                .state
                .results
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        tracing::debug!(
            "runner finished {} jobs, peak in flight {}/{}",
            completed,
            self.state.peak_in_flight.load(Ordering::SeqCst),
            self.width
        );
        Ok(results)
    }
}
