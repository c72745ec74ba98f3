//! Fire-and-continue processing handoff.
//!
//! Every accepted message body is processed on its own tokio task, detached
//! from the request that produced it. The request never waits on that task;
//! its outcome goes to the structured log (the operator sink) and to the
//! returned [`JoinHandle`] for callers that want to observe it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{Notify, Semaphore};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::process::Processor;

/// Result of one processing handoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandoffOutcome {
    Completed,
    Failed(String),
    Panicked,
}

/// Spawns processing tasks with bounded concurrency.
#[derive(Clone)]
pub struct HandoffRunner {
    inner: Arc<RunnerInner>,
}

struct RunnerInner {
    processor: Arc<dyn Processor>,
    permits: Semaphore,
    in_flight: AtomicUsize,
    idle: Notify,
}

impl HandoffRunner {
    pub fn new(processor: Arc<dyn Processor>, concurrency: usize) -> Self {
        Self {
            inner: Arc::new(RunnerInner {
                processor,
                permits: Semaphore::new(concurrency.max(1)),
                in_flight: AtomicUsize::new(0),
                idle: Notify::new(),
            }),
        }
    }

    /// Hand `body` to the processor on a detached task.
    ///
    /// Returns immediately; the task queues on the concurrency limit rather
    /// than the caller.
    pub fn dispatch(&self, body: String) -> JoinHandle<HandoffOutcome> {
        let guard = InFlight::enter(Arc::clone(&self.inner));

        tokio::spawn(async move {
            // Held by the task so abort and runtime teardown also release it.
            let guard = guard;
            guard.inner.run(body).await
        })
    }

    /// Number of handoffs spawned but not yet finished.
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::SeqCst)
    }

    /// Wait until every dispatched handoff has finished.
    pub async fn drain(&self) {
        loop {
            let idle = self.inner.idle.notified();
            if self.in_flight() == 0 {
                return;
            }
            idle.await;
        }
    }
}

/// Counts one dispatched handoff until dropped.
struct InFlight {
    inner: Arc<RunnerInner>,
}

impl InFlight {
    fn enter(inner: Arc<RunnerInner>) -> Self {
        inner.in_flight.fetch_add(1, Ordering::SeqCst);
        Self { inner }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if self.inner.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.inner.idle.notify_waiters();
        }
    }
}

impl RunnerInner {
    async fn run(&self, body: String) -> HandoffOutcome {
        let _permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                error!("handoff_semaphore_closed");
                return HandoffOutcome::Failed("handoff runner closed".to_string());
            }
        };

        let processor = self.processor.name();
        let body_length = body.len();

        // Covers panics while building the future as well as while polling it.
        let result = std::panic::AssertUnwindSafe(async move {
            self.processor.process(body).await
        })
        .catch_unwind()
        .await;

        match result {
            Ok(Ok(())) => {
                info!(processor, body_length, "handoff_completed");
                HandoffOutcome::Completed
            }
            Ok(Err(e)) => {
                error!(processor, body_length, error = %e, "handoff_failed");
                HandoffOutcome::Failed(format!("{e:#}"))
            }
            Err(_) => {
                error!(processor, body_length, "handoff_panicked");
                HandoffOutcome::Panicked
            }
        }
    }
}
