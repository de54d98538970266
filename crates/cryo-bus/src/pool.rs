//! # Worker Pool
//!
//! Bounded execution of asynchronous handler invocations.
//!
//! ```text
//! publish_async ──► [bounded queue] ──► worker 1 ──► handler
//!                                   ├─► worker 2 ──► handler
//!                                   └─► worker N ──► handler
//! ```
//!
//! Workers start lazily on the first submission, inside the caller's tokio
//! runtime. When the queue is full the [`OverflowPolicy`] decides between
//! waiting, dropping, and running the job on a detached task.

use crate::config::{BusConfig, OverflowPolicy};
use crate::error::BusError;
use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// A unit of work: one handler applied to one event.
pub(crate) struct Job {
    task: Box<dyn FnOnce() + Send + 'static>,
    _in_flight: InFlight,
}

impl Job {
    /// Run the task, containing any panic.
    fn run(self) {
        let Job { task, _in_flight } = self;
        if let Err(panic) = catch_unwind(AssertUnwindSafe(task)) {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            error!(panic = %message, "Async event handler panicked");
        }
    }
}

/// Counts a job from acceptance until it is run or discarded.
struct InFlight {
    count: Arc<AtomicUsize>,
    idle: Arc<Notify>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if self.count.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.idle.notify_waiters();
        }
    }
}

/// Outcome of offering a job to the queue.
enum Offer {
    /// `false` when the drop policy discarded the job.
    Accepted(bool),
    /// The queue has no receiver left; the job is handed back.
    Stale(Job),
}

enum PoolState {
    /// No worker spawned yet.
    Idle,
    Running {
        sender: mpsc::Sender<Job>,
        workers: Vec<JoinHandle<()>>,
    },
    Closed,
}

pub(crate) struct WorkerPool {
    worker_count: usize,
    capacity: usize,
    policy: OverflowPolicy,
    state: Mutex<PoolState>,
    in_flight: Arc<AtomicUsize>,
    idle: Arc<Notify>,
    dropped: AtomicU64,
}

impl WorkerPool {
    pub(crate) fn new(config: &BusConfig) -> Self {
        Self {
            worker_count: config.worker_count.max(1),
            capacity: config.queue_capacity.max(1),
            policy: config.overflow_policy,
            state: Mutex::new(PoolState::Idle),
            in_flight: Arc::new(AtomicUsize::new(0)),
            idle: Arc::new(Notify::new()),
            dropped: AtomicU64::new(0),
        }
    }

    /// Queue `task`. Returns `Ok(false)` if the drop policy discarded it.
    ///
    /// If the workers died with the runtime they were spawned on, they are
    /// respawned on the current runtime and the job is offered once more.
    pub(crate) async fn submit<F>(&self, task: F) -> Result<bool, BusError>
    where
        F: FnOnce() + Send + 'static,
    {
        let job = self.track(Box::new(task));
        match self.offer(job).await? {
            Offer::Accepted(accepted) => Ok(accepted),
            Offer::Stale(job) => {
                self.reset_stale();
                match self.offer(job).await? {
                    Offer::Accepted(accepted) => Ok(accepted),
                    Offer::Stale(_) => Err(BusError::Closed),
                }
            }
        }
    }

    async fn offer(&self, job: Job) -> Result<Offer, BusError> {
        let sender = self.sender()?;

        match self.policy {
            OverflowPolicy::Block => match sender.send(job).await {
                Ok(()) => Ok(Offer::Accepted(true)),
                Err(mpsc::error::SendError(job)) => Ok(Offer::Stale(job)),
            },
            OverflowPolicy::Drop => match sender.try_send(job) {
                Ok(()) => Ok(Offer::Accepted(true)),
                Err(mpsc::error::TrySendError::Full(_)) => {
                    let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                    warn!(capacity = self.capacity, dropped, "Async job dropped (queue full)");
                    Ok(Offer::Accepted(false))
                }
                Err(mpsc::error::TrySendError::Closed(job)) => Ok(Offer::Stale(job)),
            },
            OverflowPolicy::Spawn => match sender.try_send(job) {
                Ok(()) => Ok(Offer::Accepted(true)),
                Err(mpsc::error::TrySendError::Full(job)) => {
                    debug!(capacity = self.capacity, "Queue full, spawning detached job");
                    tokio::spawn(async move { job.run() });
                    Ok(Offer::Accepted(true))
                }
                Err(mpsc::error::TrySendError::Closed(job)) => Ok(Offer::Stale(job)),
            },
        }
    }

    /// Forget workers whose queue is gone, unless the pool was shut down.
    fn reset_stale(&self) {
        let mut state = self.state.lock();
        if let PoolState::Running { sender, .. } = &*state {
            if sender.is_closed() {
                warn!("Event bus workers are gone (runtime stopped?), respawning");
                *state = PoolState::Idle;
            }
        }
    }

    /// Resolve once every accepted job has run or been discarded.
    pub(crate) async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            if self.in_flight.load(Ordering::Acquire) == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Close the queue, let workers drain it, and join them.
    pub(crate) async fn shutdown(&self) {
        let previous = std::mem::replace(&mut *self.state.lock(), PoolState::Closed);
        let PoolState::Running { sender, workers } = previous else {
            return;
        };
        drop(sender);

        for worker in workers {
            if let Err(e) = worker.await {
                warn!(error = %e, "Event bus worker ended abnormally");
            }
        }
        debug!("Event bus worker pool shut down");
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    pub(crate) fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub(crate) fn is_closed(&self) -> bool {
        matches!(*self.state.lock(), PoolState::Closed)
    }

    fn track(&self, task: Box<dyn FnOnce() + Send + 'static>) -> Job {
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        Job {
            task,
            _in_flight: InFlight {
                count: Arc::clone(&self.in_flight),
                idle: Arc::clone(&self.idle),
            },
        }
    }

    /// Clone the queue sender, spawning the workers on first use.
    fn sender(&self) -> Result<mpsc::Sender<Job>, BusError> {
        let mut state = self.state.lock();
        match &*state {
            PoolState::Running { sender, .. } if !sender.is_closed() => {
                return Ok(sender.clone());
            }
            PoolState::Running { .. } => {
                warn!("Event bus workers are gone (runtime stopped?), respawning");
            }
            PoolState::Closed => return Err(BusError::Closed),
            PoolState::Idle => {}
        }

        let handle = Handle::try_current().map_err(|_| BusError::NoRuntime)?;
        let (sender, receiver) = mpsc::channel::<Job>(self.capacity);
        let receiver = Arc::new(tokio::sync::Mutex::new(receiver));

        let workers = (0..self.worker_count)
            .map(|worker| {
                let receiver = Arc::clone(&receiver);
                handle.spawn(async move {
                    loop {
                        let job = receiver.lock().await.recv().await;
                        match job {
                            Some(job) => job.run(),
                            None => break,
                        }
                    }
                    debug!(worker, "Event bus worker stopped");
                })
            })
            .collect();

        debug!(
            workers = self.worker_count,
            capacity = self.capacity,
            policy = %self.policy,
            "Event bus worker pool started"
        );

        *state = PoolState::Running {
            sender: sender.clone(),
            workers,
        };
        Ok(sender)
    }
}
