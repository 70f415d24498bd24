//! Serial execution contexts for the router.
//!
//! Everything the router does after a call returns (drive steps, expiry)
//! is posted to a [`Scheduler`]. Jobs posted to one scheduler run one at a
//! time, in posting order.

use crate::task::{TaskHandle, TaskTracker};
use log::warn;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

/// A unit of deferred work.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// A serial execution context.
pub trait Scheduler: Send + Sync {
    /// Run `job` soon, after the caller has returned.
    fn post(&self, job: Job);

    /// Run `job` once `delay` has elapsed, unless the returned handle is
    /// aborted first.
    fn post_after(&self, delay: Duration, job: Job) -> TaskHandle;
}

/// Serial context on a tokio runtime.
///
/// A single worker task drains the job channel, so jobs never overlap.
/// Delayed jobs sleep on their own task and then join the same channel.
pub struct TokioScheduler {
    runtime: Handle,
    tx: mpsc::UnboundedSender<Job>,
    worker: TaskHandle,
    timers: Mutex<TaskTracker>,
}

impl TokioScheduler {
    /// Create a scheduler on the current runtime.
    ///
    /// # Panics
    /// Panics when called outside of a tokio runtime.
    pub fn new() -> Self {
        Self::with_handle(Handle::current())
    }

    pub fn with_handle(runtime: Handle) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();
        let worker = runtime.spawn(async move {
            while let Some(job) = rx.recv().await {
                job();
            }
        });
        Self {
            runtime,
            tx,
            worker: TaskHandle::new(worker.abort_handle()),
            timers: Mutex::new(TaskTracker::new()),
        }
    }
}

impl Scheduler for TokioScheduler {
    fn post(&self, job: Job) {
        if self.tx.send(job).is_err() {
            warn!("Scheduler worker has stopped, dropping job");
        }
    }

    fn post_after(&self, delay: Duration, job: Job) -> TaskHandle {
        let tx = self.tx.clone();
        let task = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(job);
        });
        self.timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .track(TaskHandle::new(task.abort_handle()));
        TaskHandle::new(task.abort_handle())
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

struct Timer {
    deadline: Duration,
    seq: u64,
    job: Job,
    cancelled: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
}

#[derive(Default)]
struct LoopState {
    now: Duration,
    ready: VecDeque<Job>,
    timers: Vec<Timer>,
    seq: u64,
}

/// Serial context driven by the host's own event loop.
///
/// Time is virtual: it only moves when the host calls [`advance`](Self::advance).
/// A render loop calls `advance` with the real time elapsed since its last
/// frame; tests move the clock explicitly.
#[derive(Default)]
pub struct LoopScheduler {
    state: Mutex<LoopState>,
}

impl LoopScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LoopState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Virtual time elapsed since creation.
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Number of jobs that may still run: ready jobs plus live timers.
    pub fn pending_jobs(&self) -> usize {
        let state = self.lock();
        let timers = state
            .timers
            .iter()
            .filter(|t| !t.cancelled.load(Ordering::SeqCst))
            .count();
        state.ready.len() + timers
    }

    /// Run ready jobs and due timers until none are left, including jobs
    /// posted by the jobs themselves. Returns how many jobs ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            let next = {
                let mut state = self.lock();
                match state.ready.pop_front() {
                    Some(job) => Some((job, None)),
                    None => Self::take_due_timer(&mut state)
                        .map(|timer| (timer.job, Some(timer.finished))),
                }
            };
            let Some((job, finished)) = next else {
                break;
            };
            job();
            if let Some(finished) = finished {
                finished.store(true, Ordering::SeqCst);
            }
            ran += 1;
        }
        ran
    }

    /// Move the clock forward by `by`, firing timers at their deadlines in
    /// order. Returns how many jobs ran.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now() + by;
        let mut ran = self.run_pending();
        loop {
            let next_deadline = {
                let mut state = self.lock();
                state.timers.retain(|t| !t.cancelled.load(Ordering::SeqCst));
                let next = state
                    .timers
                    .iter()
                    .map(|t| t.deadline)
                    .filter(|deadline| *deadline <= target)
                    .min();
                if let Some(deadline) = next {
                    state.now = state.now.max(deadline);
                }
                next
            };
            if next_deadline.is_none() {
                break;
            }
            ran += self.run_pending();
        }
        self.lock().now = target;
        ran + self.run_pending()
    }

    fn take_due_timer(state: &mut LoopState) -> Option<Timer> {
        state.timers.retain(|t| !t.cancelled.load(Ordering::SeqCst));
        let now = state.now;
        let index = state
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.deadline <= now)
            .min_by_key(|(_, t)| (t.deadline, t.seq))
            .map(|(index, _)| index)?;
        Some(state.timers.remove(index))
    }
}

impl Scheduler for LoopScheduler {
    fn post(&self, job: Job) {
        self.lock().ready.push_back(job);
    }

    fn post_after(&self, delay: Duration, job: Job) -> TaskHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        let finished = Arc::new(AtomicBool::new(false));
        let mut state = self.lock();
        state.seq += 1;
        let timer = Timer {
            deadline: state.now + delay,
            seq: state.seq,
            job,
            cancelled: Arc::clone(&cancelled),
            finished: Arc::clone(&finished),
        };
        state.timers.push(timer);
        TaskHandle::from_flags(cancelled, finished)
    }
}
