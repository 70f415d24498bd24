//! Cancellable handles for scheduled work.
//!
//! Provides `TaskHandle` for a single delayed job and `TaskTracker` for
//! groups of jobs that should be cancelled together (e.g., when a scheduler
//! shuts down).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::AbortHandle;

#[derive(Debug)]
enum Cancel {
    /// A spawned tokio task.
    Abort(AbortHandle),
    /// A job held by a host-driven scheduler.
    Flag {
        cancelled: Arc<AtomicBool>,
        finished: Arc<AtomicBool>,
    },
}

/// A handle to scheduled work that can be cancelled before it runs.
#[derive(Debug)]
pub struct TaskHandle {
    cancel: Cancel,
}

impl TaskHandle {
    /// Create a new TaskHandle from an AbortHandle.
    pub fn new(abort_handle: AbortHandle) -> Self {
        Self {
            cancel: Cancel::Abort(abort_handle),
        }
    }

    /// Create a handle driven by shared flags. The scheduler owning the job
    /// must check `cancelled` before running it and set `finished` afterwards.
    pub fn from_flags(cancelled: Arc<AtomicBool>, finished: Arc<AtomicBool>) -> Self {
        Self {
            cancel: Cancel::Flag {
                cancelled,
                finished,
            },
        }
    }

    /// Cancel the work. A job that already started is not interrupted.
    pub fn abort(&self) {
        match &self.cancel {
            Cancel::Abort(handle) => handle.abort(),
            Cancel::Flag {
                cancelled,
                finished,
            } => {
                cancelled.store(true, Ordering::SeqCst);
                finished.store(true, Ordering::SeqCst);
            }
        }
    }

    /// Check if the work has finished (either completed or cancelled).
    pub fn is_finished(&self) -> bool {
        match &self.cancel {
            Cancel::Abort(handle) => handle.is_finished(),
            Cancel::Flag { finished, .. } => finished.load(Ordering::SeqCst),
        }
    }
}

/// A collection of task handles that can be cancelled together.
#[derive(Debug, Default)]
pub struct TaskTracker {
    handles: Vec<TaskHandle>,
}

impl TaskTracker {
    /// Create a new empty TaskTracker.
    pub fn new() -> Self {
        Self {
            handles: Vec::new(),
        }
    }

    /// Track a task handle. The task will be aborted when `abort_all` is called.
    pub fn track(&mut self, handle: TaskHandle) {
        // Clean up finished tasks while adding new ones
        self.handles.retain(|h| !h.is_finished());
        self.handles.push(handle);
    }

    /// Abort all tracked tasks.
    pub fn abort_all(&mut self) {
        for handle in self.handles.drain(..) {
            handle.abort();
        }
    }

    /// Get the number of active (non-finished) tracked tasks.
    pub fn active_count(&self) -> usize {
        self.handles.iter().filter(|h| !h.is_finished()).count()
    }

    pub fn has_active_tasks(&self) -> bool {
        self.handles.iter().any(|h| !h.is_finished())
    }
}

impl Drop for TaskTracker {
    fn drop(&mut self) {
        self.abort_all();
    }
}
