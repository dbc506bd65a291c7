//! Deferred cross-thread runnable queue
//!
//! Background threads enqueue runnables at any time; the simulation thread
//! drains the queue exactly once per frame. Every runnable submitted before
//! the drain point executes once, in submission order. Runnables submitted
//! during the drain land in the fresh queue and run next frame, keeping
//! per-frame work bounded.

use super::panic_message;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct FrameTaskState {
    completed: AtomicBool,
    cancelled: AtomicBool,
    failed: AtomicBool,
}

/// Pollable handle onto a queued runnable
#[derive(Clone)]
pub struct FrameTaskHandle {
    state: Arc<FrameTaskState>,
}

impl FrameTaskHandle {
    /// Whether the runnable has been processed by a drain
    ///
    /// Cancelled runnables also report completed once the drain passes them.
    pub fn is_completed(&self) -> bool {
        self.state.completed.load(Ordering::SeqCst)
    }

    /// Whether the runnable panicked when executed
    pub fn has_failed(&self) -> bool {
        self.state.failed.load(Ordering::SeqCst)
    }

    /// Mark the runnable cancelled; the drain skips its payload
    pub fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether the runnable was cancelled
    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::SeqCst)
    }
}

struct QueuedTask {
    task: Box<dyn FnOnce() + Send>,
    state: Arc<FrameTaskState>,
}

/// Thread-safe queue of runnables drained once per frame
#[derive(Clone, Default)]
pub struct FrameTaskQueue {
    inner: Arc<Mutex<VecDeque<QueuedTask>>>,
}

impl FrameTaskQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a runnable for the next drain; callable from any thread
    pub fn submit<F>(&self, task: F) -> FrameTaskHandle
    where
        F: FnOnce() + Send + 'static,
    {
        let state = Arc::new(FrameTaskState::default());
        let handle = FrameTaskHandle {
            state: state.clone(),
        };
        self.inner.lock().unwrap().push_back(QueuedTask {
            task: Box::new(task),
            state,
        });
        handle
    }

    /// Execute every runnable submitted before this call, in order
    ///
    /// Called once per frame from the simulation thread. A panicking
    /// runnable is logged and marked failed; the drain continues. Returns
    /// the number of runnables processed.
    pub fn drain(&self) -> usize {
        // Swap the queue out so submissions made by draining tasks are
        // deferred to the next frame instead of executing re-entrantly.
        let batch = std::mem::take(&mut *self.inner.lock().unwrap());
        let drained = batch.len();
        for QueuedTask { task, state } in batch {
            if state.cancelled.load(Ordering::SeqCst) {
                state.completed.store(true, Ordering::SeqCst);
                continue;
            }
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(task)) {
                state.failed.store(true, Ordering::SeqCst);
                log::error!(
                    "deferred frame task panicked: {}",
                    panic_message(payload.as_ref())
                );
            }
            state.completed.store(true, Ordering::SeqCst);
        }
        drained
    }

    /// Number of runnables waiting for the next drain
    pub fn pending(&self) -> usize {
        self.inner.lock().unwrap().len()
    }
}
