//! Background task executor
//!
//! A fixed pool of worker threads fed by a crossbeam channel. Submission
//! never blocks the caller; results come back through pollable
//! [`TaskHandle`]s. A panicking task is caught and reported through its
//! handle; the worker thread survives.

use super::panic_message;
use crate::core::config::ConfigError;
use crossbeam::channel::{unbounded, Receiver, Sender};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

/// Final state of a background task
#[derive(Debug)]
pub enum TaskOutcome<T> {
    /// The task ran to completion
    Finished(T),
    /// The task panicked; carries the panic message
    Failed(String),
    /// The task was cancelled before its payload ran
    Cancelled,
}

struct TaskShared<T> {
    result: Mutex<Option<TaskOutcome<T>>>,
    done: AtomicBool,
    cancelled: AtomicBool,
}

/// Pollable result handle for a submitted task
pub struct TaskHandle<T> {
    shared: Arc<TaskShared<T>>,
}

impl<T> TaskHandle<T> {
    /// Whether the task has been processed by a worker
    ///
    /// Cancelled tasks report done once a worker dequeues and skips them.
    pub fn is_done(&self) -> bool {
        self.shared.done.load(Ordering::SeqCst)
    }

    /// Request cancellation; a payload that has not started yet is skipped
    pub fn cancel(&self) {
        self.shared.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.shared.cancelled.load(Ordering::SeqCst)
    }

    /// Take the outcome if the task has finished; never blocks
    ///
    /// Returns `None` while the task is still pending and after the outcome
    /// has already been taken.
    pub fn poll(&self) -> Option<TaskOutcome<T>> {
        if !self.is_done() {
            return None;
        }
        self.shared.result.lock().unwrap().take()
    }
}

type Job = Box<dyn FnOnce() + Send + 'static>;

struct Worker {
    thread: Option<thread::JoinHandle<()>>,
}

impl Worker {
    fn new(id: usize, receiver: Receiver<Job>) -> Self {
        let thread = thread::spawn(move || {
            log::trace!("task worker {id} started");
            while let Ok(job) = receiver.recv() {
                job();
            }
            log::trace!("task worker {id} stopped");
        });
        Self {
            thread: Some(thread),
        }
    }
}

/// Worker-thread pool with pollable result handles
pub struct TaskExecutor {
    workers: Vec<Worker>,
    sender: Option<Sender<Job>>,
}

impl TaskExecutor {
    /// Spawn an executor with the given number of worker threads
    pub fn new(worker_count: usize) -> Result<Self, ConfigError> {
        if worker_count == 0 {
            return Err(ConfigError::Invalid {
                field: "task_workers",
                reason: "must be at least 1".to_string(),
            });
        }
        let (sender, receiver) = unbounded::<Job>();
        let workers = (0..worker_count)
            .map(|id| Worker::new(id, receiver.clone()))
            .collect();
        Ok(Self {
            workers,
            sender: Some(sender),
        })
    }

    /// Submit a task; returns immediately with a pollable handle
    pub fn submit<T, F>(&self, task: F) -> TaskHandle<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let shared = Arc::new(TaskShared {
            result: Mutex::new(None),
            done: AtomicBool::new(false),
            cancelled: AtomicBool::new(false),
        });
        let handle = TaskHandle {
            shared: shared.clone(),
        };

        let job: Job = Box::new(move || {
            let outcome = if shared.cancelled.load(Ordering::SeqCst) {
                TaskOutcome::Cancelled
            } else {
                match panic::catch_unwind(AssertUnwindSafe(task)) {
                    Ok(value) => TaskOutcome::Finished(value),
                    Err(payload) => {
                        let message = panic_message(payload.as_ref());
                        log::error!("background task panicked: {message}");
                        TaskOutcome::Failed(message)
                    }
                }
            };
            *shared.result.lock().unwrap() = Some(outcome);
            shared.done.store(true, Ordering::SeqCst);
        });

        if let Some(sender) = &self.sender {
            if sender.send(job).is_err() {
                // Workers are gone; report failure through the handle.
                *handle.shared.result.lock().unwrap() =
                    Some(TaskOutcome::Failed("executor shut down".to_string()));
                handle.shared.done.store(true, Ordering::SeqCst);
            }
        }
        handle
    }

    /// Number of worker threads
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for TaskExecutor {
    fn drop(&mut self) {
        // Closing the channel stops the workers once the backlog drains.
        self.sender.take();
        for worker in &mut self.workers {
            if let Some(thread) = worker.thread.take() {
                let _ = thread.join();
            }
        }
    }
}
