//! Frame-spread tasks
//!
//! A frame-spread task splits a long-running job into slices executed once
//! per frame on the simulation thread. The scheduler steps at most
//! `max_per_frame` tasks each frame; unstepped tasks keep their place in the
//! queue. Finished and cancelled tasks are reset and returned to the
//! explicit [`Pool`](crate::foundation::pool::Pool) they were submitted
//! with, so steady-state frames allocate nothing.

use super::panic_message;
use crate::foundation::pool::SharedPool;
use crate::runtime::GameContext;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A task executed one slice per frame
pub trait FrameSpreadTask: Send + 'static {
    /// Run one slice; return `true` when the task has finished
    fn step(&mut self, ctx: &mut GameContext) -> bool;

    /// Clear state before the task returns to its pool
    fn reset(&mut self) {}
}

#[derive(Debug, Default)]
struct FrameSpreadShared {
    completed: AtomicBool,
    cancelled: AtomicBool,
}

/// Pollable handle onto a submitted frame-spread task
#[derive(Clone)]
pub struct FrameSpreadHandle {
    shared: Arc<FrameSpreadShared>,
}

impl FrameSpreadHandle {
    /// Whether the task has finished or been cancelled-and-retired
    pub fn is_completed(&self) -> bool {
        self.shared.completed.load(Ordering::SeqCst)
    }

    /// Stop the task before its next slice; it returns to its pool unrun
    pub fn cancel(&self) {
        self.shared.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.shared.cancelled.load(Ordering::SeqCst)
    }
}

trait ActiveTask: Send {
    fn step(&mut self, ctx: &mut GameContext) -> bool;
    fn recycle(&mut self);
}

struct PooledEntry<T: FrameSpreadTask> {
    task: Option<T>,
    pool: Option<SharedPool<T>>,
}

impl<T: FrameSpreadTask> ActiveTask for PooledEntry<T> {
    fn step(&mut self, ctx: &mut GameContext) -> bool {
        match self.task.as_mut() {
            Some(task) => task.step(ctx),
            None => true,
        }
    }

    fn recycle(&mut self) {
        if let Some(mut task) = self.task.take() {
            task.reset();
            if let Some(pool) = &self.pool {
                pool.lock().unwrap().release(task);
            }
        }
    }
}

/// Steps frame-spread tasks under a per-frame budget
pub struct FrameSpreadScheduler {
    active: VecDeque<(Box<dyn ActiveTask>, Arc<FrameSpreadShared>)>,
    max_per_frame: usize,
}

impl FrameSpreadScheduler {
    /// Create a scheduler stepping at most `max_per_frame` tasks each frame
    ///
    /// The budget comes from a validated
    /// [`LoopConfig`](crate::core::LoopConfig), so it is at least 1.
    pub fn new(max_per_frame: usize) -> Self {
        Self {
            active: VecDeque::new(),
            max_per_frame,
        }
    }

    /// Submit a task; it is dropped when finished
    pub fn submit<T: FrameSpreadTask>(&mut self, task: T) -> FrameSpreadHandle {
        self.submit_entry(PooledEntry {
            task: Some(task),
            pool: None,
        })
    }

    /// Submit a task that returns to `pool` when finished or cancelled
    pub fn submit_pooled<T: FrameSpreadTask>(
        &mut self,
        task: T,
        pool: SharedPool<T>,
    ) -> FrameSpreadHandle {
        self.submit_entry(PooledEntry {
            task: Some(task),
            pool: Some(pool),
        })
    }

    fn submit_entry<T: FrameSpreadTask>(&mut self, entry: PooledEntry<T>) -> FrameSpreadHandle {
        let shared = Arc::new(FrameSpreadShared::default());
        let handle = FrameSpreadHandle {
            shared: shared.clone(),
        };
        self.active.push_back((Box::new(entry), shared));
        handle
    }

    /// Step up to the per-frame budget of tasks; called once per frame
    ///
    /// A panicking slice retires its task (logged, recycled) rather than
    /// halting the frame.
    pub fn step_frame(&mut self, ctx: &mut GameContext) {
        let budget = self.max_per_frame.min(self.active.len());
        for _ in 0..budget {
            let Some((mut entry, shared)) = self.active.pop_front() else {
                break;
            };
            if shared.cancelled.load(Ordering::SeqCst) {
                entry.recycle();
                shared.completed.store(true, Ordering::SeqCst);
                continue;
            }
            let finished = match panic::catch_unwind(AssertUnwindSafe(|| entry.step(ctx))) {
                Ok(finished) => finished,
                Err(payload) => {
                    log::error!(
                        "frame-spread task panicked: {}",
                        panic_message(payload.as_ref())
                    );
                    true
                }
            };
            if finished {
                entry.recycle();
                shared.completed.store(true, Ordering::SeqCst);
            } else {
                self.active.push_back((entry, shared));
            }
        }
    }

    /// Number of tasks currently queued or in flight
    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LoopConfig;
    use crate::foundation::pool::shared_pool;
    use std::sync::atomic::AtomicUsize;

    struct CountdownTask {
        remaining: u32,
        steps_taken: Arc<AtomicUsize>,
    }

    impl FrameSpreadTask for CountdownTask {
        fn step(&mut self, _ctx: &mut GameContext) -> bool {
            self.steps_taken.fetch_add(1, Ordering::SeqCst);
            self.remaining -= 1;
            self.remaining == 0
        }

        fn reset(&mut self) {
            self.remaining = 0;
        }
    }

    fn context() -> GameContext {
        GameContext::new(&LoopConfig::default()).expect("valid default config")
    }

    #[test]
    fn test_task_spread_across_frames() {
        let mut scheduler = FrameSpreadScheduler::new(8);
        let mut ctx = context();
        let steps = Arc::new(AtomicUsize::new(0));
        let handle = scheduler.submit(CountdownTask {
            remaining: 3,
            steps_taken: steps.clone(),
        });

        scheduler.step_frame(&mut ctx);
        scheduler.step_frame(&mut ctx);
        assert!(!handle.is_completed());
        scheduler.step_frame(&mut ctx);

        assert!(handle.is_completed());
        assert_eq!(steps.load(Ordering::SeqCst), 3);
        assert_eq!(scheduler.active_count(), 0);
    }

    #[test]
    fn test_per_frame_budget_limits_stepping() {
        let mut scheduler = FrameSpreadScheduler::new(2);
        let mut ctx = context();
        let steps = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            scheduler.submit(CountdownTask {
                remaining: 1,
                steps_taken: steps.clone(),
            });
        }

        scheduler.step_frame(&mut ctx);
        assert_eq!(steps.load(Ordering::SeqCst), 2, "budget of 2 per frame");
        assert_eq!(scheduler.active_count(), 1);

        scheduler.step_frame(&mut ctx);
        assert_eq!(steps.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_finished_task_returns_to_pool() {
        let pool = shared_pool::<CountdownTask>();
        let mut scheduler = FrameSpreadScheduler::new(4);
        let mut ctx = context();
        let steps = Arc::new(AtomicUsize::new(0));

        scheduler.submit_pooled(
            CountdownTask {
                remaining: 1,
                steps_taken: steps.clone(),
            },
            pool.clone(),
        );
        scheduler.step_frame(&mut ctx);

        assert_eq!(pool.lock().unwrap().idle_count(), 1);
        let recycled = pool.lock().unwrap().acquire().expect("recycled task");
        assert_eq!(recycled.remaining, 0, "reset before pooling");
    }

    #[test]
    fn test_cancelled_task_recycled_without_running() {
        let pool = shared_pool::<CountdownTask>();
        let mut scheduler = FrameSpreadScheduler::new(4);
        let mut ctx = context();
        let steps = Arc::new(AtomicUsize::new(0));

        let handle = scheduler.submit_pooled(
            CountdownTask {
                remaining: 5,
                steps_taken: steps.clone(),
            },
            pool.clone(),
        );
        handle.cancel();
        scheduler.step_frame(&mut ctx);

        assert_eq!(steps.load(Ordering::SeqCst), 0, "payload never ran");
        assert!(handle.is_completed(), "cancelled still counts as completed");
        assert_eq!(pool.lock().unwrap().idle_count(), 1);
    }

    #[test]
    fn test_panicking_slice_retires_task() {
        struct ExplodingTask;
        impl FrameSpreadTask for ExplodingTask {
            fn step(&mut self, _ctx: &mut GameContext) -> bool {
                panic!("slice failure");
            }
        }

        let mut scheduler = FrameSpreadScheduler::new(4);
        let mut ctx = context();
        let handle = scheduler.submit(ExplodingTask);
        scheduler.step_frame(&mut ctx);

        assert!(handle.is_completed());
        assert_eq!(scheduler.active_count(), 0);
    }
}
