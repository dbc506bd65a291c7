//! Task subsystems
//!
//! Three flavors of off-main-path work, all isolated so a faulty task can
//! never halt a frame or kill a worker thread:
//!
//! - [`FrameTaskQueue`]: one-shot runnables submitted from any thread and
//!   drained once per frame on the simulation thread, in submission order.
//! - [`TaskExecutor`]: fire-and-forget background work on worker threads
//!   with pollable [`TaskHandle`] results.
//! - [`FrameSpreadScheduler`]: multi-frame tasks stepped once per frame
//!   under a per-frame budget, recycled through explicit pools.

pub mod executor;
pub mod frame_spread;
pub mod queue;

pub use executor::{TaskExecutor, TaskHandle, TaskOutcome};
pub use frame_spread::{FrameSpreadHandle, FrameSpreadScheduler, FrameSpreadTask};
pub use queue::{FrameTaskHandle, FrameTaskQueue};

use std::any::Any;

/// Best-effort extraction of a panic payload's message
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
