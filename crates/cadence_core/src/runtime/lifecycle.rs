//! Application lifecycle plumbing
//!
//! Host threads request pause/resume/destroy at any time through
//! [`LifecycleFlags`]; the frame loop captures all pending requests under a
//! single critical section at the start of each frame and acts on each
//! exactly once, in a fixed order relative to that frame's update and render
//! work.

use std::sync::{Arc, Mutex};

bitflags::bitflags! {
    /// Pending lifecycle requests captured once per frame
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub(crate) struct LifecycleRequests: u8 {
        const RESUME = 1;
        const PAUSE = 1 << 1;
        const DESTROY = 1 << 2;
    }
}

/// Cross-thread lifecycle request flags
#[derive(Clone, Default)]
pub struct LifecycleFlags {
    inner: Arc<Mutex<LifecycleRequests>>,
}

impl LifecycleFlags {
    /// Create an empty flag set
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a resume notification on the next frame
    pub fn request_resume(&self) {
        self.inner.lock().unwrap().insert(LifecycleRequests::RESUME);
    }

    /// Request a pause notification on the next frame
    pub fn request_pause(&self) {
        self.inner.lock().unwrap().insert(LifecycleRequests::PAUSE);
    }

    /// Request destruction after the next frame's final render
    pub fn request_destroy(&self) {
        self.inner.lock().unwrap().insert(LifecycleRequests::DESTROY);
    }

    /// Atomically capture and clear all pending requests
    pub(crate) fn take(&self) -> LifecycleRequests {
        std::mem::take(&mut *self.inner.lock().unwrap())
    }
}

/// Observer for application-level lifecycle transitions
pub trait ApplicationLifecycleListener: Send + Sync {
    /// The application resumed; fires before any update in the same frame
    fn resume(&self) {}

    /// The application paused; fires after that frame's render
    fn pause(&self) {}

    /// The application is shutting down; fires after the final render
    fn dispose(&self) {}
}
