//! Explicit object pools
//!
//! A [`Pool`] is owned by the subsystem that recycles through it and passed
//! by dependency, never held in process-wide statics. The frame-spread task
//! scheduler returns finished tasks to a pool so steady-state frames allocate
//! nothing.

use std::sync::{Arc, Mutex};

/// Default cap on idle objects retained by a pool
pub const DEFAULT_MAX_IDLE: usize = 64;

/// A bounded pool of reusable objects
#[derive(Debug)]
pub struct Pool<T> {
    idle: Vec<T>,
    max_idle: usize,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Pool<T> {
    /// Create an empty pool retaining up to [`DEFAULT_MAX_IDLE`] idle objects
    pub fn new() -> Self {
        Self::with_max_idle(DEFAULT_MAX_IDLE)
    }

    /// Create an empty pool retaining up to `max_idle` idle objects
    pub fn with_max_idle(max_idle: usize) -> Self {
        Self {
            idle: Vec::new(),
            max_idle,
        }
    }

    /// Take an object out of the pool, if one is available
    pub fn acquire(&mut self) -> Option<T> {
        self.idle.pop()
    }

    /// Take a pooled object or construct a fresh one
    pub fn acquire_or_else(&mut self, create: impl FnOnce() -> T) -> T {
        self.idle.pop().unwrap_or_else(create)
    }

    /// Return an object to the pool
    ///
    /// Objects beyond the idle cap are dropped.
    pub fn release(&mut self, value: T) {
        if self.idle.len() < self.max_idle {
            self.idle.push(value);
        }
    }

    /// Number of idle objects currently held
    pub fn idle_count(&self) -> usize {
        self.idle.len()
    }
}

/// A pool shared between a submitter and the scheduler recycling into it
pub type SharedPool<T> = Arc<Mutex<Pool<T>>>;

/// Convenience constructor for a [`SharedPool`]
pub fn shared_pool<T>() -> SharedPool<T> {
    Arc::new(Mutex::new(Pool::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_from_empty_pool() {
        let mut pool: Pool<u32> = Pool::new();
        assert_eq!(pool.acquire(), None);
        assert_eq!(pool.acquire_or_else(|| 7), 7);
    }

    #[test]
    fn test_release_then_acquire_recycles() {
        let mut pool = Pool::new();
        pool.release(String::from("buffer"));
        assert_eq!(pool.idle_count(), 1);
        assert_eq!(pool.acquire(), Some(String::from("buffer")));
        assert_eq!(pool.idle_count(), 0);
    }

    #[test]
    fn test_idle_cap_drops_excess() {
        let mut pool = Pool::with_max_idle(2);
        pool.release(1);
        pool.release(2);
        pool.release(3);
        assert_eq!(pool.idle_count(), 2);
    }
}
