//! Input seam
//!
//! The frame loop drains pending input exactly once per fixed step, before
//! systems update, through the [`InputSource`] trait. Platform shims push
//! raw events from their callback threads into a [`QueuedInputSource`];
//! the simulation thread folds them into an [`InputState`] snapshot that
//! systems and background readers can inspect.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, RwLock};

/// Drains pending input events into system-visible state
pub trait InputSource: Send {
    /// Called once per fixed step, before systems update
    fn process_events(&mut self);
}

/// A raw input event as delivered by a platform shim
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Key went down
    KeyPressed(u32),
    /// Key went up
    KeyReleased(u32),
    /// Pointer moved to a position
    PointerMoved {
        /// New X coordinate
        x: f32,
        /// New Y coordinate
        y: f32,
    },
    /// Pointer button changed state
    PointerButton {
        /// Button index
        button: u8,
        /// Whether the button went down
        pressed: bool,
    },
}

/// Snapshot of folded input state
#[derive(Debug, Clone, Default)]
pub struct InputState {
    keys_down: HashSet<u32>,
    buttons_down: HashSet<u8>,
    pointer: (f32, f32),
}

impl InputState {
    /// Whether a key is currently held
    pub fn is_key_down(&self, key: u32) -> bool {
        self.keys_down.contains(&key)
    }

    /// Whether a pointer button is currently held
    pub fn is_button_down(&self, button: u8) -> bool {
        self.buttons_down.contains(&button)
    }

    /// Last known pointer position
    pub fn pointer(&self) -> (f32, f32) {
        self.pointer
    }

    fn apply(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::KeyPressed(key) => {
                self.keys_down.insert(key);
            }
            InputEvent::KeyReleased(key) => {
                self.keys_down.remove(&key);
            }
            InputEvent::PointerMoved { x, y } => {
                self.pointer = (x, y);
            }
            InputEvent::PointerButton { button, pressed } => {
                if pressed {
                    self.buttons_down.insert(button);
                } else {
                    self.buttons_down.remove(&button);
                }
            }
        }
    }
}

/// Cloneable producer handle for pushing events from host callback threads
#[derive(Clone, Default)]
pub struct InputQueue {
    events: Arc<Mutex<VecDeque<InputEvent>>>,
}

impl InputQueue {
    /// Enqueue an event for the next fixed step's drain
    pub fn push(&self, event: InputEvent) {
        self.events.lock().unwrap().push_back(event);
    }

    /// Number of events waiting to be drained
    pub fn pending(&self) -> usize {
        self.events.lock().unwrap().len()
    }
}

/// Read-only handle onto the folded input state
#[derive(Clone)]
pub struct InputStateReader {
    state: Arc<RwLock<InputState>>,
}

impl InputStateReader {
    /// Copy the current state
    pub fn snapshot(&self) -> InputState {
        self.state.read().unwrap().clone()
    }
}

/// Thread-safe queued input source for host-driven backends
#[derive(Default)]
pub struct QueuedInputSource {
    queue: InputQueue,
    state: Arc<RwLock<InputState>>,
}

impl QueuedInputSource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Producer handle for platform callbacks
    pub fn queue(&self) -> InputQueue {
        self.queue.clone()
    }

    /// Reader handle onto the folded state
    pub fn state_reader(&self) -> InputStateReader {
        InputStateReader {
            state: self.state.clone(),
        }
    }
}

impl InputSource for QueuedInputSource {
    fn process_events(&mut self) {
        let drained: Vec<InputEvent> = {
            let mut events = self.queue.events.lock().unwrap();
            events.drain(..).collect()
        };
        if drained.is_empty() {
            return;
        }
        let mut state = self.state.write().unwrap();
        for event in &drained {
            state.apply(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_fold_into_state() {
        let mut source = QueuedInputSource::new();
        let queue = source.queue();
        let reader = source.state_reader();

        queue.push(InputEvent::KeyPressed(32));
        queue.push(InputEvent::PointerMoved { x: 10.0, y: 20.0 });
        queue.push(InputEvent::PointerButton { button: 0, pressed: true });
        assert_eq!(queue.pending(), 3);

        source.process_events();
        let state = reader.snapshot();
        assert!(state.is_key_down(32));
        assert!(state.is_button_down(0));
        assert_eq!(state.pointer(), (10.0, 20.0));
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn test_release_clears_held_state() {
        let mut source = QueuedInputSource::new();
        let queue = source.queue();

        queue.push(InputEvent::KeyPressed(7));
        source.process_events();
        queue.push(InputEvent::KeyReleased(7));
        queue.push(InputEvent::PointerButton { button: 1, pressed: true });
        queue.push(InputEvent::PointerButton { button: 1, pressed: false });
        source.process_events();

        let state = source.state_reader().snapshot();
        assert!(!state.is_key_down(7));
        assert!(!state.is_button_down(1));
    }

    #[test]
    fn test_events_pushed_from_another_thread() {
        let mut source = QueuedInputSource::new();
        let queue = source.queue();

        let producer = std::thread::spawn(move || {
            for key in 0..10 {
                queue.push(InputEvent::KeyPressed(key));
            }
        });
        producer.join().expect("producer thread");

        source.process_events();
        let state = source.state_reader().snapshot();
        for key in 0..10 {
            assert!(state.is_key_down(key));
        }
    }
}
