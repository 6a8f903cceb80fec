use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::event::Event;

/// A simple FIFO event queue with shared, single-threaded handles.
///
/// Store hooks hold a clone and publish into it. The page drains it right
/// after the mutating call, so every event is handled in the same turn that
/// produced it.
#[derive(Clone)]
pub struct EventBus {
    queue: Rc<RefCell<VecDeque<Event>>>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Create an empty event bus.
    pub fn new() -> Self {
        Self {
            queue: Rc::new(RefCell::new(VecDeque::new())),
        }
    }

    /// Enqueue an event at the back of the queue.
    pub fn publish(&self, event: Event) {
        self.queue.borrow_mut().push_back(event);
    }

    /// Remove and return all pending events, preserving insertion order.
    pub fn drain(&self) -> Vec<Event> {
        self.queue.borrow_mut().drain(..).collect()
    }

    /// Return `true` if the queue contains at least one event.
    pub fn has_pending(&self) -> bool {
        !self.queue.borrow().is_empty()
    }
}
