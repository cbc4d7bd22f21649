use std::collections::VecDeque;

use crate::event::Event;

/// FIFO queue between input polling and the game.
///
/// Each loop iteration the shell publishes pointer, key and tick events,
/// then drains them in arrival order and feeds them to the game. Because the
/// queue is drained once per iteration, a pointer release is always applied
/// before the tick that follows it.
pub struct EventBus {
    queue: VecDeque<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    pub fn publish(&mut self, event: Event) {
        self.queue.push_back(event);
    }

    /// Remove and return all pending events, preserving insertion order.
    pub fn drain(&mut self) -> Vec<Event> {
        self.queue.drain(..).collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
