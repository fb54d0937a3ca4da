//! Event queue: the hand-off point between the input thread and the frame loop.
//!
//! The producer appends under a short lock; the consumer swaps the whole
//! backlog out in one step, so a frame never holds the lock while it
//! processes keys.

use super::messages::KeyEvent;
use parking_lot::Mutex;

/// Thread-safe FIFO of key events.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Mutex<Vec<KeyEvent>>,
}

impl EventQueue {
    /// Create an empty queue.
    pub const fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    /// Append an event.
    pub fn push(&self, event: KeyEvent) {
        self.events.lock().push(event);
    }

    /// Take every queued event, oldest first, leaving the queue empty.
    pub fn consume_all(&self) -> Vec<KeyEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Number of events waiting.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Check whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::KeyCode;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_consume_all_preserves_order() {
        let queue = EventQueue::new();
        queue.push(KeyEvent::char('a'));
        queue.push(KeyEvent::new(KeyCode::Esc));
        queue.push(KeyEvent::char('b'));

        let drained = queue.consume_all();
        assert_eq!(
            drained,
            vec![
                KeyEvent::char('a'),
                KeyEvent::new(KeyCode::Esc),
                KeyEvent::char('b'),
            ]
        );
        assert!(queue.is_empty());
        assert!(queue.consume_all().is_empty());
    }

    #[test]
    fn test_concurrent_push_and_drain() {
        const TOTAL: u32 = 20_000;
        let queue = Arc::new(EventQueue::new());

        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for i in 0..TOTAL {
                    let c = char::from_u32(0x4E00 + i).unwrap_or('?');
                    queue.push(KeyEvent::char(c));
                }
            })
        };

        let mut seen = Vec::with_capacity(TOTAL as usize);
        while seen.len() < TOTAL as usize {
            seen.extend(queue.consume_all());
            thread::yield_now();
        }
        producer.join().unwrap();
        seen.extend(queue.consume_all());

        assert_eq!(seen.len(), TOTAL as usize);
        for (i, event) in seen.iter().enumerate() {
            let expected = char::from_u32(0x4E00 + i as u32).unwrap();
            assert_eq!(event.as_char(), Some(expected));
        }
    }
}
