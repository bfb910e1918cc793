use crate::core::errors::SimError;
use crate::core::values::{Value, ValueType};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

/// An externally timed event waiting in an [`EventQueue`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedEvent {
    /// Unique identifier assigned on enqueue
    pub id: Uuid,
    /// Producer-supplied timestamp
    pub timestamp: u64,
    /// Payload delivered to the wired port
    pub value: Value,
}

struct QueueState {
    events: VecDeque<QueuedEvent>,
}

/// Bounded FIFO of timed events feeding a part.
///
/// Cloning yields another handle to the same buffer, so a producer on
/// another thread can enqueue while the engine dequeues between or inside
/// steps.
#[derive(Clone)]
pub struct EventQueue {
    path: Arc<str>,
    element_type: ValueType,
    capacity: usize,
    state: Arc<Mutex<QueueState>>,
}

impl EventQueue {
    /// Create an empty queue
    pub fn new(path: &str, element_type: ValueType, capacity: usize) -> Self {
        Self {
            path: Arc::from(path),
            element_type,
            capacity,
            state: Arc::new(Mutex::new(QueueState {
                events: VecDeque::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        // A panicking producer cannot leave the deque half-updated.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append an event at the tail.
    ///
    /// Fails with [`SimError::Overflow`] when the queue is at capacity; the
    /// queue is left unchanged.
    pub fn enqueue(&self, value: Value, timestamp: u64) -> Result<Uuid, SimError> {
        if value.value_type() != self.element_type {
            return Err(SimError::QueueTypeMismatch {
                queue: self.path.to_string(),
                expected: self.element_type,
                found: value.value_type(),
            });
        }

        let mut state = self.lock();
        if state.events.len() >= self.capacity {
            warn!("[{}] Dropping enqueue at t={}: queue full ({})", self.path, timestamp, self.capacity);
            return Err(SimError::Overflow {
                queue: self.path.to_string(),
                capacity: self.capacity,
            });
        }

        let id = Uuid::new_v4();
        state.events.push_back(QueuedEvent { id, timestamp, value });
        Ok(id)
    }

    /// Pop the head event; `None` means "no event" and never blocks
    pub fn dequeue(&self) -> Option<QueuedEvent> {
        self.lock().events.pop_front()
    }

    /// Look at the head event without removing it
    pub fn peek(&self) -> Option<QueuedEvent> {
        self.lock().events.front().cloned()
    }

    /// Pop the head event only if it is the event `id`
    pub(crate) fn remove_head(&self, id: Uuid) -> Option<QueuedEvent> {
        let mut state = self.lock();
        match state.events.front() {
            Some(head) if head.id == id => state.events.pop_front(),
            _ => None,
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.lock().events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn element_type(&self) -> ValueType {
        self.element_type
    }

    /// Fully qualified path of the queue
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl std::fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventQueue")
            .field("path", &self.path)
            .field("element_type", &self.element_type)
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overflow_on_capacity_plus_one() {
        let queue = EventQueue::new("top.ticks", ValueType::Int, 3);
        let mut overflows = 0;
        for t in 0..4 {
            if let Err(e) = queue.enqueue(Value::Int(t as i64), t) {
                assert!(matches!(e, SimError::Overflow { capacity: 3, .. }));
                assert_eq!(t, 3, "only the last enqueue may overflow");
                overflows += 1;
            }
        }
        assert_eq!(overflows, 1);
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn test_single_slot_queue() {
        let queue = EventQueue::new("top.tick", ValueType::Logic, 1);
        queue.enqueue(Value::ONE, 10).unwrap();
        assert!(matches!(
            queue.enqueue(Value::ZERO, 11),
            Err(SimError::Overflow { .. })
        ));

        let event = queue.dequeue().expect("sole item");
        assert_eq!(event.value, Value::ONE);
        assert_eq!(event.timestamp, 10);
        assert!(queue.is_empty());
        assert!(queue.dequeue().is_none());
    }

    #[test]
    fn test_fifo_order_and_unique_ids() {
        let queue = EventQueue::new("top.q", ValueType::Int, 8);
        let a = queue.enqueue(Value::Int(1), 0).unwrap();
        let b = queue.enqueue(Value::Int(2), 5).unwrap();
        assert_ne!(a, b);
        assert_eq!(queue.peek().map(|e| e.id), Some(a));
        assert_eq!(queue.dequeue().map(|e| e.value), Some(Value::Int(1)));
        assert_eq!(queue.dequeue().map(|e| e.value), Some(Value::Int(2)));
    }

    #[test]
    fn test_huge_capacity_is_not_preallocated() {
        let queue = EventQueue::new("top.q", ValueType::Int, usize::MAX);
        assert_eq!(queue.capacity(), usize::MAX);
        queue.enqueue(Value::Int(7), 0).unwrap();
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_remove_head_only_matches_head() {
        let queue = EventQueue::new("top.q", ValueType::Int, 4);
        let first = queue.enqueue(Value::Int(1), 0).unwrap();
        let second = queue.enqueue(Value::Int(2), 1).unwrap();
        assert!(queue.remove_head(second).is_none());
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.remove_head(first).map(|e| e.value), Some(Value::Int(1)));
        assert_eq!(queue.peek().map(|e| e.id), Some(second));
    }

    #[test]
    fn test_queued_event_is_serializable() {
        fn assert_serde<T: Serialize + for<'de> Deserialize<'de>>() {}
        assert_serde::<QueuedEvent>();
    }

    #[test]
    fn test_type_mismatch_rejected() {
        let queue = EventQueue::new("top.q", ValueType::Logic, 2);
        let result = queue.enqueue(Value::Int(1), 0);
        assert!(matches!(result, Err(SimError::QueueTypeMismatch { .. })));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_producer_thread_interleaves_with_consumer() {
        let queue = EventQueue::new("top.q", ValueType::Int, 1024);
        let producer = queue.clone();
        let handle = std::thread::spawn(move || {
            for t in 0..100u64 {
                producer.enqueue(Value::Int(t as i64), t).unwrap();
            }
        });

        let mut seen = Vec::new();
        while seen.len() < 100 {
            if let Some(event) = queue.dequeue() {
                seen.push(event.timestamp);
            }
        }
        handle.join().unwrap();
        assert_eq!(seen, (0..100).collect::<Vec<_>>());
    }
}
