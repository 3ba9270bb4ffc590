//! FIFO buffering of normalized input between the window procedure and the
//! simulation step.

use ::std::collections::{vec_deque, VecDeque};

use crate::{input::InputEvent, time::MonotonicTimestamp};

/// Default number of events an [`InputQueue`] pre-allocates room for.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// A first-in, first-out queue of [`InputEvent`]s.
///
/// Events leave the queue in exactly the order they were placed into it. No
/// deduplication, coalescing or prioritisation takes place, and the queue is
/// never trimmed: it grows for as long as nobody drains it.
///
/// # Threading
///
/// The queue performs no synchronisation. It is written by the window
/// procedure and drained by the simulation step, both of which run on the
/// thread that owns the window. Sharing one across threads requires wrapping
/// it in a lock.
///
/// # Example
///
/// ```
/// use ::rawpump::input::{InputQueue, mouse::MouseInput};
/// use ::rawpump::time::MonotonicTimestamp;
///
/// let mut queue = InputQueue::<MouseInput>::new();
/// queue.emplace(MonotonicTimestamp::default(), MouseInput::default());
///
/// while let Some(event) = queue.pop() {
///     // hand `event` to game logic
/// #   let _ = event;
/// }
/// assert!(queue.is_empty());
/// ```
#[derive(Debug)]
pub struct InputQueue<T> {
    events: VecDeque<InputEvent<T>>,
}

impl<T> Default for InputQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> InputQueue<T> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    /// Constructs a queue with room for `capacity` events before it first
    /// reallocates. This is not a limit.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity),
        }
    }

    /// Appends a new event built from `data`, stamped with `create_time`, and
    /// returns a reference to it. Always succeeds.
    pub fn emplace(&mut self, create_time: MonotonicTimestamp, data: T) -> &mut InputEvent<T> {
        let index = self.events.len();
        self.events.push_back(InputEvent::new(create_time, data));
        &mut self.events[index]
    }

    /// Removes and returns the oldest event, or `None` if the queue is empty.
    pub fn pop(&mut self) -> Option<InputEvent<T>> {
        self.events.pop_front()
    }

    /// Removes every event, yielding them oldest first.
    pub fn drain(&mut self) -> vec_deque::Drain<'_, InputEvent<T>> {
        self.events.drain(..)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::mouse::MouseInput;

    use ::pretty_assertions::assert_eq;
    use ::std::time::Duration;

    fn at(ms: u64) -> MonotonicTimestamp {
        MonotonicTimestamp::from_elapsed(Duration::from_millis(ms))
    }

    fn moved(x: i32) -> MouseInput {
        MouseInput {
            last_x: x,
            ..Default::default()
        }
    }

    /// Three mouse events come back out in the order they went in, followed
    /// by nothing.
    #[test]
    fn test_pop_returns_events_in_arrival_order() {
        let mut queue = InputQueue::<MouseInput>::new();

        queue.emplace(at(1), moved(1));
        queue.emplace(at(2), moved(2));
        queue.emplace(at(3), moved(3));

        assert_eq!(queue.pop(), Some(InputEvent::new(at(1), moved(1))));
        assert_eq!(queue.pop(), Some(InputEvent::new(at(2), moved(2))));
        assert_eq!(queue.pop(), Some(InputEvent::new(at(3), moved(3))));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_pop_on_empty_queue() {
        let mut queue = InputQueue::<u32>::default();
        assert_eq!(queue.pop(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_emplace_returns_inserted_event() {
        let mut queue = InputQueue::<u32>::new();
        queue.emplace(at(1), 10);

        let event = queue.emplace(at(2), 20);
        assert_eq!(*event, InputEvent::new(at(2), 20));
        event.data = 21;

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop().map(|e| e.data), Some(10));
        assert_eq!(queue.pop().map(|e| e.data), Some(21));
    }

    /// Duplicates and out-of-order timestamps are kept exactly as pushed.
    #[test]
    fn test_no_deduplication_or_reordering() {
        let mut queue = InputQueue::<u32>::new();
        for (ms, value) in [(5, 1), (5, 1), (3, 2), (9, 1)] {
            queue.emplace(at(ms), value);
        }

        let drained: Vec<_> = queue.drain().map(|e| (e.create_time, e.data)).collect();
        assert_eq!(
            drained,
            vec![(at(5), 1), (at(5), 1), (at(3), 2), (at(9), 1)]
        );
        assert!(queue.is_empty());
    }

    /// Capacity is a pre-allocation hint only; the queue never drops events.
    #[test]
    fn test_queue_is_unbounded() {
        let mut queue = InputQueue::<usize>::with_capacity(2);
        for i in 0..1000 {
            queue.emplace(at(i as u64), i);
        }

        assert_eq!(queue.len(), 1000);
        assert!((0..1000).eq(queue.drain().map(|e| e.data)));
    }
}
