use crate::time::MonotonicTimestamp;

/// A normalized input sample stamped with its arrival time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InputEvent<T> {
    pub data: T,
    pub create_time: MonotonicTimestamp,
}

impl<T> InputEvent<T> {
    pub fn new(create_time: MonotonicTimestamp, data: T) -> Self {
        Self { data, create_time }
    }
}
