use std::sync::Mutex;

/// Single-slot, latest-wins mailbox for events crossing from a background
/// context into the main tick.
///
/// Writers overwrite whatever is in the slot; the reader drains it once per
/// tick. Only the newest value matters for state-style events such as
/// availability, so intermediate values are deliberately dropped.
#[derive(Debug, Default)]
pub struct EventSlot<T> {
    slot: Mutex<Option<T>>,
}

impl<T> EventSlot<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Stores `value`, replacing any undelivered previous value.
    pub fn set(&self, value: T) {
        *self.slot.lock().unwrap() = Some(value);
    }

    /// Removes and returns the latest value, if one arrived since the last
    /// take.
    pub fn take(&self) -> Option<T> {
        self.slot.lock().unwrap().take()
    }
}
