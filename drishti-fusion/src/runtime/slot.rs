//! Single-sample mailbox keeping only the freshest value.

use parking_lot::Mutex;

use crate::core::types::Timestamped;

struct SlotState<T> {
    value: Option<Timestamped<T>>,
    published: u64,
    dropped: u64,
}

/// Lock-guarded slot holding the most recent sample of one sensor.
///
/// Producers overwrite freely; a consumer either takes the sample out or
/// reads a copy. Samples overwritten before consumption count as dropped.
pub struct LatestSlot<T> {
    state: Mutex<SlotState<T>>,
}

impl<T> LatestSlot<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SlotState {
                value: None,
                published: 0,
                dropped: 0,
            }),
        }
    }

    /// Store a sample, returning true when an unconsumed one was replaced.
    pub fn publish(&self, sample: Timestamped<T>) -> bool {
        let mut state = self.state.lock();
        let replaced = state.value.is_some();
        if replaced {
            state.dropped += 1;
        }
        state.value = Some(sample);
        state.published += 1;
        replaced
    }

    /// Remove and return the stored sample.
    pub fn take(&self) -> Option<Timestamped<T>> {
        self.state.lock().value.take()
    }

    /// Total samples ever published.
    pub fn published(&self) -> u64 {
        self.state.lock().published
    }

    /// Samples overwritten before anyone consumed them.
    pub fn dropped(&self) -> u64 {
        self.state.lock().dropped
    }
}

impl<T: Clone> LatestSlot<T> {
    /// Copy the stored sample out without consuming it.
    pub fn latest(&self) -> Option<Timestamped<T>> {
        self.state.lock().value.clone()
    }
}

impl<T> Default for LatestSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}
