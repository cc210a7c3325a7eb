//! Append-only forensic event recording
//!
//! [`RecordStore`] is the single sequence authority: it assigns `seq` at
//! append time and never reuses or mutates one. Everything downstream
//! (replay ordering, evidence hashing, analysis passes) leans on that
//! assignment being strictly increasing within one store.

use crate::event::{ForensicEvent, Payload};

/// Append-only accumulator of forensic events.
///
/// Created empty; grows only through [`RecordStore::record`]. A snapshot is
/// an independent copy, so callers can keep appending after handing one out
/// without aliasing analysis-side storage.
#[derive(Debug, Default)]
pub struct RecordStore {
    events: Vec<ForensicEvent>,
    next_seq: u64,
}

impl RecordStore {
    /// Create an empty store with the sequence counter at zero
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            next_seq: 0,
        }
    }

    /// Append a new event, assigning the next sequence number.
    ///
    /// No validation is performed on `event_type` or the payload shape; the
    /// event vocabulary is open. Performs no I/O and cannot fail.
    pub fn record(&mut self, timestamp: i64, event_type: impl Into<String>, payload: Payload) {
        let event = ForensicEvent::new(self.next_seq, timestamp, event_type, payload);
        self.events.push(event);
        self.next_seq += 1;
    }

    /// Independent copy of all recorded events in append order.
    ///
    /// With `record` as the only mutator, append order and `seq` order
    /// coincide.
    pub fn snapshot(&self) -> Vec<ForensicEvent> {
        self.events.clone()
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True if nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
