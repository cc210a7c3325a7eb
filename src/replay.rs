//! Deterministic replay of forensic event timelines
//!
//! A replay source is responsible for exactly one thing: producing a
//! [`ReplaySession`] of canonical events. Two variants exist (a JSONL file
//! reader and an adapter over an already-materialized event history), and
//! both funnel through a fresh [`RecordStore`], so every session observes
//! the same sequence discipline no matter where the events came from.
//!
//! The session's ascending-`seq` sort is the determinism anchor of the whole
//! engine: no matter what order a source yields events in, every downstream
//! pass sees them in increasing `seq` order, and analysis results are
//! reproducible across runs and across source types.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::event::{coerce_i64, ForensicEvent, Payload};
use crate::recorder::RecordStore;

/// Errors surfaced while producing a replay session
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to open event file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read event file: {0}")]
    Read(#[from] std::io::Error),

    /// A line that is not a valid event record. Ingestion stops immediately:
    /// a malformed evidence file must never be silently truncated into a
    /// partial timeline.
    #[error("invalid JSON on line {line}: {source}")]
    InvalidLine {
        /// 1-based line number in the input file
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, ReplayError>;

/// Immutable, `seq`-ordered view of a timeline.
///
/// Construction sorts once; [`ReplaySession::replay`] always returns the
/// identical ordered slice, never a lazily regenerated one.
#[derive(Debug, Clone)]
pub struct ReplaySession {
    events: Vec<ForensicEvent>,
}

impl ReplaySession {
    /// Build a session from events in any order
    pub fn new(mut events: Vec<ForensicEvent>) -> Self {
        events.sort_by_key(|e| e.seq);
        Self { events }
    }

    /// The canonical timeline, strictly ascending by `seq`
    pub fn replay(&self) -> &[ForensicEvent] {
        &self.events
    }

    /// Number of events in the timeline
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True if the timeline is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Capability contract for replay producers.
///
/// `load` consumes the source: a source yields exactly one session, and the
/// record-backed variant's external history is iterated exactly once.
/// Concrete variants are selected by explicit configuration, never by
/// dynamic type inspection.
pub trait ReplaySource {
    /// Produce the deterministic replay session for this source
    fn load(self) -> Result<ReplaySession>;
}

/// One line of a newline-delimited JSON event file.
///
/// `timestamp` and `type` are required; `payload` defaults to an empty map.
/// Deserializing through this struct folds syntax errors, missing required
/// keys and non-coercible timestamps into a single fatal per-line taxonomy.
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(deserialize_with = "int_coercible")]
    timestamp: i64,
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    payload: Payload,
}

/// Accept integers, floats (truncated) and numeric strings, the same
/// coercion table payload accessors use, applied through serde.
fn int_coercible<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    coerce_i64(&value).ok_or_else(|| {
        serde::de::Error::custom(format!("timestamp is not integer-coercible: {value}"))
    })
}

/// Replay source backed by a JSONL event file.
#[derive(Debug, Clone)]
pub struct JsonlReplaySource {
    path: PathBuf,
}

impl JsonlReplaySource {
    /// Create a source for the given event file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReplaySource for JsonlReplaySource {
    fn load(self) -> Result<ReplaySession> {
        let file = File::open(&self.path).map_err(|source| ReplayError::Open {
            path: self.path.clone(),
            source,
        })?;
        let reader = BufReader::new(file);

        let mut store = RecordStore::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let record: RawRecord =
                serde_json::from_str(trimmed).map_err(|source| ReplayError::InvalidLine {
                    line: idx + 1,
                    source,
                })?;
            store.record(record.timestamp, record.event_type, record.payload);
        }

        debug!(
            events = store.len(),
            path = %self.path.display(),
            "loaded event file"
        );
        Ok(ReplaySession::new(store.snapshot()))
    }
}

/// Read-only view of one item in an externally materialized event history.
///
/// The persistence collaborator that stored the history stays opaque; the
/// replay layer only needs these three accessors.
pub trait RecordedEvent {
    /// External clock value at capture time
    fn timestamp(&self) -> i64;
    /// Event type tag
    fn event_type(&self) -> &str;
    /// Event detail map (owned; the original record is never mutated)
    fn payload(&self) -> Payload;
}

impl RecordedEvent for ForensicEvent {
    fn timestamp(&self) -> i64 {
        self.timestamp
    }

    fn event_type(&self) -> &str {
        &self.event_type
    }

    fn payload(&self) -> Payload {
        self.payload.clone()
    }
}

/// Replay source adapting an already-materialized event history.
///
/// The history is fed through a fresh [`RecordStore`], so sequence numbers
/// are reassigned in iteration order, identical to the file-backed path.
#[derive(Debug)]
pub struct RecordedReplaySource<I> {
    records: I,
}

impl<I> RecordedReplaySource<I> {
    /// Wrap an iterable event history
    pub fn new(records: I) -> Self {
        Self { records }
    }
}

impl<I> ReplaySource for RecordedReplaySource<I>
where
    I: IntoIterator,
    I::Item: RecordedEvent,
{
    fn load(self) -> Result<ReplaySession> {
        let mut store = RecordStore::new();
        for record in self.records {
            store.record(
                record.timestamp(),
                record.event_type().to_string(),
                record.payload(),
            );
        }

        debug!(events = store.len(), "adapted recorded event history");
        Ok(ReplaySession::new(store.snapshot()))
    }
}
