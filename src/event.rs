//! Canonical forensic event model
//!
//! Every downstream pass (replay, entity extraction, MITRE mapping,
//! retroactive detection, evidence chaining) consumes [`ForensicEvent`].
//! The payload is an open key-value map read through defensive accessors:
//! telemetry in the wild is missing fields or carries the wrong types, and
//! one corrupt event must never abort a whole analysis pass.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Untyped event payload with defensive typed accessors.
///
/// Keys map to arbitrary JSON values with no required schema. All coercion
/// rules live here so call sites never duplicate them:
///
/// - integers: JSON integers pass through, floats truncate toward zero,
///   numeric strings parse; everything else degrades to the caller's default
/// - strings: JSON strings pass through, numbers and booleans render to their
///   JSON text; null, arrays and objects degrade to the caller's default
///
/// Backed by a `BTreeMap`, so serialization renders keys in sorted order,
/// the canonical form [`ForensicEvent::stable_repr`] relies on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(BTreeMap<String, Value>);

impl Payload {
    /// Create an empty payload
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insertion, mainly for constructing events in code
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Raw access to a field, if present
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Integer field with defensive coercion; `default` on missing/mismatch
    pub fn int_or(&self, key: &str, default: i64) -> i64 {
        self.0.get(key).and_then(coerce_i64).unwrap_or(default)
    }

    /// String field with defensive coercion; `default` on missing/mismatch
    pub fn str_or(&self, key: &str, default: &str) -> String {
        self.0
            .get(key)
            .and_then(coerce_string)
            .unwrap_or_else(|| default.to_string())
    }

    /// Number of fields in the payload
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the payload carries no fields
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Canonical JSON rendering: keys sorted at every nesting level.
    ///
    /// Serializing a `BTreeMap<String, Value>` (with serde_json's default
    /// BTreeMap-backed object representation) is deterministic regardless of
    /// insertion order, which keeps evidence hashes stable across runs and
    /// platforms.
    pub fn canonical_json(&self) -> String {
        // A map of JSON values cannot fail to serialize
        serde_json::to_string(&self.0).unwrap_or_default()
    }
}

impl From<BTreeMap<String, Value>> for Payload {
    fn from(fields: BTreeMap<String, Value>) -> Self {
        Self(fields)
    }
}

/// Coerce a JSON value to an integer: integers as-is, floats truncated,
/// numeric strings parsed. `None` for anything else.
pub(crate) fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().and_then(|u| i64::try_from(u).ok()))
            .or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Coerce a JSON value to display text: strings as-is, numbers and booleans
/// rendered. `None` for null, arrays and objects.
pub(crate) fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A single immutable telemetry event in a forensic timeline.
///
/// `seq` is assigned exactly once by the record store and never mutated; two
/// events from the same store never share a `seq`. `timestamp` is the
/// external clock value as recorded; it is carried verbatim and is not
/// required to be monotonic with `seq`. Replay ordering is by `seq` alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForensicEvent {
    /// Position in the record store's append order
    pub seq: u64,
    /// External clock value at capture time
    pub timestamp: i64,
    /// Open event vocabulary (e.g. "process_start", "network_connect")
    #[serde(rename = "type")]
    pub event_type: String,
    /// Schema-free event detail, read defensively
    #[serde(default)]
    pub payload: Payload,
}

impl ForensicEvent {
    /// Create a new event
    pub fn new(seq: u64, timestamp: i64, event_type: impl Into<String>, payload: Payload) -> Self {
        Self {
            seq,
            timestamp,
            event_type: event_type.into(),
            payload,
        }
    }

    /// Canonical string form used as the hashing input for evidence
    /// chaining.
    ///
    /// Byte-for-byte reproducible for logically identical events: payload
    /// keys render in sorted order, so two events that differ only in payload
    /// insertion order produce identical output.
    pub fn stable_repr(&self) -> String {
        format!(
            "{}|{}|{}|{}",
            self.seq,
            self.timestamp,
            self.event_type,
            self.payload.canonical_json()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_int_passthrough() {
        let p = Payload::new().with("pid", 4242);
        assert_eq!(p.int_or("pid", -1), 4242);
    }

    #[test]
    fn test_payload_int_from_float_truncates() {
        let p = Payload::new().with("pid", 99.9);
        assert_eq!(p.int_or("pid", -1), 99);
    }

    #[test]
    fn test_payload_int_from_numeric_string() {
        let p = Payload::new().with("port", " 4444 ");
        assert_eq!(p.int_or("port", -1), 4444);
    }

    #[test]
    fn test_payload_int_defaults_on_garbage() {
        let p = Payload::new()
            .with("pid", "not-a-number")
            .with("other", json!({"nested": true}));
        assert_eq!(p.int_or("pid", -1), -1);
        assert_eq!(p.int_or("other", -1), -1);
        assert_eq!(p.int_or("missing", -1), -1);
    }

    #[test]
    fn test_payload_str_passthrough() {
        let p = Payload::new().with("image", "C:\\Windows\\explorer.exe");
        assert_eq!(p.str_or("image", "<unknown>"), "C:\\Windows\\explorer.exe");
    }

    #[test]
    fn test_payload_str_renders_scalars() {
        let p = Payload::new().with("port", 8080).with("elevated", true);
        assert_eq!(p.str_or("port", "<unknown>"), "8080");
        assert_eq!(p.str_or("elevated", "<unknown>"), "true");
    }

    #[test]
    fn test_payload_str_defaults_on_structures() {
        let p = Payload::new()
            .with("image", json!(null))
            .with("argv", json!(["a", "b"]));
        assert_eq!(p.str_or("image", "<unknown>"), "<unknown>");
        assert_eq!(p.str_or("argv", "<unknown>"), "<unknown>");
        assert_eq!(p.str_or("missing", "<unknown>"), "<unknown>");
    }

    #[test]
    fn test_stable_repr_layout() {
        let event = ForensicEvent::new(
            7,
            1700000000,
            "process_start",
            Payload::new().with("pid", 100),
        );
        assert_eq!(
            event.stable_repr(),
            "7|1700000000|process_start|{\"pid\":100}"
        );
    }

    #[test]
    fn test_stable_repr_ignores_insertion_order() {
        let a = Payload::new().with("pid", 100).with("image", "pwsh.exe");
        let b = Payload::new().with("image", "pwsh.exe").with("pid", 100);
        let ea = ForensicEvent::new(0, 10, "process_start", a);
        let eb = ForensicEvent::new(0, 10, "process_start", b);
        assert_eq!(ea.stable_repr(), eb.stable_repr());
    }

    #[test]
    fn test_stable_repr_sorts_nested_keys() {
        let a = Payload::new().with("meta", json!({"zz": 1, "aa": 2}));
        let ra = ForensicEvent::new(1, 0, "file_write", a).stable_repr();
        assert!(ra.ends_with("{\"meta\":{\"aa\":2,\"zz\":1}}"));
    }

    #[test]
    fn test_empty_payload_renders_empty_object() {
        let event = ForensicEvent::new(0, 0, "heartbeat", Payload::new());
        assert_eq!(event.stable_repr(), "0|0|heartbeat|{}");
    }

    #[test]
    fn test_event_type_serializes_as_type() {
        let event = ForensicEvent::new(3, 55, "network_connect", Payload::new());
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"network_connect\""));
        assert!(!json.contains("event_type"));
    }

    #[test]
    fn test_event_deserializes_payload_default() {
        let event: ForensicEvent =
            serde_json::from_str("{\"seq\":1,\"timestamp\":9,\"type\":\"x\"}").unwrap();
        assert!(event.payload.is_empty());
    }
}
