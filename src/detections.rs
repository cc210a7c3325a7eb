//! Retroactive detection engine
//!
//! Applies present-day detection logic across an already recorded timeline.
//! Rules are trait objects so new detections plug in without modifying the
//! engine; each rule is pure and per-event, keeping a full-timeline sweep
//! trivially repeatable.

use serde::{Deserialize, Serialize};

use crate::event::ForensicEvent;

/// A single rule match against one event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionHit {
    /// Identifier of the rule that fired, e.g. "DET-PS-001"
    pub rule_id: String,
    /// Rule description at the time of match
    pub description: String,
    /// Sequence number of the matched event
    pub event_seq: u64,
    /// Timestamp of the matched event
    pub timestamp: i64,
    /// Event-specific supporting detail
    pub evidence: String,
}

/// Behavior contract for a detection rule.
///
/// `evaluate` must be a pure function of the event; rules hold no mutable
/// state so a sweep over the same timeline always yields the same hits.
pub trait DetectionRule {
    /// Stable rule identifier
    fn rule_id(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str;

    /// Evaluate one event, returning any hits it produces
    fn evaluate(&self, event: &ForensicEvent) -> Vec<DetectionHit>;
}

/// Flags process executions whose image name contains "powershell"
#[derive(Debug, Clone, Copy, Default)]
pub struct SuspiciousPowerShellRule;

impl DetectionRule for SuspiciousPowerShellRule {
    fn rule_id(&self) -> &str {
        "DET-PS-001"
    }

    fn description(&self) -> &str {
        "Suspicious PowerShell execution"
    }

    fn evaluate(&self, event: &ForensicEvent) -> Vec<DetectionHit> {
        if event.event_type != "process_start" {
            return Vec::new();
        }
        let image = event.payload.str_or("image", "").to_lowercase();
        if !image.contains("powershell") {
            return Vec::new();
        }
        vec![DetectionHit {
            rule_id: self.rule_id().to_string(),
            description: self.description().to_string(),
            event_seq: event.seq,
            timestamp: event.timestamp,
            evidence: format!("Process image: {image}"),
        }]
    }
}

/// Flags outbound connections on ports outside the common web set.
///
/// A connection with no usable port field reads as port 0, which is outside
/// the allowlist and therefore flagged. Losing the port is itself suspicious,
/// so the rule errs toward firing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuspiciousC2ConnectionRule;

impl SuspiciousC2ConnectionRule {
    const ALLOWED_PORTS: [i64; 2] = [80, 443];
}

impl DetectionRule for SuspiciousC2ConnectionRule {
    fn rule_id(&self) -> &str {
        "DET-C2-001"
    }

    fn description(&self) -> &str {
        "Suspicious outbound network connection"
    }

    fn evaluate(&self, event: &ForensicEvent) -> Vec<DetectionHit> {
        if event.event_type != "network_connect" {
            return Vec::new();
        }
        let port = event.payload.int_or("port", 0);
        if Self::ALLOWED_PORTS.contains(&port) {
            return Vec::new();
        }
        vec![DetectionHit {
            rule_id: self.rule_id().to_string(),
            description: self.description().to_string(),
            event_seq: event.seq,
            timestamp: event.timestamp,
            evidence: format!("Outbound connection on port {port}"),
        }]
    }
}

/// Sweeps a recorded timeline with an ordered rule set
pub struct RetroDetectionEngine {
    rules: Vec<Box<dyn DetectionRule>>,
}

impl RetroDetectionEngine {
    /// Engine with no rules; add them via `add_rule`
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Engine preloaded with the built-in rule set
    pub fn with_default_rules() -> Self {
        let mut engine = Self::new();
        engine.add_rule(Box::new(SuspiciousPowerShellRule));
        engine.add_rule(Box::new(SuspiciousC2ConnectionRule));
        engine
    }

    /// Append a rule; registration order is evaluation order
    pub fn add_rule(&mut self, rule: Box<dyn DetectionRule>) {
        self.rules.push(rule);
    }

    /// Number of registered rules
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Evaluate every rule against every event.
    ///
    /// Hits are grouped by event (timeline order), then by rule registration
    /// order within each event.
    pub fn run(&self, events: &[ForensicEvent]) -> Vec<DetectionHit> {
        let mut hits = Vec::new();
        for event in events {
            for rule in &self.rules {
                hits.extend(rule.evaluate(event));
            }
        }
        hits
    }
}

impl Default for RetroDetectionEngine {
    fn default() -> Self {
        Self::with_default_rules()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Payload;

    #[test]
    fn test_powershell_rule_fires_case_insensitively() {
        let event = ForensicEvent::new(
            0,
            100,
            "process_start",
            Payload::new().with("image", "C:\\Tools\\POWERSHELL.EXE"),
        );

        let hits = SuspiciousPowerShellRule.evaluate(&event);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].rule_id, "DET-PS-001");
        assert_eq!(hits[0].evidence, "Process image: c:\\tools\\powershell.exe");
    }

    #[test]
    fn test_powershell_rule_ignores_other_processes() {
        let event = ForensicEvent::new(
            0,
            100,
            "process_start",
            Payload::new().with("image", "C:\\Windows\\explorer.exe"),
        );
        assert!(SuspiciousPowerShellRule.evaluate(&event).is_empty());
    }

    #[test]
    fn test_powershell_rule_ignores_other_event_types() {
        let event = ForensicEvent::new(
            0,
            100,
            "file_write",
            Payload::new().with("image", "powershell.exe"),
        );
        assert!(SuspiciousPowerShellRule.evaluate(&event).is_empty());
    }

    #[test]
    fn test_c2_rule_fires_on_uncommon_port() {
        let event = ForensicEvent::new(
            2,
            300,
            "network_connect",
            Payload::new().with("dst", "10.0.0.99").with("port", 4444),
        );

        let hits = SuspiciousC2ConnectionRule.evaluate(&event);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].rule_id, "DET-C2-001");
        assert_eq!(hits[0].evidence, "Outbound connection on port 4444");
    }

    #[test]
    fn test_c2_rule_allows_web_ports() {
        for port in [80, 443] {
            let event = ForensicEvent::new(
                2,
                300,
                "network_connect",
                Payload::new().with("port", port),
            );
            assert!(
                SuspiciousC2ConnectionRule.evaluate(&event).is_empty(),
                "port {port} should be allowed"
            );
        }
    }

    #[test]
    fn test_c2_rule_fires_when_port_missing() {
        let event = ForensicEvent::new(2, 300, "network_connect", Payload::new());

        let hits = SuspiciousC2ConnectionRule.evaluate(&event);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].evidence, "Outbound connection on port 0");
    }

    #[test]
    fn test_engine_groups_hits_by_event_then_rule() {
        let events = vec![
            ForensicEvent::new(
                0,
                100,
                "network_connect",
                Payload::new().with("port", 9001),
            ),
            ForensicEvent::new(
                1,
                200,
                "process_start",
                Payload::new().with("image", "powershell.exe"),
            ),
        ];

        let engine = RetroDetectionEngine::with_default_rules();
        let hits = engine.run(&events);

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].rule_id, "DET-C2-001");
        assert_eq!(hits[0].event_seq, 0);
        assert_eq!(hits[1].rule_id, "DET-PS-001");
        assert_eq!(hits[1].event_seq, 1);
    }

    #[test]
    fn test_engine_repeatable_over_same_timeline() {
        let events = vec![
            ForensicEvent::new(
                0,
                100,
                "process_start",
                Payload::new().with("image", "powershell.exe"),
            ),
            ForensicEvent::new(1, 200, "network_connect", Payload::new().with("port", 53)),
        ];

        let engine = RetroDetectionEngine::with_default_rules();
        assert_eq!(engine.run(&events), engine.run(&events));
    }

    #[test]
    fn test_empty_engine_produces_no_hits() {
        let events = vec![ForensicEvent::new(
            0,
            100,
            "process_start",
            Payload::new().with("image", "powershell.exe"),
        )];
        assert!(RetroDetectionEngine::new().run(&events).is_empty());
    }

    #[test]
    fn test_custom_rule_registration() {
        struct HeartbeatRule;
        impl DetectionRule for HeartbeatRule {
            fn rule_id(&self) -> &str {
                "DET-HB-001"
            }
            fn description(&self) -> &str {
                "Heartbeat observed"
            }
            fn evaluate(&self, event: &ForensicEvent) -> Vec<DetectionHit> {
                if event.event_type != "heartbeat" {
                    return Vec::new();
                }
                vec![DetectionHit {
                    rule_id: self.rule_id().to_string(),
                    description: self.description().to_string(),
                    event_seq: event.seq,
                    timestamp: event.timestamp,
                    evidence: "heartbeat".to_string(),
                }]
            }
        }

        let mut engine = RetroDetectionEngine::with_default_rules();
        engine.add_rule(Box::new(HeartbeatRule));
        assert_eq!(engine.rule_count(), 3);

        let events = vec![ForensicEvent::new(0, 100, "heartbeat", Payload::new())];
        let hits = engine.run(&events);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].rule_id, "DET-HB-001");
    }
}
