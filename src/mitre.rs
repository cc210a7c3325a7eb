//! MITRE ATT&CK technique mapping
//!
//! Deterministic, stateless annotation of forensic events with ATT&CK
//! technique identifiers. The mapping is a lookup table keyed on event type
//! (plus an image substring check for process execution) so new behaviors
//! extend it by adding cases, without touching the replay or extraction
//! layers.

use serde::{Deserialize, Serialize};

use crate::event::ForensicEvent;

/// An ATT&CK technique instance bound to its originating event.
///
/// Never mutated after creation; `event_seq`/`timestamp` tie the annotation
/// back into the replay timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MitreTechnique {
    /// ATT&CK identifier, e.g. "T1059.001"
    pub technique_id: String,
    /// Display name of the technique
    pub name: String,
    /// Sequence number of the event that produced this annotation
    pub event_seq: u64,
    /// Timestamp of the originating event
    pub timestamp: i64,
    /// Human-readable justification for the annotation
    pub rationale: String,
}

/// Stateless event-to-technique mapper
#[derive(Debug, Clone, Copy, Default)]
pub struct MitreMapper;

impl MitreMapper {
    /// Create a mapper
    pub fn new() -> Self {
        Self
    }

    /// Map one event to zero or more techniques.
    ///
    /// Pure function of the event: identical input always yields identical
    /// annotations.
    pub fn map_event(&self, event: &ForensicEvent) -> Vec<MitreTechnique> {
        let mut techniques = Vec::new();

        match event.event_type.as_str() {
            "process_start" => {
                let image = event.payload.str_or("image", "").to_lowercase();
                if image.contains("powershell") {
                    techniques.push(MitreTechnique {
                        technique_id: "T1059.001".to_string(),
                        name: "PowerShell".to_string(),
                        event_seq: event.seq,
                        timestamp: event.timestamp,
                        rationale: "PowerShell process execution detected".to_string(),
                    });
                } else {
                    techniques.push(MitreTechnique {
                        technique_id: "T1059".to_string(),
                        name: "Command and Scripting Interpreter".to_string(),
                        event_seq: event.seq,
                        timestamp: event.timestamp,
                        rationale: "Generic process execution".to_string(),
                    });
                }
            }
            "network_connect" => {
                techniques.push(MitreTechnique {
                    technique_id: "T1071.001".to_string(),
                    name: "Application Layer Protocol: Web Protocols".to_string(),
                    event_seq: event.seq,
                    timestamp: event.timestamp,
                    rationale: "Outbound network connection observed".to_string(),
                });
            }
            "file_write" => {
                techniques.push(MitreTechnique {
                    technique_id: "T1105".to_string(),
                    name: "Ingress Tool Transfer".to_string(),
                    event_seq: event.seq,
                    timestamp: event.timestamp,
                    rationale: "Executable written to disk".to_string(),
                });
            }
            _ => {}
        }

        techniques
    }

    /// Map a whole timeline, concatenating per-event results in replay order
    pub fn map_timeline(&self, events: &[ForensicEvent]) -> Vec<MitreTechnique> {
        let mut timeline = Vec::new();
        for event in events {
            timeline.extend(self.map_event(event));
        }
        timeline
    }
}
