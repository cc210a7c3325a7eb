//! JSON report format for analysis results
//!
//! Machine-readable output for `--format json`. Optional sections are
//! omitted rather than emitted as null so consumers can feature-test with
//! key presence.

use serde::{Deserialize, Serialize};

use crate::detections::DetectionHit;
use crate::entities::{EntityExtractor, FileEntity, NetworkEntity, ProcessEntity};
use crate::event::ForensicEvent;
use crate::mitre::MitreTechnique;

/// Format name emitted in every report
pub const REPORT_FORMAT: &str = "revivir-json-v1";

/// Extracted entity footprint, each kind in sorted order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonEntities {
    pub processes: Vec<ProcessEntity>,
    pub networks: Vec<NetworkEntity>,
    pub files: Vec<FileEntity>,
}

/// Summary statistics for the analyzed timeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonSummary {
    /// Total number of events replayed
    pub total_events: u64,
    /// Distinct entities across all kinds
    pub total_entities: u64,
    /// Techniques annotated on the timeline
    pub total_techniques: u64,
    /// Detection hits across all rules
    pub total_detections: u64,
}

/// Root JSON report structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonReport {
    /// Tool version that produced the report
    pub version: String,
    /// Format name
    pub format: String,
    /// Replayed events in sequence order
    pub events: Vec<ForensicEvent>,
    /// Summary statistics
    pub summary: JsonSummary,
    /// Entity footprint (if extraction ran)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entities: Option<JsonEntities>,
    /// ATT&CK annotations (if mapping ran)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub techniques: Option<Vec<MitreTechnique>>,
    /// Detection hits (if the retro engine ran)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detections: Option<Vec<DetectionHit>>,
    /// Head digest of the evidence chain (if custody was sealed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence_digest: Option<String>,
    /// Chain verification outcome (verify runs only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_verified: Option<bool>,
}

impl JsonReport {
    /// Create an empty report structure
    pub fn new() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: REPORT_FORMAT.to_string(),
            events: Vec::new(),
            summary: JsonSummary {
                total_events: 0,
                total_entities: 0,
                total_techniques: 0,
                total_detections: 0,
            },
            entities: None,
            techniques: None,
            detections: None,
            evidence_digest: None,
            chain_verified: None,
        }
    }

    /// Set the replayed timeline
    pub fn set_events(&mut self, events: Vec<ForensicEvent>) {
        self.summary.total_events = events.len() as u64;
        self.events = events;
    }

    /// Set the extracted entity footprint
    pub fn set_entities(&mut self, extractor: &EntityExtractor) {
        let entities = JsonEntities {
            processes: extractor.processes().iter().cloned().collect(),
            networks: extractor.networks().iter().cloned().collect(),
            files: extractor.files().iter().cloned().collect(),
        };
        self.summary.total_entities =
            (entities.processes.len() + entities.networks.len() + entities.files.len()) as u64;
        self.entities = Some(entities);
    }

    /// Set the ATT&CK annotations
    pub fn set_techniques(&mut self, techniques: Vec<MitreTechnique>) {
        self.summary.total_techniques = techniques.len() as u64;
        self.techniques = Some(techniques);
    }

    /// Set the detection hits
    pub fn set_detections(&mut self, detections: Vec<DetectionHit>) {
        self.summary.total_detections = detections.len() as u64;
        self.detections = Some(detections);
    }

    /// Set the evidence chain head digest
    pub fn set_evidence_digest(&mut self, digest: String) {
        self.evidence_digest = Some(digest);
    }

    /// Set the chain verification outcome
    pub fn set_chain_verified(&mut self, verified: bool) {
        self.chain_verified = Some(verified);
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for JsonReport {
    fn default() -> Self {
        Self::new()
    }
}
