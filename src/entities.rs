//! Entity extraction from replayed timelines
//!
//! Derives deduplicated process, network-connection and file facts from a
//! timeline. Hardened for real-world telemetry: missing or mistyped payload
//! fields degrade to sentinel values (`-1`, `"<unknown>"`) through the
//! payload accessors, so a single corrupt event never aborts extraction.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::event::ForensicEvent;

/// A process observed starting during the incident
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProcessEntity {
    pub pid: i64,
    pub image: String,
}

/// An outbound network connection observed during the incident
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NetworkEntity {
    pub dst: String,
    pub port: i64,
}

/// A file written during the incident
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FileEntity {
    pub path: String,
}

/// Single-pass extractor maintaining three deduplicated entity sets.
///
/// Identity is structural: re-observing the same process, connection or file
/// across multiple events yields one entity. Sets are ordered (`BTreeSet`)
/// so iteration, and every report rendered from it, is deterministic.
#[derive(Debug, Default)]
pub struct EntityExtractor {
    processes: BTreeSet<ProcessEntity>,
    networks: BTreeSet<NetworkEntity>,
    files: BTreeSet<FileEntity>,
}

impl EntityExtractor {
    /// Create an extractor with empty entity sets
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a timeline into the entity sets
    pub fn extract(&mut self, events: &[ForensicEvent]) {
        for event in events {
            self.process_event(event);
        }
    }

    /// Fold a single event into the entity sets
    pub fn process_event(&mut self, event: &ForensicEvent) {
        let p = &event.payload;

        match event.event_type.as_str() {
            "process_start" => {
                self.processes.insert(ProcessEntity {
                    pid: p.int_or("pid", -1),
                    image: p.str_or("image", "<unknown>"),
                });
            }
            "network_connect" => {
                self.networks.insert(NetworkEntity {
                    dst: p.str_or("dst", "<unknown>"),
                    port: p.int_or("port", -1),
                });
            }
            "file_write" => {
                self.files.insert(FileEntity {
                    path: p.str_or("path", "<unknown>"),
                });
            }
            _ => {}
        }
    }

    /// Deduplicated processes, in deterministic order
    pub fn processes(&self) -> &BTreeSet<ProcessEntity> {
        &self.processes
    }

    /// Deduplicated network connections, in deterministic order
    pub fn networks(&self) -> &BTreeSet<NetworkEntity> {
        &self.networks
    }

    /// Deduplicated written files, in deterministic order
    pub fn files(&self) -> &BTreeSet<FileEntity> {
        &self.files
    }
}
