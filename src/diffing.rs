//! Timeline entity diffing
//!
//! Compares the entity footprints of two timelines, typically a clean
//! baseline against an incident capture. Deltas are set differences over the
//! ordered entity sets, so diff output is deterministic for deterministic
//! inputs.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::entities::{EntityExtractor, FileEntity, NetworkEntity, ProcessEntity};

/// Added/removed sets for one entity kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityDelta<T: Ord> {
    /// Present in the incident but not the baseline
    pub added: BTreeSet<T>,
    /// Present in the baseline but not the incident
    pub removed: BTreeSet<T>,
}

impl<T: Ord + Clone> EntityDelta<T> {
    fn between(baseline: &BTreeSet<T>, incident: &BTreeSet<T>) -> Self {
        Self {
            added: incident.difference(baseline).cloned().collect(),
            removed: baseline.difference(incident).cloned().collect(),
        }
    }

    /// True when the two sides held identical sets
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Entity-level difference between two timelines
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncidentDiff {
    pub processes: EntityDelta<ProcessEntity>,
    pub networks: EntityDelta<NetworkEntity>,
    pub files: EntityDelta<FileEntity>,
}

impl IncidentDiff {
    /// Diff two extracted entity footprints, baseline first
    pub fn between(baseline: &EntityExtractor, incident: &EntityExtractor) -> Self {
        Self {
            processes: EntityDelta::between(baseline.processes(), incident.processes()),
            networks: EntityDelta::between(baseline.networks(), incident.networks()),
            files: EntityDelta::between(baseline.files(), incident.files()),
        }
    }

    /// True when the footprints were identical
    pub fn is_empty(&self) -> bool {
        self.processes.is_empty() && self.networks.is_empty() && self.files.is_empty()
    }
}
