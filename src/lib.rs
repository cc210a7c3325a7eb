//! Revivir - Forensic timeline replay with retroactive detection
//!
//! This library provides the core functionality for recording forensic
//! events, replaying captured timelines deterministically, and analyzing
//! them after the fact with entity extraction, ATT&CK mapping, detection
//! rules, and hash-chained evidence custody.

pub mod bookmarks;
pub mod cli;
pub mod detections;
pub mod diffing;
pub mod entities;
pub mod event;
pub mod evidence;
pub mod json_output;
pub mod mitre;
pub mod recorder;
pub mod replay;
