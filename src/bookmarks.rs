//! Timeline bookmarks
//!
//! Analyst annotations over sequence ranges. Bookmarks are insertion-ordered
//! and never reordered, so a review session reads back in the order findings
//! were made.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bookmark validation failure
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BookmarkError {
    /// Range end precedes range start
    #[error("bookmark range is inverted: start_seq {start_seq} > end_seq {end_seq}")]
    InvertedRange { start_seq: u64, end_seq: u64 },
}

/// A labeled range of the timeline.
///
/// Bounds are inclusive on both ends; a single-event bookmark has
/// `start_seq == end_seq`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineBookmark {
    /// First sequence number covered
    pub start_seq: u64,
    /// Last sequence number covered (inclusive)
    pub end_seq: u64,
    /// Short analyst-facing label
    pub label: String,
    /// Free-form notes
    pub notes: String,
}

/// Insertion-ordered bookmark collection
#[derive(Debug, Clone, Default)]
pub struct BookmarkStore {
    bookmarks: Vec<TimelineBookmark>,
}

impl BookmarkStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bookmark over `[start_seq, end_seq]`.
    ///
    /// Rejects inverted ranges without modifying the store.
    pub fn add(
        &mut self,
        start_seq: u64,
        end_seq: u64,
        label: impl Into<String>,
        notes: impl Into<String>,
    ) -> Result<(), BookmarkError> {
        if start_seq > end_seq {
            return Err(BookmarkError::InvertedRange { start_seq, end_seq });
        }
        self.bookmarks.push(TimelineBookmark {
            start_seq,
            end_seq,
            label: label.into(),
            notes: notes.into(),
        });
        Ok(())
    }

    /// All bookmarks in insertion order, as an independent copy
    pub fn all(&self) -> Vec<TimelineBookmark> {
        self.bookmarks.clone()
    }

    /// Number of stored bookmarks
    pub fn len(&self) -> usize {
        self.bookmarks.len()
    }

    /// True when no bookmarks have been added
    pub fn is_empty(&self) -> bool {
        self.bookmarks.is_empty()
    }
}
