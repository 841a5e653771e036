// Lumen Journal - Deduplication Gate
// Keeps re-imported legacy entries from landing twice. A candidate is a
// duplicate iff a previously seen entry has the identical content string
// and the identical timestamp (exact equality, not fuzzy).
//
// The gate is seeded from the persisted store at the start of a run and
// records every accepted candidate, so later candidates in the same run
// see earlier acceptances.

use chrono::{DateTime, Utc};
use std::collections::HashSet;

use crate::journal_entry::JournalEntry;

/// Decision for one candidate entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Not seen before; recorded and cleared for persistence
    Accepted,
    /// Identical (content, timestamp) already seen; discard, not an error
    Duplicate,
}

/// Duplicate gate over (content, timestamp) identity
#[derive(Debug, Default)]
pub struct DedupeGate {
    seen: HashSet<(String, DateTime<Utc>)>,
}

impl DedupeGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the gate with already-persisted entries
    pub fn with_existing(existing: &[JournalEntry]) -> Self {
        let seen = existing
            .iter()
            .map(|e| (e.content.clone(), e.timestamp))
            .collect();
        Self { seen }
    }

    /// Check a candidate and record it if accepted
    pub fn check(&mut self, candidate: &JournalEntry) -> GateDecision {
        let key = (candidate.content.clone(), candidate.timestamp);
        if self.seen.insert(key) {
            GateDecision::Accepted
        } else {
            GateDecision::Duplicate
        }
    }

    /// Number of distinct (content, timestamp) pairs seen so far
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
