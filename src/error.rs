// Lumen Journal - Import Errors
// Error taxonomy for the legacy import pipeline
//
// Fatal errors (DatabaseOpen, NoEntriesTableFound, QueryFailed, Persistence,
// Cancelled) abort the run with no result. Validation errors (EmptyContent,
// ContentTooLong, InvalidLocation) are recovered per entry and accumulated
// into the run result's error list.

use thiserror::Error;

use crate::entry_builder::MAX_CONTENT_LENGTH;

/// Errors produced by the legacy import pipeline
#[derive(Debug, Error)]
pub enum ImportError {
    /// The source database file could not be opened
    #[error("Failed to open source database: {0}")]
    DatabaseOpen(String),

    /// No table in the source database looks like an entries table
    #[error("No entries table found in source database")]
    NoEntriesTableFound,

    /// A read query against the source database failed
    #[error("Source query failed: {0}")]
    QueryFailed(#[from] sqlx::Error),

    /// Entry content was empty after trimming
    #[error("Entry content is empty")]
    EmptyContent,

    /// Entry content exceeds the maximum length
    #[error("Entry content is {length} characters (maximum {MAX_CONTENT_LENGTH})")]
    ContentTooLong { length: usize },

    /// Coordinates are incomplete or out of range
    #[error("Invalid location: {0}")]
    InvalidLocation(String),

    /// The entry store failed to read or flush
    #[error("Persistence failed: {0}")]
    Persistence(String),

    /// The run was cancelled before the terminal flush
    #[error("Import cancelled")]
    Cancelled,
}

impl ImportError {
    /// Whether this error aborts the whole run (vs. a recovered
    /// per-entry validation failure)
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ImportError::DatabaseOpen(_)
                | ImportError::NoEntriesTableFound
                | ImportError::QueryFailed(_)
                | ImportError::Persistence(_)
                | ImportError::Cancelled
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(ImportError::NoEntriesTableFound.is_fatal());
        assert!(ImportError::Persistence("disk full".into()).is_fatal());
        assert!(ImportError::Cancelled.is_fatal());
        assert!(!ImportError::EmptyContent.is_fatal());
        assert!(!ImportError::ContentTooLong { length: 10_001 }.is_fatal());
        assert!(!ImportError::InvalidLocation("latitude 200".into()).is_fatal());
    }

    #[test]
    fn test_display_includes_detail() {
        let err = ImportError::ContentTooLong { length: 12_000 };
        let msg = err.to_string();
        assert!(msg.contains("12000"));
        assert!(msg.contains("10000"));
    }
}
