// Lumen Journal - Import Core
// Library pipeline that ingests an unknown legacy life-logging SQLite
// database, infers its structure, and produces validated, deduplicated
// canonical journal entries.
//
// Pipeline: schema_inspector -> row_extractor -> field_normalizer ->
// entry_builder -> dedupe_gate -> entry_store, orchestrated by importer.

pub mod dedupe_gate;
pub mod entry_builder;
pub mod entry_store;
pub mod error;
pub mod field_normalizer;
pub mod importer;
pub mod journal_entry;
pub mod row_extractor;
pub mod schema_inspector;

pub use dedupe_gate::{DedupeGate, GateDecision};
pub use entry_store::{EntryStore, MemoryEntryStore, SqliteEntryStore};
pub use error::ImportError;
pub use importer::{ImportRunResult, ImporterConfig, LegacyImporter, NullProgress, ProgressSink};
pub use journal_entry::{
    Activity, JournalEntry, Mood, SpatialPlacement, VisualizationCategory,
};
pub use row_extractor::LegacyEntry;
pub use schema_inspector::RawTableSchema;
