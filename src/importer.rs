// Lumen Journal - Legacy Importer
// Drives one import run end to end: inspect the unknown source database,
// stream and map its rows, normalize and validate each record, gate out
// duplicates, and flush accepted entries to the store in one batch.
//
// The run is strictly sequential; each row passes fully through the
// pipeline before the next is considered, so every duplicate check sees
// all prior acceptances. Yield points keep a host UI responsive and double
// as cancellation checks. Nothing is written to the store until the
// terminal flush, so a cancelled run leaves storage untouched.

use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::Connection;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::dedupe_gate::{DedupeGate, GateDecision};
use crate::entry_builder;
use crate::entry_store::EntryStore;
use crate::error::ImportError;
use crate::field_normalizer;
use crate::row_extractor;
use crate::schema_inspector;

/// Receives (processed, total) notifications during extraction.
/// Fire-and-forget; implementations must not block.
pub trait ProgressSink: Send + Sync {
    fn report(&self, processed: usize, total: usize);
}

/// Progress sink that discards notifications
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&self, _processed: usize, _total: usize) {}
}

/// Tuning knobs for an import run
#[derive(Debug, Clone)]
pub struct ImporterConfig {
    /// Rows between cooperative yields (and cancellation checks)
    pub batch_size: usize,
}

impl Default for ImporterConfig {
    fn default() -> Self {
        Self { batch_size: 100 }
    }
}

/// Summary of one completed import run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportRunResult {
    pub entries_imported: usize,
    pub duplicates_skipped: usize,
    pub total_processed: usize,
    pub errors: Vec<String>,
}

/// One-shot importer for legacy life-log databases
pub struct LegacyImporter {
    store: Arc<dyn EntryStore>,
    progress: Arc<dyn ProgressSink>,
    config: ImporterConfig,
    cancelled: Arc<AtomicBool>,
}

impl LegacyImporter {
    pub fn new(store: Arc<dyn EntryStore>) -> Self {
        Self::with_config(store, ImporterConfig::default())
    }

    pub fn with_config(store: Arc<dyn EntryStore>, config: ImporterConfig) -> Self {
        Self {
            store,
            progress: Arc::new(NullProgress),
            config,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Attach a progress sink
    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    /// Flag that cancels the run at its next yield point.
    /// Cancelling before the terminal flush leaves the store untouched.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Run a full import against a legacy database file.
    /// Safe to re-run against the same source: previously imported entries
    /// are detected as duplicates, not inserted twice.
    pub async fn import_from(&self, path: impl AsRef<Path>) -> Result<ImportRunResult, ImportError> {
        let path = path.as_ref();
        log::info!("Starting legacy import from {}", path.display());

        let options = SqliteConnectOptions::new().filename(path).read_only(true);
        let mut conn = SqliteConnection::connect_with(&options)
            .await
            .map_err(|e| ImportError::DatabaseOpen(e.to_string()))?;

        // The source handle is owned by this run; close it on every path out
        let outcome = self.run(&mut conn).await;
        if let Err(e) = conn.close().await {
            log::warn!("Failed to close source database: {}", e);
        }

        match &outcome {
            Ok(result) => log::info!(
                "Import finished: {} imported, {} duplicate(s), {} error(s) over {} row(s)",
                result.entries_imported,
                result.duplicates_skipped,
                result.errors.len(),
                result.total_processed
            ),
            Err(e) => log::error!("Import failed: {}", e),
        }

        outcome
    }

    async fn run(&self, conn: &mut SqliteConnection) -> Result<ImportRunResult, ImportError> {
        let schema = schema_inspector::inspect(conn).await?;

        let extraction = row_extractor::extract(
            conn,
            &schema,
            self.progress.as_ref(),
            &self.cancelled,
            self.config.batch_size,
        )
        .await?;

        let existing = self.store.fetch_all().await?;
        let mut gate = DedupeGate::with_existing(&existing);

        let mut result = ImportRunResult {
            total_processed: extraction.total_rows,
            errors: extraction.errors,
            ..ImportRunResult::default()
        };
        let mut accepted = Vec::new();

        for (index, record) in extraction.records.iter().enumerate() {
            let ordinal = index + 1;

            if self.config.batch_size > 0 && ordinal % self.config.batch_size == 0 {
                if self.cancelled.load(Ordering::SeqCst) {
                    return Err(ImportError::Cancelled);
                }
                tokio::task::yield_now().await;
            }

            let mood = field_normalizer::normalize_mood(record.mood.as_deref());
            let activity = field_normalizer::normalize_activity(record.activity.as_deref());
            let category = field_normalizer::classify(record, mood, activity);
            let placement = field_normalizer::place(mood, activity);

            match entry_builder::build(record, mood, activity, category, placement) {
                Ok(entry) => match gate.check(&entry) {
                    GateDecision::Accepted => {
                        accepted.push(entry);
                        result.entries_imported += 1;
                    }
                    GateDecision::Duplicate => {
                        log::debug!("Entry {} is a duplicate, skipping", ordinal);
                        result.duplicates_skipped += 1;
                    }
                },
                Err(e) => {
                    log::warn!("Entry {} rejected: {}", ordinal, e);
                    result.errors.push(format!("entry {}: {}", ordinal, e));
                }
            }
        }

        // Last chance to bail out before anything touches the store
        if self.cancelled.load(Ordering::SeqCst) {
            return Err(ImportError::Cancelled);
        }

        self.store.insert_and_flush(&accepted).await?;
        Ok(result)
    }
}
