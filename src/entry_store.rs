// Lumen Journal - Entry Store
// Persistence boundary for canonical journal entries. The pipeline only
// needs two operations: read everything already persisted (to seed the
// duplicate gate) and flush a batch of accepted entries atomically.
//
// SqliteEntryStore is the durable implementation; MemoryEntryStore backs
// tests and hosts that keep entries in process.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Row, Sqlite};
use std::path::Path;

use crate::error::ImportError;
use crate::journal_entry::{
    Activity, JournalEntry, Mood, SpatialPlacement, VisualizationCategory,
};

/// Store of persisted journal entries
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// All persisted entries, in insertion order
    async fn fetch_all(&self) -> Result<Vec<JournalEntry>, ImportError>;

    /// Persist a batch atomically; either every entry lands or none does
    async fn insert_and_flush(&self, entries: &[JournalEntry]) -> Result<(), ImportError>;
}

/// SQLite-backed entry store
pub struct SqliteEntryStore {
    pool: Pool<Sqlite>,
}

impl SqliteEntryStore {
    /// Open (or create) the store database and run migrations
    pub async fn new(db_path: &Path) -> Result<Self, ImportError> {
        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await
            .map_err(|e| ImportError::Persistence(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), ImportError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS journal_entries (
                id TEXT PRIMARY KEY,
                timestamp TEXT NOT NULL,
                content TEXT NOT NULL,
                latitude REAL,
                longitude REAL,
                tags TEXT NOT NULL DEFAULT '[]',
                mood TEXT NOT NULL,
                activity TEXT NOT NULL,
                visualization_category TEXT NOT NULL,
                placement_x REAL NOT NULL DEFAULT 0,
                placement_y REAL NOT NULL DEFAULT 0,
                placement_z REAL NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| ImportError::Persistence(e.to_string()))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_journal_entries_timestamp
             ON journal_entries(timestamp)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| ImportError::Persistence(e.to_string()))?;

        log::info!("Entry store migrations completed");
        Ok(())
    }

    fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> Result<JournalEntry, ImportError> {
        let timestamp_str: String = row
            .try_get("timestamp")
            .map_err(|e| ImportError::Persistence(e.to_string()))?;
        let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| ImportError::Persistence(format!("bad stored timestamp: {}", e)))?;

        let tags_json: String = row
            .try_get("tags")
            .map_err(|e| ImportError::Persistence(e.to_string()))?;
        let tags: Vec<String> = serde_json::from_str(&tags_json)
            .map_err(|e| ImportError::Persistence(format!("bad stored tags: {}", e)))?;

        let mood: String = row
            .try_get("mood")
            .map_err(|e| ImportError::Persistence(e.to_string()))?;
        let activity: String = row
            .try_get("activity")
            .map_err(|e| ImportError::Persistence(e.to_string()))?;
        let category: String = row
            .try_get("visualization_category")
            .map_err(|e| ImportError::Persistence(e.to_string()))?;

        Ok(JournalEntry {
            id: row
                .try_get("id")
                .map_err(|e| ImportError::Persistence(e.to_string()))?,
            timestamp,
            content: row
                .try_get("content")
                .map_err(|e| ImportError::Persistence(e.to_string()))?,
            latitude: row
                .try_get("latitude")
                .map_err(|e| ImportError::Persistence(e.to_string()))?,
            longitude: row
                .try_get("longitude")
                .map_err(|e| ImportError::Persistence(e.to_string()))?,
            tags,
            mood: Mood::parse(&mood).unwrap_or_default(),
            activity: Activity::parse(&activity).unwrap_or_default(),
            visualization_category: VisualizationCategory::parse(&category).unwrap_or_default(),
            spatial_placement: SpatialPlacement::new(
                row.try_get("placement_x")
                    .map_err(|e| ImportError::Persistence(e.to_string()))?,
                row.try_get("placement_y")
                    .map_err(|e| ImportError::Persistence(e.to_string()))?,
                row.try_get("placement_z")
                    .map_err(|e| ImportError::Persistence(e.to_string()))?,
            ),
        })
    }
}

#[async_trait]
impl EntryStore for SqliteEntryStore {
    async fn fetch_all(&self) -> Result<Vec<JournalEntry>, ImportError> {
        let rows = sqlx::query(
            "SELECT id, timestamp, content, latitude, longitude, tags,
                    mood, activity, visualization_category,
                    placement_x, placement_y, placement_z
             FROM journal_entries ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ImportError::Persistence(e.to_string()))?;

        rows.iter().map(Self::row_to_entry).collect()
    }

    async fn insert_and_flush(&self, entries: &[JournalEntry]) -> Result<(), ImportError> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ImportError::Persistence(e.to_string()))?;

        for entry in entries {
            let tags_json = serde_json::to_string(&entry.tags)
                .map_err(|e| ImportError::Persistence(e.to_string()))?;

            sqlx::query(
                r#"
                INSERT INTO journal_entries
                    (id, timestamp, content, latitude, longitude, tags,
                     mood, activity, visualization_category,
                     placement_x, placement_y, placement_z)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&entry.id)
            .bind(entry.timestamp.to_rfc3339())
            .bind(&entry.content)
            .bind(entry.latitude)
            .bind(entry.longitude)
            .bind(tags_json)
            .bind(entry.mood.as_str())
            .bind(entry.activity.as_str())
            .bind(entry.visualization_category.as_str())
            .bind(entry.spatial_placement.x)
            .bind(entry.spatial_placement.y)
            .bind(entry.spatial_placement.z)
            .execute(&mut *tx)
            .await
            .map_err(|e| ImportError::Persistence(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| ImportError::Persistence(e.to_string()))?;

        log::info!("Flushed {} entr(ies) to store", entries.len());
        Ok(())
    }
}

/// In-process entry store
#[derive(Default)]
pub struct MemoryEntryStore {
    entries: Mutex<Vec<JournalEntry>>,
}

impl MemoryEntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current number of persisted entries
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[async_trait]
impl EntryStore for MemoryEntryStore {
    async fn fetch_all(&self) -> Result<Vec<JournalEntry>, ImportError> {
        Ok(self.entries.lock().clone())
    }

    async fn insert_and_flush(&self, entries: &[JournalEntry]) -> Result<(), ImportError> {
        self.entries.lock().extend_from_slice(entries);
        Ok(())
    }
}
