// Lumen Journal - Row Extractor
// Streams every row of the selected entries table and maps it onto the
// loosely-typed LegacyEntry record by column-name aliases. Unrecognized
// columns survive in an open metadata map instead of being dropped.
//
// A malformed row is logged with its 1-based ordinal and skipped; only a
// failure of the read query itself aborts the run.

use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::{Column, Row, TypeInfo, ValueRef};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::ImportError;
use crate::importer::ProgressSink;
use crate::schema_inspector::{quote_identifier, RawTableSchema};

/// Loosely-typed record extracted from one source row, before any
/// semantic normalization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyEntry {
    pub original_id: Option<String>,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub mood: Option<String>,
    pub activity: Option<String>,
    pub tags: Vec<String>,
    pub metadata: HashMap<String, String>,
}

impl Default for LegacyEntry {
    fn default() -> Self {
        Self {
            original_id: None,
            content: String::new(),
            timestamp: Utc::now(),
            latitude: None,
            longitude: None,
            mood: None,
            activity: None,
            tags: Vec::new(),
            metadata: HashMap::new(),
        }
    }
}

/// Output of one extraction pass
#[derive(Debug)]
pub struct Extraction {
    pub records: Vec<LegacyEntry>,
    pub errors: Vec<String>,
    /// Rows read from the source, including skipped ones
    pub total_rows: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Id,
    Content,
    Timestamp,
    Latitude,
    Longitude,
    Mood,
    Activity,
    Tags,
}

static COLUMN_ALIASES: Lazy<HashMap<&'static str, FieldKind>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for name in ["id", "entry_id", "_id"] {
        map.insert(name, FieldKind::Id);
    }
    for name in ["content", "text", "description", "note", "entry"] {
        map.insert(name, FieldKind::Content);
    }
    for name in ["timestamp", "date", "created_at", "time"] {
        map.insert(name, FieldKind::Timestamp);
    }
    for name in ["latitude", "lat"] {
        map.insert(name, FieldKind::Latitude);
    }
    for name in ["longitude", "lng", "lon"] {
        map.insert(name, FieldKind::Longitude);
    }
    for name in ["mood", "emotion", "feeling"] {
        map.insert(name, FieldKind::Mood);
    }
    for name in ["activity", "category", "type", "action"] {
        map.insert(name, FieldKind::Activity);
    }
    for name in ["tags", "labels"] {
        map.insert(name, FieldKind::Tags);
    }
    map
});

/// Stream all rows of the schema's entries table.
/// Reports (processed, total) to the progress sink after every row and
/// yields to the scheduler every `batch_size` rows, checking the
/// cancellation flag at each yield point.
pub async fn extract(
    conn: &mut SqliteConnection,
    schema: &RawTableSchema,
    progress: &dyn ProgressSink,
    cancelled: &AtomicBool,
    batch_size: usize,
) -> Result<Extraction, ImportError> {
    let table = schema
        .entries_table
        .as_deref()
        .ok_or(ImportError::NoEntriesTableFound)?;
    let quoted = quote_identifier(table);

    let count_sql = format!("SELECT COUNT(*) FROM \"{}\"", quoted);
    let (total,): (i64,) = sqlx::query_as(&count_sql).fetch_one(&mut *conn).await?;
    let total = total.max(0) as usize;
    log::info!("Extracting {} row(s) from '{}'", total, table);

    let select_sql = format!("SELECT * FROM \"{}\"", quoted);
    let mut records = Vec::new();
    let mut errors = Vec::new();
    let mut processed = 0usize;

    {
        let mut rows = sqlx::query(&select_sql).fetch(&mut *conn);
        while let Some(row) = rows.try_next().await? {
            processed += 1;
            match map_row(&row) {
                Ok(record) => records.push(record),
                Err(message) => {
                    log::warn!("Skipping row {}: {}", processed, message);
                    errors.push(format!("row {}: {}", processed, message));
                }
            }
            progress.report(processed, total);

            if batch_size > 0 && processed % batch_size == 0 {
                if cancelled.load(Ordering::SeqCst) {
                    return Err(ImportError::Cancelled);
                }
                tokio::task::yield_now().await;
            }
        }
    }

    Ok(Extraction {
        records,
        errors,
        total_rows: processed,
    })
}

/// Decoded SQLite cell by actual storage class
enum CellValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl CellValue {
    fn into_string(self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::Integer(v) => Some(v.to_string()),
            CellValue::Real(v) => Some(v.to_string()),
            CellValue::Text(s) => Some(s),
        }
    }

    fn as_f64(&self) -> Result<Option<f64>, String> {
        match self {
            CellValue::Null => Ok(None),
            CellValue::Integer(v) => Ok(Some(*v as f64)),
            CellValue::Real(v) => Ok(Some(*v)),
            CellValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                trimmed
                    .parse::<f64>()
                    .map(Some)
                    .map_err(|_| format!("'{}' is not a number", s))
            }
        }
    }

    fn as_epoch_seconds(&self) -> Result<Option<i64>, String> {
        match self {
            CellValue::Null => Ok(None),
            CellValue::Integer(v) => Ok(Some(*v)),
            CellValue::Real(v) => Ok(Some(*v as i64)),
            CellValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                trimmed
                    .parse::<i64>()
                    .map(Some)
                    .map_err(|_| format!("'{}' is not an epoch timestamp", s))
            }
        }
    }
}

fn decode_cell(row: &SqliteRow, index: usize) -> Result<CellValue, String> {
    let raw = row.try_get_raw(index).map_err(|e| e.to_string())?;
    if raw.is_null() {
        return Ok(CellValue::Null);
    }
    let storage_class = raw.type_info().name().to_string();

    match storage_class.as_str() {
        "INTEGER" | "BOOLEAN" => row
            .try_get::<i64, _>(index)
            .map(CellValue::Integer)
            .map_err(|e| e.to_string()),
        "REAL" => row
            .try_get::<f64, _>(index)
            .map(CellValue::Real)
            .map_err(|e| e.to_string()),
        "BLOB" => row
            .try_get::<Vec<u8>, _>(index)
            .map(|bytes| CellValue::Text(String::from_utf8_lossy(&bytes).into_owned()))
            .map_err(|e| e.to_string()),
        _ => row
            .try_get::<String, _>(index)
            .map(CellValue::Text)
            .map_err(|e| e.to_string()),
    }
}

/// Map one source row onto a LegacyEntry via the alias table
fn map_row(row: &SqliteRow) -> Result<LegacyEntry, String> {
    let mut record = LegacyEntry::default();

    for (index, column) in row.columns().iter().enumerate() {
        let name = column.name().to_lowercase();
        let cell = decode_cell(row, index).map_err(|e| format!("column '{}': {}", name, e))?;

        match COLUMN_ALIASES.get(name.as_str()) {
            Some(FieldKind::Id) => record.original_id = cell.into_string(),
            Some(FieldKind::Content) => {
                if let Some(text) = cell.into_string() {
                    record.content = text;
                }
            }
            Some(FieldKind::Timestamp) => {
                if let Some(seconds) = cell
                    .as_epoch_seconds()
                    .map_err(|e| format!("column '{}': {}", name, e))?
                {
                    record.timestamp = DateTime::from_timestamp(seconds, 0)
                        .ok_or_else(|| format!("column '{}': timestamp {} out of range", name, seconds))?;
                }
            }
            Some(FieldKind::Latitude) => {
                record.latitude = filter_zero(
                    cell.as_f64().map_err(|e| format!("column '{}': {}", name, e))?,
                );
            }
            Some(FieldKind::Longitude) => {
                record.longitude = filter_zero(
                    cell.as_f64().map_err(|e| format!("column '{}': {}", name, e))?,
                );
            }
            Some(FieldKind::Mood) => record.mood = cell.into_string(),
            Some(FieldKind::Activity) => record.activity = cell.into_string(),
            Some(FieldKind::Tags) => {
                if let Some(text) = cell.into_string() {
                    record.tags = text.split(',').map(|t| t.trim().to_string()).collect();
                }
            }
            None => {
                if let Some(text) = cell.into_string() {
                    record.metadata.insert(name, text);
                }
            }
        }
    }

    Ok(record)
}

/// The legacy exporter wrote 0 for "no coordinate"; treat it as absent
fn filter_zero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::NullProgress;
    use crate::schema_inspector;
    use parking_lot::Mutex;
    use sqlx::sqlite::SqliteConnectOptions;
    use sqlx::ConnectOptions;
    use sqlx::Connection;
    use std::sync::atomic::AtomicBool;

    async fn fixture_conn(path: &std::path::Path) -> SqliteConnection {
        SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .connect()
            .await
            .unwrap()
    }

    async fn seeded_schema(conn: &mut SqliteConnection) -> RawTableSchema {
        schema_inspector::inspect(conn).await.unwrap()
    }

    struct CountingProgress {
        calls: Mutex<Vec<(usize, usize)>>,
    }

    impl ProgressSink for CountingProgress {
        fn report(&self, processed: usize, total: usize) {
            self.calls.lock().push((processed, total));
        }
    }

    #[tokio::test]
    async fn test_alias_mapping_and_metadata_fallthrough() {
        let dir = tempfile::tempdir().unwrap();
        let mut conn = fixture_conn(&dir.path().join("legacy.db")).await;

        sqlx::query(
            "CREATE TABLE diary_entries (
                id TEXT, entry TEXT, date INTEGER, lat REAL, lng REAL,
                mood TEXT, category TEXT, labels TEXT, weather TEXT
            )",
        )
        .execute(&mut conn)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO diary_entries VALUES
             ('7', 'Great hike today', 1718840400, 42.28, -83.74,
              'happy', 'exercise', ' trail, Outdoors ,', 'sunny')",
        )
        .execute(&mut conn)
        .await
        .unwrap();

        let schema = seeded_schema(&mut conn).await;
        let cancelled = AtomicBool::new(false);
        let extraction = extract(&mut conn, &schema, &NullProgress, &cancelled, 100)
            .await
            .unwrap();

        assert_eq!(extraction.total_rows, 1);
        assert!(extraction.errors.is_empty());
        let record = &extraction.records[0];
        assert_eq!(record.original_id.as_deref(), Some("7"));
        assert_eq!(record.content, "Great hike today");
        assert_eq!(record.timestamp.timestamp(), 1_718_840_400);
        assert_eq!(record.latitude, Some(42.28));
        assert_eq!(record.longitude, Some(-83.74));
        assert_eq!(record.mood.as_deref(), Some("happy"));
        assert_eq!(record.activity.as_deref(), Some("exercise"));
        assert_eq!(record.tags, vec!["trail", "Outdoors", ""]);
        assert_eq!(record.metadata.get("weather").map(String::as_str), Some("sunny"));

        conn.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_zero_coordinates_are_absent() {
        let dir = tempfile::tempdir().unwrap();
        let mut conn = fixture_conn(&dir.path().join("legacy.db")).await;

        sqlx::query("CREATE TABLE entries (text TEXT, lat REAL, lon REAL)")
            .execute(&mut conn)
            .await
            .unwrap();
        sqlx::query("INSERT INTO entries VALUES ('at the null island', 0.0, 0.0)")
            .execute(&mut conn)
            .await
            .unwrap();

        let schema = seeded_schema(&mut conn).await;
        let cancelled = AtomicBool::new(false);
        let extraction = extract(&mut conn, &schema, &NullProgress, &cancelled, 100)
            .await
            .unwrap();

        let record = &extraction.records[0];
        assert_eq!(record.latitude, None);
        assert_eq!(record.longitude, None);

        conn.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_bad_row_is_skipped_with_ordinal() {
        let dir = tempfile::tempdir().unwrap();
        let mut conn = fixture_conn(&dir.path().join("legacy.db")).await;

        sqlx::query("CREATE TABLE logs (note TEXT, time TEXT)")
            .execute(&mut conn)
            .await
            .unwrap();
        sqlx::query("INSERT INTO logs VALUES ('first', '1718840400')")
            .execute(&mut conn)
            .await
            .unwrap();
        sqlx::query("INSERT INTO logs VALUES ('second', 'yesterday-ish')")
            .execute(&mut conn)
            .await
            .unwrap();
        sqlx::query("INSERT INTO logs VALUES ('third', '1718840500')")
            .execute(&mut conn)
            .await
            .unwrap();

        let schema = seeded_schema(&mut conn).await;
        let cancelled = AtomicBool::new(false);
        let extraction = extract(&mut conn, &schema, &NullProgress, &cancelled, 100)
            .await
            .unwrap();

        assert_eq!(extraction.total_rows, 3);
        assert_eq!(extraction.records.len(), 2);
        assert_eq!(extraction.errors.len(), 1);
        assert!(extraction.errors[0].starts_with("row 2:"));

        conn.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_progress_reports_every_row() {
        let dir = tempfile::tempdir().unwrap();
        let mut conn = fixture_conn(&dir.path().join("legacy.db")).await;

        sqlx::query("CREATE TABLE entries (text TEXT)")
            .execute(&mut conn)
            .await
            .unwrap();
        for i in 0..5 {
            sqlx::query("INSERT INTO entries VALUES (?)")
                .bind(format!("entry {}", i))
                .execute(&mut conn)
                .await
                .unwrap();
        }

        let schema = seeded_schema(&mut conn).await;
        let progress = CountingProgress {
            calls: Mutex::new(Vec::new()),
        };
        let cancelled = AtomicBool::new(false);
        extract(&mut conn, &schema, &progress, &cancelled, 2).await.unwrap();

        let calls = progress.calls.lock();
        assert_eq!(calls.len(), 5);
        assert_eq!(calls[0], (1, 5));
        assert_eq!(calls[4], (5, 5));

        conn.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_table_is_fatal() {
        let schema = RawTableSchema {
            tables: vec!["sqlite_sequence".to_string()],
            entries_table: None,
            columns: Vec::new(),
        };
        let dir = tempfile::tempdir().unwrap();
        let mut conn = fixture_conn(&dir.path().join("legacy.db")).await;
        let cancelled = AtomicBool::new(false);

        let err = extract(&mut conn, &schema, &NullProgress, &cancelled, 100)
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::NoEntriesTableFound));

        conn.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_cancellation_at_batch_boundary() {
        let dir = tempfile::tempdir().unwrap();
        let mut conn = fixture_conn(&dir.path().join("legacy.db")).await;

        sqlx::query("CREATE TABLE entries (text TEXT)")
            .execute(&mut conn)
            .await
            .unwrap();
        for i in 0..10 {
            sqlx::query("INSERT INTO entries VALUES (?)")
                .bind(format!("entry {}", i))
                .execute(&mut conn)
                .await
                .unwrap();
        }

        let schema = seeded_schema(&mut conn).await;
        let cancelled = AtomicBool::new(true);
        let err = extract(&mut conn, &schema, &NullProgress, &cancelled, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::Cancelled));

        conn.close().await.unwrap();
    }
}
