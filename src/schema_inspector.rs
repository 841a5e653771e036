// Lumen Journal - Schema Inspector
// Discovers the structure of an unknown legacy SQLite database: enumerates
// its tables, picks the most likely entries table, and introspects that
// table's columns.
//
// Table selection priority:
// 1. Exact (case-insensitive) match against known legacy table names
// 2. First table whose name contains "entry" or "log"
// 3. First table outside the engine's own sqlite_* namespace
// 4. None - the extractor turns that into NoEntriesTableFound

use sqlx::sqlite::SqliteConnection;
use sqlx::Row;

use crate::error::ImportError;

/// Table names used by known legacy life-logging exports
pub const ENTRY_TABLE_CANDIDATES: &[&str] = &[
    "entries",
    "journal_entries",
    "logs",
    "life_entries",
    "diary_entries",
    "activities",
];

const INTERNAL_TABLE_PREFIX: &str = "sqlite_";

/// One column of the selected entries table
#[derive(Debug, Clone)]
pub struct ColumnInfo {
    pub name: String,
    pub declared_type: String,
}

/// Discovered structure of a legacy source database.
/// Built once per run and discarded when the run ends.
#[derive(Debug, Clone)]
pub struct RawTableSchema {
    pub tables: Vec<String>,
    pub entries_table: Option<String>,
    pub columns: Vec<ColumnInfo>,
}

/// Inspect an open legacy database and locate its entries table.
/// A database with no plausible table still yields a schema; the missing
/// table only becomes fatal once extraction is attempted.
pub async fn inspect(conn: &mut SqliteConnection) -> Result<RawTableSchema, ImportError> {
    let rows = sqlx::query("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY rowid")
        .fetch_all(&mut *conn)
        .await?;

    let tables: Vec<String> = rows
        .iter()
        .map(|row| row.try_get::<String, _>("name"))
        .collect::<Result<_, _>>()?;

    let entries_table = select_entries_table(&tables);

    let columns = match &entries_table {
        Some(table) => {
            log::info!("Selected entries table '{}'", table);
            introspect_columns(conn, table).await?
        }
        None => {
            log::warn!(
                "No entries table candidate among {} table(s): {:?}",
                tables.len(),
                tables
            );
            Vec::new()
        }
    };

    Ok(RawTableSchema {
        tables,
        entries_table,
        columns,
    })
}

/// Apply the selection priority over the discovered table names
pub fn select_entries_table(tables: &[String]) -> Option<String> {
    for candidate in ENTRY_TABLE_CANDIDATES {
        if let Some(table) = tables.iter().find(|t| t.eq_ignore_ascii_case(candidate)) {
            return Some(table.clone());
        }
    }

    if let Some(table) = tables.iter().find(|t| {
        let lower = t.to_lowercase();
        lower.contains("entry") || lower.contains("log")
    }) {
        return Some(table.clone());
    }

    tables
        .iter()
        .find(|t| !t.to_lowercase().starts_with(INTERNAL_TABLE_PREFIX))
        .cloned()
}

async fn introspect_columns(
    conn: &mut SqliteConnection,
    table: &str,
) -> Result<Vec<ColumnInfo>, ImportError> {
    // PRAGMA arguments cannot be bound; the identifier is quoted instead.
    let pragma = format!("PRAGMA table_info(\"{}\")", quote_identifier(table));
    let rows = sqlx::query(&pragma).fetch_all(&mut *conn).await?;

    let mut columns = Vec::with_capacity(rows.len());
    for row in &rows {
        columns.push(ColumnInfo {
            name: row.try_get::<String, _>("name")?,
            declared_type: row.try_get::<String, _>("type")?,
        });
    }
    Ok(columns)
}

/// Escape embedded double quotes for use inside a quoted identifier
pub(crate) fn quote_identifier(name: &str) -> String {
    name.replace('"', "\"\"")
}
