//! Bounded, append-only access-log ledger.

use std::path::{Path, PathBuf};

use chrono::Local;
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use tracing::info;

use custodia_core::{Error, Result, DEFAULT_LOG_RETENTION};

use crate::entry::{AccessLogEntry, TIMESTAMP_FORMAT};

const DB_FILE: &str = "access_log.db";

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS access_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    ts TEXT NOT NULL,
    category TEXT NOT NULL,
    action TEXT NOT NULL
);
"#;

/// Append-only log of sensitive-data accesses with a retention cap.
///
/// Every append stamps the current wall-clock time and then trims the table
/// to the newest `retention` rows, so the cap holds after every write.
pub struct AccessLedger {
    conn: Mutex<Connection>,
    retention: usize,
    db_path: PathBuf,
}

impl AccessLedger {
    /// Open or create the ledger in `dir` with the default 100-entry cap.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_retention(dir, DEFAULT_LOG_RETENTION)
    }

    /// Open or create the ledger in `dir` with a custom retention cap.
    /// The cap is clamped to at least 1: a zero cap would make every append
    /// evict the row it just wrote.
    pub fn open_with_retention(dir: impl AsRef<Path>, retention: usize) -> Result<Self> {
        let retention = retention.max(1);
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| Error::Storage(e.to_string()))?;
        let db_path = dir.join(DB_FILE);

        let conn = Connection::open(&db_path).map_err(|e| Error::Database(e.to_string()))?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(|e| Error::Database(e.to_string()))?;
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| Error::Database(format!("Schema init failed: {}", e)))?;

        let ledger = Self {
            conn: Mutex::new(conn),
            retention,
            db_path,
        };
        info!(
            "AccessLedger initialized: {} entries, retention={}, path={}",
            ledger.len()?,
            retention,
            ledger.db_path.display()
        );
        Ok(ledger)
    }

    /// Append an entry stamped with the current wall-clock time, then trim
    /// to the retention cap.
    pub fn append(&self, category: &str, action: &str) -> Result<()> {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();

        let conn = self.conn.lock();
        conn.prepare_cached("INSERT INTO access_log (ts, category, action) VALUES (?1, ?2, ?3)")
            .map_err(|e| Error::Database(e.to_string()))?
            .execute(params![timestamp, category, action])
            .map_err(|e| Error::Database(e.to_string()))?;

        // Evict the oldest rows beyond the cap.
        conn.execute(
            "DELETE FROM access_log WHERE id NOT IN (
                SELECT id FROM access_log ORDER BY id DESC LIMIT ?1
            )",
            params![self.retention as i64],
        )
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    /// All retained entries, most recent first.
    pub fn entries(&self) -> Result<Vec<AccessLogEntry>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached("SELECT ts, category, action FROM access_log ORDER BY id DESC")
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(AccessLogEntry {
                    timestamp: row.get(0)?,
                    category: row.get(1)?,
                    action: row.get(2)?,
                })
            })
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    /// All retained entries rendered as display lines, most recent first.
    pub fn lines(&self) -> Result<Vec<String>> {
        Ok(self.entries()?.iter().map(AccessLogEntry::line).collect())
    }

    /// Number of retained entries.
    pub fn len(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM access_log", [], |row| row.get(0))
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Erase every retained entry.
    pub fn clear(&self) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM access_log", [])
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    /// The configured retention cap.
    pub fn retention(&self) -> usize {
        self.retention
    }
}
