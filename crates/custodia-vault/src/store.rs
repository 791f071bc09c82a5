//! SQLite-backed secure-entry store.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use custodia_core::{Error, Result};

use crate::cipher::VaultCipher;
use crate::keyset::{load_or_create_keyset, load_or_create_master_key};
use crate::schema::SCHEMA_SQL;

const DB_FILE: &str = "vault.db";
const MASTER_KEY_FILE: &str = "master.key";
const KEYSET_FILE: &str = "keyset.bin";

enum Backend {
    Encrypted(VaultCipher),
    Plain,
}

/// Key-value store for sensitive entries.
///
/// `open_encrypted` is the normal path; `open_plain` is the documented
/// degraded mode and writes to a separate table, so the two backends never
/// mix rows.
pub struct SecureStore {
    conn: Mutex<Connection>,
    backend: Backend,
    db_path: PathBuf,
}

impl SecureStore {
    /// Open or create the encrypted store in `dir`.
    ///
    /// Errors if the master key or wrapped keyset cannot be read, unwrapped,
    /// or created; the caller decides whether to downgrade to `open_plain`.
    pub fn open_encrypted(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| Error::Storage(e.to_string()))?;

        let master_key = load_or_create_master_key(&dir.join(MASTER_KEY_FILE))?;
        let keyset = load_or_create_keyset(&dir.join(KEYSET_FILE), &master_key)?;
        let cipher = VaultCipher::new(&keyset)?;

        let store = Self::open_with_backend(dir, Backend::Encrypted(cipher))?;
        info!(
            "SecureStore initialized (encrypted): {} entries, path={}",
            store.len()?,
            store.db_path.display()
        );
        Ok(store)
    }

    /// Open or create the plaintext fallback store in `dir`.
    pub fn open_plain(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| Error::Storage(e.to_string()))?;

        let store = Self::open_with_backend(dir, Backend::Plain)?;
        info!(
            "SecureStore initialized (plaintext): {} entries, path={}",
            store.len()?,
            store.db_path.display()
        );
        Ok(store)
    }

    fn open_with_backend(dir: &Path, backend: Backend) -> Result<Self> {
        let db_path = dir.join(DB_FILE);
        let conn = Self::create_connection(&db_path)?;
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| Error::Database(format!("Schema init failed: {}", e)))?;
        Ok(Self {
            conn: Mutex::new(conn),
            backend,
            db_path,
        })
    }

    fn create_connection(db_path: &Path) -> Result<Connection> {
        let conn = Connection::open(db_path).map_err(|e| Error::Database(e.to_string()))?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(conn)
    }

    /// Whether entries are sealed at rest.
    pub fn is_encrypted(&self) -> bool {
        matches!(self.backend, Backend::Encrypted(_))
    }

    /// Write an entry. An existing key is overwritten.
    pub fn put(&self, key: &str, value: &str) -> Result<()> {
        let now = now_millis();
        match &self.backend {
            Backend::Encrypted(cipher) => {
                let sealed_key = cipher.seal_key(key)?;
                let (nonce, ciphertext) = cipher.seal_value(value)?;
                let conn = self.conn.lock();
                conn.prepare_cached(
                    "INSERT OR REPLACE INTO secure_entries (k, nonce, v, created_at, updated_at) \
                     VALUES (?1, ?2, ?3, ?4, ?4)",
                )
                .map_err(|e| Error::Database(e.to_string()))?
                .execute(params![sealed_key, nonce.as_slice(), ciphertext, now])
                .map_err(|e| Error::Database(e.to_string()))?;
            }
            Backend::Plain => {
                let conn = self.conn.lock();
                conn.prepare_cached(
                    "INSERT OR REPLACE INTO fallback_entries (k, v, created_at, updated_at) \
                     VALUES (?1, ?2, ?3, ?3)",
                )
                .map_err(|e| Error::Database(e.to_string()))?
                .execute(params![key, value, now])
                .map_err(|e| Error::Database(e.to_string()))?;
            }
        }
        Ok(())
    }

    /// Read an entry. Returns `None` for a key that was never written.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        match &self.backend {
            Backend::Encrypted(cipher) => {
                let sealed_key = cipher.seal_key(key)?;
                let row: Option<(Vec<u8>, Vec<u8>)> = {
                    let conn = self.conn.lock();
                    let row = conn
                        .prepare_cached("SELECT nonce, v FROM secure_entries WHERE k = ?1")
                        .map_err(|e| Error::Database(e.to_string()))?
                        .query_row(params![sealed_key], |row| {
                            Ok((row.get(0)?, row.get(1)?))
                        })
                        .optional()
                        .map_err(|e| Error::Database(e.to_string()))?;
                    row
                };
                match row {
                    Some((nonce, ciphertext)) => {
                        Ok(Some(cipher.open_value(&nonce, &ciphertext)?))
                    }
                    None => Ok(None),
                }
            }
            Backend::Plain => {
                let conn = self.conn.lock();
                let row = conn
                    .prepare_cached("SELECT v FROM fallback_entries WHERE k = ?1")
                    .map_err(|e| Error::Database(e.to_string()))?
                    .query_row(params![key], |row| row.get(0))
                    .optional()
                    .map_err(|e| Error::Database(e.to_string()));
                row
            }
        }
    }

    /// Erase every entry, in both tables.
    pub fn clear(&self) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM secure_entries", [])
            .map_err(|e| Error::Database(e.to_string()))?;
        conn.execute("DELETE FROM fallback_entries", [])
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    /// Count entries in the active backend's table.
    pub fn len(&self) -> Result<i64> {
        let table = match &self.backend {
            Backend::Encrypted(_) => "secure_entries",
            Backend::Plain => "fallback_entries",
        };
        let conn = self.conn.lock();
        let count: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(count)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64
}
