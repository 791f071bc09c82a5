//! Vault database schema SQL.

/// Secure-entry tables.
///
/// `secure_entries` holds sealed rows: `k` is the AES-256-SIV ciphertext of
/// the entry key (deterministic, so equality lookup works), `nonce`/`v` the
/// AES-256-GCM nonce and ciphertext of the value. `fallback_entries` holds
/// plain UTF-8 rows and is only written by the plaintext backend.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS secure_entries (
    k BLOB PRIMARY KEY,
    nonce BLOB NOT NULL,
    v BLOB NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER
);

CREATE TABLE IF NOT EXISTS fallback_entries (
    k TEXT PRIMARY KEY,
    v TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER
);
"#;
