//! Data protection manager — the single entry point for collaborators.

use std::path::PathBuf;

use chrono::Local;
use parking_lot::RwLock;
use tracing::{info, warn};

use custodia_audit::{AccessLedger, TIMESTAMP_FORMAT};
use custodia_core::{CustodiaConfig, Result};
use custodia_protocol::{anonymize, PrivacySettings};
use custodia_vault::SecureStore;

use crate::types::{categories, EncryptionPolicy, ProtectionInfo};

/// Secure key under which the last-cleanup timestamp is recorded.
const LAST_CLEANUP_KEY: &str = "last_cleanup";

/// Owns the encrypted vault, the access-log ledger, and the privacy
/// settings. Constructed explicitly and shared by reference; all operations
/// are valid once `open` returns.
pub struct DataProtectionManager {
    store: SecureStore,
    ledger: AccessLedger,
    settings: RwLock<PrivacySettings>,
    settings_path: PathBuf,
    exports_dir: PathBuf,
}

impl DataProtectionManager {
    /// Open every backing store. Encryption-setup failure is the one
    /// designed failure path: `policy` decides whether it propagates or
    /// downgrades to the plaintext backend.
    pub fn open(config: &CustodiaConfig, policy: EncryptionPolicy) -> Result<Self> {
        let store = match SecureStore::open_encrypted(&config.data_paths.vault) {
            Ok(store) => store,
            Err(err) => match policy {
                EncryptionPolicy::Required => return Err(err),
                EncryptionPolicy::AllowPlaintextFallback => {
                    warn!(
                        "Encrypted vault unavailable ({}), downgrading to plaintext store",
                        err
                    );
                    SecureStore::open_plain(&config.data_paths.vault)?
                }
            },
        };

        let ledger = AccessLedger::open_with_retention(
            &config.data_paths.access_log,
            config.log_retention,
        )?;
        let settings = PrivacySettings::load(&config.data_paths.settings_file)?;

        info!(
            "DataProtectionManager ready: encrypted={}, retention={}",
            store.is_encrypted(),
            ledger.retention()
        );

        Ok(Self {
            store,
            ledger,
            settings: RwLock::new(settings),
            settings_path: config.data_paths.settings_file.clone(),
            exports_dir: config.data_paths.exports.clone(),
        })
    }

    /// Whether secure entries are sealed at rest.
    pub fn is_encrypted(&self) -> bool {
        self.store.is_encrypted()
    }

    /// Store a sensitive entry and record the write in the ledger.
    pub fn store_secure_data(&self, key: &str, value: &str) -> Result<()> {
        self.store.put(key, value)?;
        self.ledger.append(
            categories::DATA_STORAGE,
            &format!("Entry stored securely: {}", key),
        )
    }

    /// Read a sensitive entry. A hit is recorded in the ledger; a miss
    /// returns `None` without a log entry.
    pub fn get_secure_data(&self, key: &str) -> Result<Option<String>> {
        let value = self.store.get(key)?;
        if value.is_some() {
            self.ledger
                .append(categories::DATA_ACCESS, &format!("Entry read: {}", key))?;
        }
        Ok(value)
    }

    /// Append a collaborator-supplied entry to the access log.
    pub fn log_access(&self, category: &str, action: &str) -> Result<()> {
        self.ledger.append(category, action)
    }

    /// All retained log lines, most recent first.
    pub fn access_logs(&self) -> Result<Vec<String>> {
        self.ledger.lines()
    }

    /// Erase all secure entries and all log entries, then record the
    /// cleanup: the ledger holds exactly one entry afterwards.
    pub fn clear_all_data(&self) -> Result<()> {
        self.store.clear()?;
        self.ledger.clear()?;

        // Bookkeeping write goes through the backend directly so the clear
        // entry below stays the only one in the ledger.
        let stamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        self.store.put(LAST_CLEANUP_KEY, &stamp)?;

        self.ledger
            .append(categories::DATA_MANAGEMENT, "All data erased securely")
    }

    /// Status snapshot for the protection layer. Reads are side-effect-free.
    pub fn protection_info(&self) -> Result<ProtectionInfo> {
        let (encryption, storage) = if self.store.is_encrypted() {
            ("AES-256-GCM", "Local encrypted store")
        } else {
            ("None (plaintext fallback)", "Local plaintext store")
        };
        Ok(ProtectionInfo {
            encryption: encryption.into(),
            storage: storage.into(),
            log_entries: self.ledger.len()?,
            last_cleanup: self.store.get(LAST_CLEANUP_KEY)?,
            status: "Active".into(),
        })
    }

    /// Anonymize text for display. Stateless.
    pub fn anonymize(&self, text: &str) -> String {
        anonymize(text)
    }

    /// Write the current log lines to a timestamped text file under the
    /// exports directory. Returns the file path.
    pub fn export_logs(&self) -> Result<PathBuf> {
        let lines = self.ledger.lines()?;
        let filename = format!("access-logs-{}.txt", Local::now().format("%Y%m%d-%H%M%S"));
        let path = self.exports_dir.join(filename);
        std::fs::write(&path, lines.join("\n"))?;

        self.ledger.append(
            categories::DATA_EXPORT,
            &format!("Access logs exported: {}", path.display()),
        )?;
        Ok(path)
    }

    /// Current privacy master switch.
    pub fn privacy_enabled(&self) -> bool {
        self.settings.read().privacy_enabled
    }

    /// Toggle the privacy master switch and persist it.
    pub fn set_privacy_enabled(&self, enabled: bool) -> Result<()> {
        {
            let mut settings = self.settings.write();
            settings.privacy_enabled = enabled;
            settings.save(&self.settings_path)?;
        }
        let action = if enabled {
            "Privacy protection enabled"
        } else {
            "Privacy protection disabled"
        };
        self.ledger.append(categories::PRIVACY_SETTINGS, action)
    }
}
