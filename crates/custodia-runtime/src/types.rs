//! Runtime types.

use serde::Serialize;

/// What to do when the encrypted vault cannot be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncryptionPolicy {
    /// Propagate the initialization error to the caller.
    Required,
    /// Downgrade to the plaintext backend. The downgrade is observable via
    /// `DataProtectionManager::is_encrypted`.
    AllowPlaintextFallback,
}

/// Well-known log categories written by the manager itself. Collaborators
/// may pass any category of their own to `log_access`.
pub mod categories {
    pub const DATA_STORAGE: &str = "DATA_STORAGE";
    pub const DATA_ACCESS: &str = "DATA_ACCESS";
    pub const DATA_MANAGEMENT: &str = "DATA_MANAGEMENT";
    pub const DATA_EXPORT: &str = "DATA_EXPORT";
    pub const PRIVACY_SETTINGS: &str = "PRIVACY_SETTINGS";
}

/// Snapshot of the protection layer's status.
#[derive(Debug, Clone, Serialize)]
pub struct ProtectionInfo {
    /// Algorithm protecting values at rest.
    pub encryption: String,
    /// Storage description.
    pub storage: String,
    /// Current number of retained log entries.
    pub log_entries: usize,
    /// Timestamp of the last `clear_all_data`, if any.
    pub last_cleanup: Option<String>,
    /// Static status string.
    pub status: String,
}

impl ProtectionInfo {
    /// The five labeled status lines shown by an info panel.
    pub fn fields(&self) -> [(&'static str, String); 5] {
        [
            ("Encryption", self.encryption.clone()),
            ("Storage", self.storage.clone()),
            ("Access log entries", self.log_entries.to_string()),
            (
                "Last cleanup",
                self.last_cleanup.clone().unwrap_or_else(|| "Never".into()),
            ),
            ("Security status", self.status.clone()),
        ]
    }
}
