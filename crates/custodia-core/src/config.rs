//! Configuration and data directory management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default retention bound for the access-log ledger.
pub const DEFAULT_LOG_RETENTION: usize = 100;

/// Paths to all Custodia data directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// Encrypted vault directory (`data/vault/`).
    pub vault: PathBuf,
    /// Access-log ledger directory (`data/access-log/`).
    pub access_log: PathBuf,
    /// Exported log files (`data/exports/`).
    pub exports: PathBuf,
    /// Privacy settings document (`data/privacy-settings.json`).
    pub settings_file: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates directories if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let paths = Self {
            vault: root.join("vault"),
            access_log: root.join("access-log"),
            exports: root.join("exports"),
            settings_file: root.join("privacy-settings.json"),
            root,
        };
        paths.ensure_dirs()?;
        Ok(paths)
    }

    /// Create all required directories.
    fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.vault)?;
        std::fs::create_dir_all(&self.access_log)?;
        std::fs::create_dir_all(&self.exports)?;
        Ok(())
    }
}

/// Top-level Custodia configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustodiaConfig {
    /// Data directory paths.
    pub data_paths: DataPaths,
    /// Maximum number of access-log entries retained.
    pub log_retention: usize,
}

impl CustodiaConfig {
    /// Create configuration for a data directory with default retention.
    pub fn new(data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        Ok(Self {
            data_paths: DataPaths::new(data_dir)?,
            log_retention: DEFAULT_LOG_RETENTION,
        })
    }

    /// Create configuration from environment and defaults.
    ///
    /// `CUSTODIA_DATA` overrides the data directory,
    /// `CUSTODIA_LOG_RETENTION` the ledger bound.
    pub fn from_env(default_data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let data_dir = std::env::var("CUSTODIA_DATA")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_data_dir.as_ref().to_path_buf());

        let log_retention = std::env::var("CUSTODIA_LOG_RETENTION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_LOG_RETENTION);

        Ok(Self {
            data_paths: DataPaths::new(data_dir)?,
            log_retention,
        })
    }

    /// Override the ledger retention bound.
    pub fn with_log_retention(mut self, retention: usize) -> Self {
        self.log_retention = retention;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // One test covers all env cases: the variables are process-global, so
    // splitting them across parallel tests would race.
    #[test]
    fn test_from_env_overrides_and_fallbacks() {
        let default_dir = TempDir::new().unwrap();
        let override_dir = TempDir::new().unwrap();

        std::env::remove_var("CUSTODIA_DATA");
        std::env::remove_var("CUSTODIA_LOG_RETENTION");
        let config = CustodiaConfig::from_env(default_dir.path()).unwrap();
        assert_eq!(config.data_paths.root, default_dir.path());
        assert_eq!(config.log_retention, DEFAULT_LOG_RETENTION);

        std::env::set_var("CUSTODIA_DATA", override_dir.path());
        std::env::set_var("CUSTODIA_LOG_RETENTION", "25");
        let config = CustodiaConfig::from_env(default_dir.path()).unwrap();
        assert_eq!(config.data_paths.root, override_dir.path());
        assert_eq!(config.log_retention, 25);
        assert!(override_dir.path().join("vault").is_dir());

        // Unparseable retention falls back to the default.
        std::env::set_var("CUSTODIA_LOG_RETENTION", "not a number");
        let config = CustodiaConfig::from_env(default_dir.path()).unwrap();
        assert_eq!(config.log_retention, DEFAULT_LOG_RETENTION);

        std::env::remove_var("CUSTODIA_DATA");
        std::env::remove_var("CUSTODIA_LOG_RETENTION");
    }
}
