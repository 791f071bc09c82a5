//! Persisted privacy settings document.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use custodia_core::Result;

/// User-facing privacy toggles, persisted as a JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivacySettings {
    /// Master switch for the protection layer. Defaults to enabled.
    pub privacy_enabled: bool,
}

impl Default for PrivacySettings {
    fn default() -> Self {
        Self {
            privacy_enabled: true,
        }
    }
}

impl PrivacySettings {
    /// Load settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Persist settings to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
