//! Access-log records.

use serde::{Deserialize, Serialize};

/// Wall-clock timestamp format used in log lines.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One recorded access to sensitive data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessLogEntry {
    /// Local wall-clock time, `%Y-%m-%d %H:%M:%S`.
    pub timestamp: String,
    /// Caller-chosen category, e.g. `DATA_ACCESS` or `CAMERA_PERMISSION`.
    pub category: String,
    /// Human-readable description of what happened.
    pub action: String,
}

impl AccessLogEntry {
    /// Render the entry as a single display line.
    pub fn line(&self) -> String {
        format!("{} - {}: {}", self.timestamp, self.category, self.action)
    }
}
