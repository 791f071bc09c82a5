//! Custodia Audit — bounded access-log ledger.

pub mod entry;
pub mod ledger;

pub use entry::{AccessLogEntry, TIMESTAMP_FORMAT};
pub use ledger::AccessLedger;
