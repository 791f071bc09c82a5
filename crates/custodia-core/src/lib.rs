//! Custodia Core — configuration, data directories, shared error type.

pub mod config;
pub mod error;

pub use config::{CustodiaConfig, DataPaths, DEFAULT_LOG_RETENTION};
pub use error::{Error, Result};
