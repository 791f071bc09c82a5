//! Custodia Runtime — the `DataProtectionManager` facade.
//!
//! Ties the encrypted vault, the bounded access-log ledger, and the
//! anonymization/settings protocol together behind the surface that
//! permission-screen collaborators call.

pub mod manager;
pub mod types;

pub use manager::DataProtectionManager;
pub use types::{categories, EncryptionPolicy, ProtectionInfo};
