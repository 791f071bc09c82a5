//! Custodia Vault — encrypted key-value store for sensitive entries.
//!
//! Entry keys are sealed with AES-256-SIV and values with AES-256-GCM; the
//! per-vault keyset is wrapped with a device-held master key. A plaintext
//! backend exists for the explicit degraded mode chosen by the caller.

pub mod cipher;
pub mod keyset;
pub mod schema;
pub mod store;

pub use cipher::VaultCipher;
pub use keyset::Keyset;
pub use store::SecureStore;
