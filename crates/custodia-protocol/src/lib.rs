//! Custodia Protocol — display anonymization and privacy settings.

pub mod anonymize;
pub mod settings;

pub use anonymize::anonymize;
pub use settings::PrivacySettings;
