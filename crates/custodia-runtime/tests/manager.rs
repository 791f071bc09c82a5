//! End-to-end tests for the data protection manager.

use custodia_core::CustodiaConfig;
use custodia_runtime::{DataProtectionManager, EncryptionPolicy};
use tempfile::TempDir;

fn test_manager() -> (DataProtectionManager, TempDir) {
    let dir = TempDir::new().unwrap();
    let config = CustodiaConfig::new(dir.path()).unwrap();
    let manager = DataProtectionManager::open(&config, EncryptionPolicy::Required).unwrap();
    (manager, dir)
}

#[test]
fn store_then_get_roundtrips_and_logs_both_sides() {
    let (manager, _dir) = test_manager();

    manager.store_secure_data("last_photo_path", "/data/photo.jpg").unwrap();
    assert_eq!(
        manager.get_secure_data("last_photo_path").unwrap().as_deref(),
        Some("/data/photo.jpg")
    );

    // Most recent first: the read entry precedes the write entry.
    let logs = manager.access_logs().unwrap();
    assert_eq!(logs.len(), 2);
    assert!(logs[0].contains("DATA_ACCESS: Entry read: last_photo_path"));
    assert!(logs[1].contains("DATA_STORAGE: Entry stored securely: last_photo_path"));
}

#[test]
fn missing_key_is_absent_and_unlogged() {
    let (manager, _dir) = test_manager();

    assert_eq!(manager.get_secure_data("missing").unwrap(), None);
    assert!(manager.access_logs().unwrap().is_empty());
}

#[test]
fn log_lines_are_most_recent_first_and_well_formed() {
    let (manager, _dir) = test_manager();

    for i in 0..5 {
        manager
            .log_access("CAMERA_PERMISSION", &format!("request {}", i))
            .unwrap();
    }

    let logs = manager.access_logs().unwrap();
    assert_eq!(logs.len(), 5);
    assert!(logs[0].ends_with(" - CAMERA_PERMISSION: request 4"));
    assert!(logs[4].ends_with(" - CAMERA_PERMISSION: request 0"));
}

#[test]
fn retention_cap_holds_at_100_entries() {
    let (manager, _dir) = test_manager();

    for i in 0..105 {
        manager
            .log_access("NAVIGATION", &format!("screen {}", i))
            .unwrap();
    }

    let logs = manager.access_logs().unwrap();
    assert_eq!(logs.len(), 100);
    assert!(logs[0].ends_with("screen 104"));
    assert!(logs[99].ends_with("screen 5"));
}

#[test]
fn clear_all_data_leaves_exactly_the_clear_entry() {
    let (manager, _dir) = test_manager();

    manager.store_secure_data("last_location", "41.38, 2.17").unwrap();
    manager.log_access("LOCATION_ACCESS", "Approximate location read").unwrap();

    manager.clear_all_data().unwrap();

    assert_eq!(manager.get_secure_data("last_location").unwrap(), None);
    let logs = manager.access_logs().unwrap();
    assert_eq!(logs.len(), 1);
    assert!(logs[0].contains("DATA_MANAGEMENT: All data erased securely"));
}

#[test]
fn protection_info_reports_five_fields_without_side_effects() {
    let (manager, _dir) = test_manager();
    manager.log_access("APPLICATION", "App started").unwrap();

    let info = manager.protection_info().unwrap();
    let fields = info.fields();
    assert_eq!(fields.len(), 5);
    assert_eq!(fields[0], ("Encryption", "AES-256-GCM".to_string()));
    assert_eq!(fields[2], ("Access log entries", "1".to_string()));
    assert_eq!(fields[3], ("Last cleanup", "Never".to_string()));
    assert_eq!(fields[4], ("Security status", "Active".to_string()));

    // Reading the info panel must not grow the ledger.
    assert_eq!(manager.access_logs().unwrap().len(), 1);
}

#[test]
fn clear_records_last_cleanup_timestamp() {
    let (manager, _dir) = test_manager();
    manager.clear_all_data().unwrap();

    let info = manager.protection_info().unwrap();
    assert!(info.last_cleanup.is_some());
    assert_ne!(info.fields()[3].1, "Never");
}

#[test]
fn anonymize_matches_documented_vectors() {
    let (manager, _dir) = test_manager();
    assert_eq!(manager.anonymize("Bob5"), "****");
    assert_eq!(manager.anonymize("Al9"), "Al*");
    assert_eq!(manager.anonymize("Juan123"), "******");
}

#[test]
fn export_writes_current_lines_to_exports_dir() {
    let (manager, _dir) = test_manager();
    manager.log_access("CONTACTS_ACCESS", "3 contacts read").unwrap();
    manager.log_access("PHONE_ACCESS", "Simulated call placed").unwrap();

    let lines_before = manager.access_logs().unwrap();
    let path = manager.export_logs().unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents, lines_before.join("\n"));

    // The export itself lands in the ledger afterwards.
    let logs = manager.access_logs().unwrap();
    assert!(logs[0].contains("DATA_EXPORT"));
}

#[test]
fn privacy_toggle_persists_across_reopen() {
    let dir = TempDir::new().unwrap();
    let config = CustodiaConfig::new(dir.path()).unwrap();
    {
        let manager =
            DataProtectionManager::open(&config, EncryptionPolicy::Required).unwrap();
        assert!(manager.privacy_enabled());
        manager.set_privacy_enabled(false).unwrap();
    }

    let reopened = DataProtectionManager::open(&config, EncryptionPolicy::Required).unwrap();
    assert!(!reopened.privacy_enabled());
}

#[test]
fn secure_entries_persist_across_reopen() {
    let dir = TempDir::new().unwrap();
    let config = CustodiaConfig::new(dir.path()).unwrap();
    {
        let manager =
            DataProtectionManager::open(&config, EncryptionPolicy::Required).unwrap();
        manager.store_secure_data("last_call_timestamp", "1755950000").unwrap();
    }

    let reopened = DataProtectionManager::open(&config, EncryptionPolicy::Required).unwrap();
    assert_eq!(
        reopened.get_secure_data("last_call_timestamp").unwrap().as_deref(),
        Some("1755950000")
    );
}

#[test]
fn custom_retention_is_honored() {
    let dir = TempDir::new().unwrap();
    let config = CustodiaConfig::new(dir.path()).unwrap().with_log_retention(3);
    let manager = DataProtectionManager::open(&config, EncryptionPolicy::Required).unwrap();

    for i in 0..6 {
        manager.log_access("PERMISSION", &format!("request {}", i)).unwrap();
    }
    assert_eq!(manager.access_logs().unwrap().len(), 3);
}

#[test]
fn corrupt_keyset_respects_encryption_policy() {
    let dir = TempDir::new().unwrap();
    let config = CustodiaConfig::new(dir.path()).unwrap();
    {
        DataProtectionManager::open(&config, EncryptionPolicy::Required).unwrap();
    }
    std::fs::write(config.data_paths.vault.join("keyset.bin"), b"garbage").unwrap();

    assert!(DataProtectionManager::open(&config, EncryptionPolicy::Required).is_err());

    let downgraded =
        DataProtectionManager::open(&config, EncryptionPolicy::AllowPlaintextFallback).unwrap();
    assert!(!downgraded.is_encrypted());

    // The degraded store keeps the same key/value contract.
    downgraded.store_secure_data("k", "v").unwrap();
    assert_eq!(downgraded.get_secure_data("k").unwrap().as_deref(), Some("v"));

    let info = downgraded.protection_info().unwrap();
    assert_eq!(info.encryption, "None (plaintext fallback)");
}
