//! Persistence round-trip and edge case tests.
//!
//! Tests file I/O operations, JSON persistence, and config round-trip.

use std::path::PathBuf;
use tempfile::TempDir;

use crate::config::Config;
use crate::persistence::{ensure_dir, load_json, save_json};

// ============================================================================
// JSON Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_save_and_load_json_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("config.json");

    let mut config = Config::default();
    config.account.email = Some("ola@example.no".to_string());
    config.display.fade = true;
    config.display.fade_point = 0.5;

    save_json(&file_path, &config).await.unwrap();
    let loaded: Config = load_json(&file_path).await.unwrap();

    assert_eq!(loaded, config);
}

#[tokio::test]
async fn test_save_creates_parent_directories() {
    let temp_dir = TempDir::new().unwrap();
    let nested_path = temp_dir
        .path()
        .join("deeply")
        .join("nested")
        .join("config.json");

    save_json(&nested_path, &serde_json::json!({"key": "value"}))
        .await
        .unwrap();
    assert!(nested_path.exists());
}

#[tokio::test]
async fn test_load_nonexistent_file() {
    let file_path = PathBuf::from("/nonexistent/path/config.json");

    let result: Result<Config, _> = load_json(&file_path).await;
    assert!(matches!(result, Err(crate::StoreError::Io(_))));
}

#[tokio::test]
async fn test_ensure_dir_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let dir_path = temp_dir.path().join("storh");

    ensure_dir(&dir_path).await.unwrap();
    ensure_dir(&dir_path).await.unwrap();

    assert!(dir_path.is_dir());
}

#[cfg(unix)]
#[tokio::test]
async fn test_saved_config_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("storh");
    let file_path = dir.join("config.json");

    let mut config = Config::default();
    config.account.password = Some("hunter2".to_string());
    save_json(&file_path, &config).await.unwrap();

    let file_mode = std::fs::metadata(&file_path).unwrap().permissions().mode();
    let dir_mode = std::fs::metadata(&dir).unwrap().permissions().mode();
    assert_eq!(file_mode & 0o777, 0o600);
    assert_eq!(dir_mode & 0o777, 0o700);
}

// ============================================================================
// Backward Compatibility Tests
// ============================================================================

#[tokio::test]
async fn test_load_minimal_json_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("minimal.json");
    tokio::fs::write(&file_path, "{}").await.unwrap();

    let loaded: Config = load_json(&file_path).await.unwrap();
    assert_eq!(loaded, Config::default());
}

#[tokio::test]
async fn test_load_json_with_unknown_fields() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("extra_fields.json");

    let json = r#"{
        "log_level": "debug",
        "display": {"maxItems": 4, "header": "old"},
        "unknown_field": 12345,
        "nested_unknown": {"key": "value"}
    }"#;
    tokio::fs::write(&file_path, json).await.unwrap();

    let loaded: Config = load_json(&file_path).await.unwrap();
    assert_eq!(loaded.log_level, "debug");
    assert_eq!(loaded.display.max_items, 4);
}

#[tokio::test]
async fn test_atomic_write() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("atomic.json");

    save_json(&file_path, &Config::default()).await.unwrap();

    assert!(!file_path.with_extension("json.tmp").exists());
    assert!(file_path.exists());
}

// ============================================================================
// Edge Cases
// ============================================================================

#[tokio::test]
async fn test_unicode_credentials() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("unicode.json");

    let mut config = Config::default();
    config.account.email = Some("kåre@blåbær.no".to_string());
    config.account.password = Some("pässørd 日本".to_string());

    save_json(&file_path, &config).await.unwrap();
    let loaded: Config = load_json(&file_path).await.unwrap();

    assert_eq!(loaded.account, config.account);
}
