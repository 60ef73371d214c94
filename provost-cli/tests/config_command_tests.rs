//! Integration tests for `provost config` command.
//!
//! Tests config loading and validation with real TOML files, the same
//! path the command handlers use.

use std::fs;
use tempfile::TempDir;

#[tokio::test]
async fn test_config_validate_valid_toml() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("provost.toml");

    let valid_config = r#"
[general]
log_level = "info"
log_format = "json"
data_dir = "/tmp/provost"

[downloader]
source_code_origins = ["vcs", "artifact"]

[storage]
backend = "file"
read_packages = true

[archiver]
enabled = true
patterns = ["LICENSE*"]

[[scanner.command]]
name = "scancode"
version = "32.0.0"
command = "scancode-json"
args = ["--quiet"]
"#;

    fs::write(&config_path, valid_config).expect("should write config");

    let result = provost_core::config::ProvostConfig::load(&config_path).await;
    assert!(result.is_ok(), "valid config should load successfully");
    let config = result.expect("load succeeded");
    assert_eq!(config.scanner.command.len(), 1);
    assert_eq!(config.scanner.command[0].name, "scancode");
}

#[tokio::test]
async fn test_config_validate_rejects_bad_log_level() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("provost.toml");

    fs::write(&config_path, "[general]\nlog_level = \"verbose\"\n").expect("should write config");

    let result = provost_core::config::ProvostConfig::load(&config_path).await;
    assert!(result.is_err(), "unknown log level should fail validation");
}

#[tokio::test]
async fn test_config_validate_rejects_invalid_toml() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("provost.toml");

    fs::write(&config_path, "[general\nbroken").expect("should write config");

    let result = provost_core::config::ProvostConfig::load(&config_path).await;
    assert!(result.is_err(), "malformed TOML should fail to load");
}

#[tokio::test]
async fn test_config_missing_file_is_an_error() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("missing.toml");

    let result = provost_core::config::ProvostConfig::load(&config_path).await;
    assert!(result.is_err(), "missing config file should be an error");
}

#[tokio::test]
async fn test_config_defaults_from_empty_file() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("provost.toml");

    fs::write(&config_path, "").expect("should write config");

    let config = provost_core::config::ProvostConfig::load(&config_path)
        .await
        .expect("empty config should use defaults");
    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.storage.backend, "file");
    assert!(config.archiver.enabled);
    assert!(config.scanner.command.is_empty());
}
