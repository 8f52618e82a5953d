//! Integration tests for configuration loading and validation
//!
//! Tests that modify environment variables hold `ENV_MUTEX`.

use clap::Parser;
use privscan::cli::Cli;
use privscan::config::load_config;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Helper function to clean up environment variables
fn cleanup_env_vars() {
    std::env::remove_var("PRIVSCAN_APPLICATION_LOG_LEVEL");
    std::env::remove_var("PRIVSCAN_SCAN_SAMPLE_SIZE");
    std::env::remove_var("PRIVSCAN_SCAN_MIN_COUNT");
    std::env::remove_var("PRIVSCAN_SCAN_EXCEPT");
    std::env::remove_var("PRIVSCAN_SCAN_SHOW_DATA");
    std::env::remove_var("TEST_PRIVSCAN_LOG_DIR");
}

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(
        r#"
[application]
log_level = "debug"

[scan]
sample_size = 250
min_count = 3
processes = 4
max_file_concurrency = 8
max_archive_depth = 4
show_data = true
show_all = true
except = "ip,mac"

[postgres]
max_connections = 4
connection_timeout_seconds = 10
statement_timeout_seconds = 60

[logging]
local_enabled = false
local_path = "/tmp/privscan"
local_rotation = "never"
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.application.log_level, "debug");
    assert_eq!(config.scan.sample_size, 250);
    assert_eq!(config.scan.min_count, 3);
    assert_eq!(config.scan.processes, Some(4));
    assert_eq!(config.scan.max_file_concurrency, 8);
    assert_eq!(config.scan.max_archive_depth, 4);
    assert!(config.scan.show_data);
    assert!(config.scan.show_all);
    assert_eq!(config.scan.except.as_deref(), Some("ip,mac"));
    assert_eq!(config.postgres.max_connections, 4);
    assert_eq!(config.postgres.statement_timeout_seconds, 60);
    assert_eq!(config.logging.local_rotation, "never");
}

#[test]
fn test_env_overrides_file_values() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config("[scan]\nsample_size = 250\nshow_data = false\n");
    std::env::set_var("PRIVSCAN_SCAN_SAMPLE_SIZE", "42");
    std::env::set_var("PRIVSCAN_SCAN_SHOW_DATA", "true");
    std::env::set_var("PRIVSCAN_SCAN_EXCEPT", "phone");

    let result = load_config(file.path());
    cleanup_env_vars();

    let config = result.unwrap();
    assert_eq!(config.scan.sample_size, 42);
    assert!(config.scan.show_data);
    assert_eq!(config.scan.except.as_deref(), Some("phone"));
}

#[test]
fn test_invalid_env_override_is_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config("[scan]\nsample_size = 250\n");
    std::env::set_var("PRIVSCAN_SCAN_MIN_COUNT", "many");

    let result = load_config(file.path());
    cleanup_env_vars();

    let err = result.unwrap_err();
    assert!(err.to_string().contains("PRIVSCAN_SCAN_MIN_COUNT"));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_env_var_substitution() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(
        r#"
[logging]
local_path = "${TEST_PRIVSCAN_LOG_DIR}"
"#,
    );
    std::env::set_var("TEST_PRIVSCAN_LOG_DIR", "/var/log/privscan");

    let result = load_config(file.path());
    cleanup_env_vars();

    assert_eq!(result.unwrap().logging.local_path, "/var/log/privscan");
}

#[test]
fn test_missing_substitution_variable() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config("[logging]\nlocal_path = \"${TEST_PRIVSCAN_LOG_DIR}\"\n");
    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("TEST_PRIVSCAN_LOG_DIR"));
}

#[test]
fn test_only_and_except_in_file_conflict() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config("[scan]\nonly = \"email\"\nexcept = \"phone\"\n");
    let err = load_config(file.path()).unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn test_malformed_toml() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config("[scan\nsample_size = ");
    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse TOML"));
}

#[test]
fn test_cli_flags_override_file() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config("[scan]\nsample_size = 250\nonly = \"email\"\n");
    let path = file.path().display().to_string();
    let cli = Cli::parse_from([
        "privscan",
        "file://data",
        "--config",
        path.as_str(),
        "--sample-size",
        "10",
        "--except",
        "ip",
        "--log-level",
        "INFO",
    ]);

    let config = cli.resolve_config().unwrap();
    assert_eq!(config.scan.sample_size, 10);
    assert_eq!(config.scan.except.as_deref(), Some("ip"));
    assert!(config.scan.only.is_none());
    assert_eq!(config.application.log_level, "info");
}
