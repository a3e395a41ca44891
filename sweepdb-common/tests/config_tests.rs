//! Configuration loading against the real process environment
//!
//! Tests that set `REW_DATA_DIR` / `SWEEPDB_*` variables are `#[serial]` so
//! they never observe each other's environment.

use serial_test::serial;
use std::env;
use std::path::PathBuf;
use sweepdb_common::config::{
    load_toml_config, IngestConfig, ENV_BASE_URL, ENV_CONFIG_FILE, ENV_DATABASE, ENV_DATA_ROOT, ENV_HOST_NAME,
};
use sweepdb_common::Error;
use tempfile::TempDir;

const ALL_VARS: [&str; 5] = [ENV_DATA_ROOT, ENV_DATABASE, ENV_HOST_NAME, ENV_BASE_URL, ENV_CONFIG_FILE];

fn clear_env() {
    for var in ALL_VARS {
        env::remove_var(var);
    }
}

#[test]
fn test_missing_toml_file_gives_defaults() {
    let config = load_toml_config(&PathBuf::from("/nonexistent/sweepdb/config.toml")).unwrap();
    assert!(config.data_root.is_none());
    assert!(config.host_name.is_none());
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_invalid_toml_file_is_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "data_root = [not toml").unwrap();

    let result = load_toml_config(&path);
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_load_reads_explicit_config_file() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sweepdb.toml");
    std::fs::write(
        &path,
        r#"
        data_root = "/srv/rew"
        database_path = "/srv/catalog/sweep.db"
        host_name = "lab-2"
        base_url = "http://lab-2.local"

        [logging]
        level = "debug"
        "#,
    )
    .unwrap();
    env::set_var(ENV_CONFIG_FILE, &path);

    let config = IngestConfig::load().unwrap();
    assert_eq!(config.data_root, PathBuf::from("/srv/rew"));
    assert_eq!(config.database_path, PathBuf::from("/srv/catalog/sweep.db"));
    assert_eq!(config.host.host_name, "lab-2");
    assert_eq!(config.host.base_url, "http://lab-2.local");
    assert_eq!(config.log_level, "debug");

    clear_env();
}

#[test]
#[serial]
fn test_environment_beats_config_file() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sweepdb.toml");
    std::fs::write(&path, "data_root = \"/srv/rew\"\nhost_name = \"lab-2\"\n").unwrap();
    env::set_var(ENV_CONFIG_FILE, &path);
    env::set_var(ENV_DATA_ROOT, "/mnt/captures");
    env::set_var(ENV_HOST_NAME, "bench-7");

    let config = IngestConfig::load().unwrap();
    assert_eq!(config.data_root, PathBuf::from("/mnt/captures"));
    assert_eq!(config.database_path, PathBuf::from("/mnt/captures/catalog.db"));
    assert_eq!(config.host.host_name, "bench-7");
    assert_eq!(config.host.base_url, "http://placeholder.local");

    clear_env();
}

#[test]
#[serial]
fn test_broken_config_file_fails_load() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[logging\nlevel = 3").unwrap();
    env::set_var(ENV_CONFIG_FILE, &path);

    assert!(matches!(IngestConfig::load(), Err(Error::Config(_))));

    clear_env();
}
