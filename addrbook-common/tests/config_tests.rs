//! Tests for configuration loading and database path resolution
//!
//! Covers:
//! - Missing TOML files fall back to defaults instead of failing
//! - Priority order for database path resolution (CLI > ENV > TOML > default)
//!
//! Tests that manipulate ADDRBOOK_DATABASE are marked with #[serial]
//! so they never run in parallel with each other.

use addrbook_common::config::{
    default_database_path, resolve_database_path, TomlConfig, DATABASE_ENV_VAR,
};
use addrbook_common::Error;
use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[test]
fn test_missing_config_file_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("does-not-exist.toml");

    let config = TomlConfig::load_or_default(Some(missing.as_path()))
        .expect("Missing config file must not be fatal");

    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_config_file_is_loaded() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        r#"
        [server]
        bind_address = "0.0.0.0:9000"
        cors_origins = ["https://addresses.example.com"]

        [database]
        path = "/srv/addrbook/book.db"

        [logging]
        level = "debug"
        "#,
    )
    .unwrap();

    let config = TomlConfig::load_or_default(Some(config_path.as_path())).unwrap();

    assert_eq!(config.server.bind_address, "0.0.0.0:9000");
    assert_eq!(config.server.cors_origins, vec!["https://addresses.example.com"]);
    assert_eq!(config.database.path, Some(PathBuf::from("/srv/addrbook/book.db")));
    assert_eq!(config.logging.level, "debug");
    // Section not present in file keeps its default
    assert!(config.api.empty_list_is_not_found);
    assert_eq!(config.bind_address().unwrap().port(), 9000);
}

#[test]
fn test_malformed_config_file_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, "[logging]\nlevel = [unterminated").unwrap();

    let result = TomlConfig::load_or_default(Some(config_path.as_path()));

    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_cli_argument_wins() {
    env::set_var(DATABASE_ENV_VAR, "/tmp/addrbook-env.db");
    let mut config = TomlConfig::default();
    config.database.path = Some(PathBuf::from("/tmp/addrbook-toml.db"));

    let resolved = resolve_database_path(Some(Path::new("/tmp/addrbook-cli.db")), &config);

    assert_eq!(resolved, PathBuf::from("/tmp/addrbook-cli.db"));
    env::remove_var(DATABASE_ENV_VAR);
}

#[test]
#[serial]
fn test_env_var_beats_toml() {
    env::set_var(DATABASE_ENV_VAR, "/tmp/addrbook-env.db");
    let mut config = TomlConfig::default();
    config.database.path = Some(PathBuf::from("/tmp/addrbook-toml.db"));

    let resolved = resolve_database_path(None, &config);

    assert_eq!(resolved, PathBuf::from("/tmp/addrbook-env.db"));
    env::remove_var(DATABASE_ENV_VAR);
}

#[test]
#[serial]
fn test_toml_beats_default() {
    env::remove_var(DATABASE_ENV_VAR);
    let mut config = TomlConfig::default();
    config.database.path = Some(PathBuf::from("/tmp/addrbook-toml.db"));

    let resolved = resolve_database_path(None, &config);

    assert_eq!(resolved, PathBuf::from("/tmp/addrbook-toml.db"));
}

#[test]
#[serial]
fn test_falls_back_to_compiled_default() {
    env::remove_var(DATABASE_ENV_VAR);

    let resolved = resolve_database_path(None, &TomlConfig::default());

    assert_eq!(resolved, default_database_path());
}

#[test]
#[serial]
fn test_blank_env_var_is_ignored() {
    env::set_var(DATABASE_ENV_VAR, "   ");

    let resolved = resolve_database_path(None, &TomlConfig::default());

    assert_eq!(resolved, default_database_path());
    env::remove_var(DATABASE_ENV_VAR);
}
