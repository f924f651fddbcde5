// SPDX-FileCopyrightText: 2026 Famsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the famsync configuration system.

use std::path::Path;

use famsync_config::diagnostic::ConfigError;
use famsync_config::model::FamsyncConfig;
use famsync_config::{credentials, load_and_validate_str, load_config_from_path, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_famsync_config() {
    let toml = r#"
[account]
login = "jane@example.com"
password = "hunter2"

[remote]
base_url = "http://127.0.0.1:8080"
timeout_secs = 5
user_agent = "test-agent"

[storage]
database_path = "/tmp/famsync-test.db"
wal_mode = false
reference_page_size = 25

[sync]
family_concurrency = 2
file_concurrency = 4
max_pages = 50

[log]
level = "debug"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.account.login.as_deref(), Some("jane@example.com"));
    assert_eq!(config.account.password.as_deref(), Some("hunter2"));
    assert_eq!(config.remote.base_url, "http://127.0.0.1:8080");
    assert_eq!(config.remote.timeout_secs, 5);
    assert_eq!(config.remote.user_agent, "test-agent");
    assert_eq!(config.storage.database_path, "/tmp/famsync-test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.storage.reference_page_size, 25);
    assert_eq!(config.sync.family_concurrency, 2);
    assert_eq!(config.sync.file_concurrency, 4);
    assert_eq!(config.sync.max_pages, 50);
    assert_eq!(config.log.level, "debug");
}

/// Missing sections fall back to compiled defaults.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should deserialize");
    let defaults = FamsyncConfig::default();

    assert!(config.account.login.is_none());
    assert!(config.account.password.is_none());
    assert_eq!(config.remote.base_url, "https://www.famileo.com");
    assert_eq!(config.remote.timeout_secs, 30);
    assert!(config.remote.user_agent.starts_with("famsync/"));
    assert_eq!(config.storage.database_path, defaults.storage.database_path);
    assert!(config.storage.wal_mode);
    assert_eq!(config.storage.reference_page_size, 100);
    assert_eq!(config.sync.family_concurrency, 1);
    assert_eq!(config.sync.file_concurrency, 8);
    assert_eq!(config.sync.max_pages, 1000);
    assert_eq!(config.log.level, "info");
}

/// Environment variables override file values, including keys with underscores.
#[test]
fn env_vars_override_file_values() {
    figment::Jail::expect_with(|jail| {
        jail.create_file(
            "famsync.toml",
            r#"
[storage]
database_path = "/from/file.db"

[account]
login = "file@example.com"
"#,
        )?;
        jail.set_env("FAMSYNC_STORAGE_DATABASE_PATH", "/from/env.db");
        jail.set_env("FAMSYNC_ACCOUNT_PASSWORD", "env-secret");
        jail.set_env("FAMSYNC_SYNC_FAMILY_CONCURRENCY", "3");

        let config = load_config_from_path(Path::new("famsync.toml"))?;
        assert_eq!(config.storage.database_path, "/from/env.db");
        assert_eq!(config.account.login.as_deref(), Some("file@example.com"));
        assert_eq!(config.account.password.as_deref(), Some("env-secret"));
        assert_eq!(config.sync.family_concurrency, 3);
        Ok(())
    });
}

/// Missing config files are silently skipped.
#[test]
fn missing_config_file_is_silently_skipped() {
    let config = load_config_from_path(Path::new("/nonexistent/path/famsync.toml"))
        .expect("missing file should be silently skipped");
    assert_eq!(config.remote.base_url, "https://www.famileo.com");
}

/// Unknown top-level sections are rejected.
#[test]
fn deny_unknown_fields_at_top_level() {
    let toml = r#"
[telemetry]
enabled = true
"#;
    let err = load_config_from_str(toml).expect_err("should reject unknown section");
    assert!(err.to_string().contains("telemetry"), "got: {err}");
}

/// A typo inside a section produces an UnknownKey diagnostic with a suggestion.
#[test]
fn diagnostic_suggests_correct_key() {
    let toml = r#"
[remote]
base_ulr = "https://example.com"
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let found = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "base_ulr"
                && suggestion.as_deref() == Some("base_url")
                && valid_keys.contains("timeout_secs")
        })
    });
    assert!(found, "expected UnknownKey for base_ulr, got: {errors:?}");
}

/// A string where a number is expected produces an InvalidType diagnostic.
#[test]
fn diagnostic_invalid_type() {
    let toml = r#"
[sync]
max_pages = "lots"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject invalid type");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("max_pages"))),
        "got: {errors:?}"
    );
}

/// Validation errors surface through load_and_validate_str.
#[test]
fn validation_catches_zero_page_size() {
    let toml = r#"
[storage]
reference_page_size = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("zero page size should fail");
    assert!(errors.iter().any(|e| {
        matches!(e, ConfigError::Validation { message } if message.contains("reference_page_size"))
    }));
}

/// ConfigError renders through miette's graphical handler.
#[test]
fn config_error_renders_with_miette() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let error = ConfigError::UnknownKey {
        key: "logn".to_string(),
        suggestion: Some("login".to_string()),
        valid_keys: "login, password".to_string(),
        span: None,
        src: None,
    };
    assert!(error.code().is_some());
    let help = error.help().expect("should have help").to_string();
    assert!(help.contains("did you mean `login`"), "got: {help}");

    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, &error)
        .expect("should render without error");
    assert!(buf.contains("logn"));
}

/// Credentials are only required when asked for, and both halves are reported.
#[test]
fn credentials_require_login_and_password() {
    let config = load_and_validate_str("").expect("defaults should validate");
    let errors = credentials(&config).expect_err("no credentials configured");
    let keys: Vec<String> = errors
        .iter()
        .filter_map(|e| match e {
            ConfigError::MissingKey { key } => Some(key.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(keys, vec!["account.login", "account.password"]);

    let config = load_and_validate_str(
        r#"
[account]
login = " jane@example.com "
password = "hunter2"
"#,
    )
    .expect("valid config");
    let creds = credentials(&config).expect("credentials present");
    assert_eq!(creds.login, "jane@example.com");
    assert_eq!(creds.password(), "hunter2");
}
