// SPDX-FileCopyrightText: 2026 Famsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks constraints serde cannot express: URL shape, non-empty paths,
//! positive limits, and known log levels.

use crate::diagnostic::ConfigError;
use crate::model::FamsyncConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &FamsyncConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut invalid = |message: String| errors.push(ConfigError::Validation { message });

    let base_url = config.remote.base_url.trim();
    if base_url.is_empty() {
        invalid("remote.base_url must not be empty".to_string());
    } else if !(base_url.starts_with("https://") || base_url.starts_with("http://"))
        || base_url.contains(char::is_whitespace)
    {
        invalid(format!(
            "remote.base_url `{base_url}` must be an http(s) URL"
        ));
    }

    if config.remote.timeout_secs == 0 {
        invalid("remote.timeout_secs must be at least 1".to_string());
    }

    if config.storage.database_path.trim().is_empty() {
        invalid("storage.database_path must not be empty".to_string());
    }

    for (key, value) in [
        ("storage.reference_page_size", config.storage.reference_page_size),
        ("sync.family_concurrency", config.sync.family_concurrency),
        ("sync.file_concurrency", config.sync.file_concurrency),
        ("sync.max_pages", config.sync.max_pages),
    ] {
        if value == 0 {
            invalid(format!("{key} must be at least 1, got 0"));
        }
    }

    let level = config.log.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        invalid(format!(
            "log.level `{}` is not one of {}",
            config.log.level,
            LOG_LEVELS.join(", ")
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(config: &FamsyncConfig) -> Vec<String> {
        validate_config(config)
            .unwrap_err()
            .into_iter()
            .map(|e| e.to_string())
            .collect()
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&FamsyncConfig::default()).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = FamsyncConfig::default();
        config.storage.database_path = "  ".to_string();
        let errors = messages(&config);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("storage.database_path"));
    }

    #[test]
    fn non_http_base_url_fails_validation() {
        let mut config = FamsyncConfig::default();
        config.remote.base_url = "ftp://famileo.example".to_string();
        assert!(messages(&config)[0].contains("remote.base_url"));
    }

    #[test]
    fn zero_limits_are_all_reported() {
        let mut config = FamsyncConfig::default();
        config.storage.reference_page_size = 0;
        config.sync.family_concurrency = 0;
        config.sync.max_pages = 0;
        let errors = messages(&config);
        assert_eq!(errors.len(), 3, "got: {errors:?}");
    }

    #[test]
    fn unknown_log_level_fails_validation() {
        let mut config = FamsyncConfig::default();
        config.log.level = "verbose".to_string();
        assert!(messages(&config)[0].contains("log.level"));

        config.log.level = "DEBUG".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
