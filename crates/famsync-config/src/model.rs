// SPDX-FileCopyrightText: 2026 Famsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for famsync.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Top-level famsync configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FamsyncConfig {
    /// Remote account credentials.
    #[serde(default)]
    pub account: AccountConfig,

    /// Remote service connection settings.
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Document store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Synchronization behavior.
    #[serde(default)]
    pub sync: SyncConfig,

    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

/// Account credentials for the remote service.
///
/// The password is never serialized back out and is redacted from `Debug`.
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AccountConfig {
    /// Login (usually an email address).
    #[serde(default)]
    pub login: Option<String>,

    /// Account password.
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
}

impl fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountConfig")
            .field("login", &self.login)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Remote service connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteConfig {
    /// Base URL of the remote service.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent on every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_base_url() -> String {
    "https://www.famileo.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("famsync/{}", env!("CARGO_PKG_VERSION"))
}

/// Document store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// Number of member ids returned per reference listing page.
    #[serde(default = "default_reference_page_size")]
    pub reference_page_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
            reference_page_size: default_reference_page_size(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("famsync").join("famsync.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("famsync.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

fn default_reference_page_size() -> usize {
    100
}

/// Synchronization behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    /// How many families are synchronized at the same time.
    #[serde(default = "default_family_concurrency")]
    pub family_concurrency: usize,

    /// How many files are ingested at the same time within one stream.
    #[serde(default = "default_file_concurrency")]
    pub file_concurrency: usize,

    /// Upper bound on pages fetched by a single pagination.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            family_concurrency: default_family_concurrency(),
            file_concurrency: default_file_concurrency(),
            max_pages: default_max_pages(),
        }
    }
}

fn default_family_concurrency() -> usize {
    1
}

fn default_file_concurrency() -> usize {
    8
}

fn default_max_pages() -> usize {
    1000
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl FamsyncConfig {
    /// Render the effective configuration as TOML. The password is never included.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
