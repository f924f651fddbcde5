// SPDX-FileCopyrightText: 2026 Famsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./famsync.toml` > `~/.config/famsync/famsync.toml` > `/etc/famsync/famsync.toml`
//! with environment variable overrides via `FAMSYNC_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::FamsyncConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/famsync/famsync.toml";

/// Configuration file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "famsync.toml";

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/famsync/famsync.toml` (system-wide)
/// 3. `~/.config/famsync/famsync.toml` (user XDG config)
/// 4. `./famsync.toml` (local directory)
/// 5. `FAMSYNC_*` environment variables
pub fn load_config() -> Result<FamsyncConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<FamsyncConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FamsyncConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<FamsyncConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FamsyncConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Path of the per-user configuration file, if a config dir exists.
pub fn user_config_path() -> Option<std::path::PathBuf> {
    dirs::config_dir().map(|d| d.join("famsync").join(LOCAL_CONFIG_FILE))
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(FamsyncConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `FAMSYNC_STORAGE_DATABASE_PATH` must map to
/// `storage.database_path`, not `storage.database.path`.
fn env_provider() -> Env {
    Env::prefixed("FAMSYNC_").map(|key| env_key_to_path(key.as_str()).into())
}

const SECTIONS: &[&str] = &["account", "remote", "storage", "sync", "log"];

/// Maps a lowercased, prefix-stripped env key (`storage_wal_mode`) to a dotted path.
fn env_key_to_path(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_first_section_only() {
        assert_eq!(env_key_to_path("account_login"), "account.login");
        assert_eq!(
            env_key_to_path("storage_reference_page_size"),
            "storage.reference_page_size"
        );
        assert_eq!(env_key_to_path("sync_max_pages"), "sync.max_pages");
        assert_eq!(env_key_to_path("log_level"), "log.level");
        assert_eq!(env_key_to_path("unrelated"), "unrelated");
    }
}
