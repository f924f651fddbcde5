// SPDX-FileCopyrightText: 2026 Famsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `famsync doctor` command implementation.
//!
//! Runs diagnostic checks against the configured environment: credentials,
//! the SQLite store, and reachability of the remote.

use std::io::IsTerminal;
use std::time::{Duration, Instant};

use famsync_config::FamsyncConfig;
use famsync_core::{FamsyncError, HealthStatus, PluginAdapter};
use famsync_famileo::FamileoRemote;
use famsync_storage::SqliteStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run every check and print a table. Returns false if any check failed.
pub async fn run_doctor(config: &FamsyncConfig, plain: bool) -> Result<bool, FamsyncError> {
    let use_color = !plain && std::io::stdout().is_terminal();

    let results = vec![
        check_credentials(config),
        check_storage(config).await,
        check_remote(config).await,
    ];

    println!();
    println!("  famsync doctor");
    println!("  {}", "-".repeat(50));
    for result in &results {
        println!("{}", render(result, use_color));
    }
    println!();

    let issues = results
        .iter()
        .filter(|r| r.status != CheckStatus::Pass)
        .count();
    if issues == 0 {
        println!("  All checks passed.");
    } else {
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
    }
    println!();

    Ok(results.iter().all(|r| r.status != CheckStatus::Fail))
}

fn render(result: &CheckResult, use_color: bool) -> String {
    let duration_ms = result.duration.as_millis();
    if use_color {
        use colored::Colorize;
        let (symbol, message) = match result.status {
            CheckStatus::Pass => ("✓".green().to_string(), result.message.normal()),
            CheckStatus::Warn => ("!".yellow().to_string(), result.message.yellow()),
            CheckStatus::Fail => ("✗".red().to_string(), result.message.red()),
        };
        format!(
            "    {symbol} {:<20} {message} ({duration_ms}ms)",
            result.name
        )
    } else {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        format!(
            "    {tag} {:<20} {} ({duration_ms}ms)",
            result.name, result.message
        )
    }
}

/// Credentials are only needed by `sync`, so their absence is a warning.
fn check_credentials(config: &FamsyncConfig) -> CheckResult {
    let start = Instant::now();
    match famsync_config::credentials(config) {
        Ok(credentials) => CheckResult::new(
            "Credentials",
            CheckStatus::Pass,
            format!("login {}", credentials.login),
            start,
        ),
        Err(errors) => CheckResult::new(
            "Credentials",
            CheckStatus::Warn,
            format!("{} missing key(s); `sync` will refuse to run", errors.len()),
            start,
        ),
    }
}

async fn check_storage(config: &FamsyncConfig) -> CheckResult {
    let start = Instant::now();
    let store = match SqliteStore::open(config.storage.clone()).await {
        Ok(store) => store,
        Err(e) => {
            return CheckResult::new("Storage", CheckStatus::Fail, format!("open failed: {e}"), start);
        }
    };
    let result = match store.health_check().await {
        Ok(HealthStatus::Healthy) => CheckResult::new(
            "Storage",
            CheckStatus::Pass,
            config.storage.database_path.clone(),
            start,
        ),
        Ok(HealthStatus::Degraded(reason)) => {
            CheckResult::new("Storage", CheckStatus::Warn, reason, start)
        }
        Ok(HealthStatus::Unhealthy(reason)) => {
            CheckResult::new("Storage", CheckStatus::Fail, reason, start)
        }
        Err(e) => CheckResult::new("Storage", CheckStatus::Fail, e.to_string(), start),
    };
    let _ = store.shutdown().await;
    result
}

async fn check_remote(config: &FamsyncConfig) -> CheckResult {
    let start = Instant::now();
    let remote = match FamileoRemote::new(&config.remote) {
        Ok(remote) => remote,
        Err(e) => return CheckResult::new("Remote", CheckStatus::Fail, e.to_string(), start),
    };
    match remote.health_check().await {
        Ok(HealthStatus::Healthy) => CheckResult::new(
            "Remote",
            CheckStatus::Pass,
            format!("{} reachable", config.remote.base_url),
            start,
        ),
        Ok(HealthStatus::Degraded(reason)) => {
            CheckResult::new("Remote", CheckStatus::Warn, reason, start)
        }
        Ok(HealthStatus::Unhealthy(reason)) => {
            CheckResult::new("Remote", CheckStatus::Fail, reason, start)
        }
        Err(e) => CheckResult::new("Remote", CheckStatus::Fail, e.to_string(), start),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_rendering_tags_each_status() {
        let start = Instant::now();
        let pass = CheckResult::new("Storage", CheckStatus::Pass, "ok", start);
        let fail = CheckResult::new("Remote", CheckStatus::Fail, "down", start);
        assert!(render(&pass, false).contains("[OK]"));
        assert!(render(&fail, false).contains("[FAIL] Remote"));
        assert!(render(&fail, false).contains("down"));
    }

    #[test]
    fn missing_credentials_only_warn() {
        let result = check_credentials(&FamsyncConfig::default());
        assert_eq!(result.status, CheckStatus::Warn);
    }

    #[tokio::test]
    async fn storage_check_opens_a_fresh_database() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = FamsyncConfig::default();
        config.storage.database_path = dir
            .path()
            .join("famsync.db")
            .to_string_lossy()
            .into_owned();
        let result = check_storage(&config).await;
        assert_eq!(result.status, CheckStatus::Pass, "{}", result.message);
    }
}
