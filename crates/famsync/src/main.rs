// SPDX-FileCopyrightText: 2026 Famsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! famsync - incremental Famileo family-content synchronizer.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod doctor;
mod sync;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use famsync_config::{ConfigError, FamsyncConfig};

/// famsync - copy Famileo gazettes, contacts and photos into a local store.
#[derive(Parser, Debug)]
#[command(name = "famsync", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one synchronization.
    Sync {
        /// Print the run report as JSON on stdout.
        #[arg(long)]
        json: bool,
    },
    /// Check configuration, storage and remote reachability.
    Doctor {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
    /// Print the effective configuration (secrets redacted).
    Config,
}

fn load_config(path: Option<&std::path::Path>) -> Result<FamsyncConfig, Vec<ConfigError>> {
    match path {
        Some(path) => famsync_config::load_and_validate_path(path),
        None => famsync_config::load_and_validate(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            famsync_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let code = match cli.command {
        Some(Commands::Sync { json }) => {
            let credentials = match famsync_config::credentials(&config) {
                Ok(credentials) => credentials,
                Err(errors) => {
                    famsync_config::render_errors(&errors);
                    std::process::exit(1);
                }
            };
            init_tracing(&config.log.level);
            match sync::run_sync(&config, &credentials, json).await {
                Ok(report) if report.has_failures() => 2,
                Ok(_) => 0,
                Err(e) => {
                    eprintln!("famsync: {e}");
                    1
                }
            }
        }
        Some(Commands::Doctor { plain }) => {
            init_tracing(&config.log.level);
            match doctor::run_doctor(&config, plain).await {
                Ok(true) => 0,
                Ok(false) => 1,
                Err(e) => {
                    eprintln!("famsync: {e}");
                    1
                }
            }
        }
        Some(Commands::Config) => match config.to_toml() {
            Ok(rendered) => {
                print!("{rendered}");
                0
            }
            Err(e) => {
                eprintln!("famsync: failed to render config: {e}");
                1
            }
        },
        None => {
            println!("famsync: use --help for available commands");
            0
        }
    };
    std::process::exit(code);
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("famsync={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
