// SPDX-FileCopyrightText: 2026 Makula Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Makula - waste-paper collection tracking service.
//!
//! This is the binary entry point: config loading, logging setup, and the
//! `serve` command wiring the storage, auth, intake, bot, and gateway
//! components together.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Makula - waste-paper collection tracking service.
#[derive(Parser, Debug)]
#[command(name = "makula", version, about, long_about = None)]
struct Cli {
    /// Path to a config file (overrides the XDG hierarchy).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the gateway and (when configured) the Telegram bot.
    Serve,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => makula_config::load_config_from_path(path),
        None => makula_config::load_config(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("makula: invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.service.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run(config).await {
                tracing::error!(error = %e, "serve failed");
                std::process::exit(1);
            }
        }
        None => {
            println!("makula: use --help for available commands");
        }
    }
}
