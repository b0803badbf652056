// SPDX-FileCopyrightText: 2026 Ringback Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ringback - missed-call auto-responder service.
//!
//! This is the binary entry point for the ringback daemon and its
//! operational subcommands.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod cleanup;
mod serve;
mod simulate;
mod status;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Ringback - missed-call auto-responder service.
#[derive(Parser, Debug)]
#[command(name = "ringback", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the responder daemon: recovery sweep, then periodic dispatch.
    Serve,
    /// Show record counts by status and the most recent missed calls.
    Status {
        /// Emit machine-readable JSON instead of text.
        #[arg(long)]
        json: bool,
        /// How many recent records to list.
        #[arg(long, default_value_t = 10)]
        recent: u32,
    },
    /// Feed a synthetic unanswered call through the intake path.
    Simulate {
        /// Caller phone number for the synthetic call.
        phone: String,
    },
    /// Delete resolved records older than the retention window.
    Cleanup {
        /// Retention window in days.
        #[arg(long, default_value_t = 30)]
        days: u32,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match ringback_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            ringback_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    // RUST_LOG wins over the configured level when set.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.service.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match cli.command {
        Some(Commands::Serve) => serve::run(config).await,
        Some(Commands::Status { json, recent }) => status::run(&config, json, recent).await,
        Some(Commands::Simulate { phone }) => simulate::run(&config, &phone).await,
        Some(Commands::Cleanup { days }) => cleanup::run(&config, days).await,
        None => {
            println!("ringback: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "command failed");
        std::process::exit(1);
    }
}
