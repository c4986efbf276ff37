// SPDX-FileCopyrightText: 2026 Careready Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Careready - event-driven readiness coordination for home-care visits.
//!
//! This is the binary entry point for the coordinator.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod ingest;
mod serve;
mod shutdown;
mod workers;

/// Careready - event-driven readiness coordination for home-care visits.
#[derive(Parser, Debug)]
#[command(name = "careready", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the coordinator: all queue consumers and workers.
    Serve,
    /// Print the resolved configuration.
    Config,
    /// Ingest an appointment payload from a JSON file.
    Ingest {
        /// Path to the ingestion payload.
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match careready_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            careready_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Config) => {
            match toml::to_string_pretty(&config) {
                Ok(rendered) => {
                    println!("{rendered}");
                    Ok(())
                }
                Err(e) => Err(careready_core::CarereadyError::Internal(format!(
                    "cannot render config: {e}"
                ))),
            }
        }
        Some(Commands::Ingest { file }) => {
            serve::init_tracing(&config.agent.log_level);
            ingest::run_ingest(config, &file).await
        }
        None => {
            println!("careready: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("careready: {e}");
        std::process::exit(1);
    }
}
