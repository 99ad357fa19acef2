// SPDX-FileCopyrightText: 2026 Fleetbook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fleetbook - resilient car rental booking pipeline.
//!
//! This is the binary entry point for the Fleetbook CLI.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod book;
mod drain;
mod status;

/// Fleetbook - resilient car rental booking pipeline.
#[derive(Parser, Debug)]
#[command(name = "fleetbook", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Show network, outbox, and intent status.
    Status {
        /// Output structured JSON for scripting.
        #[arg(long)]
        json: bool,
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
    /// Replay queued outbox items against the backend.
    Drain {
        /// Output structured JSON for scripting.
        #[arg(long)]
        json: bool,
    },
    /// Book a car for a date range.
    Book {
        /// Id of the car to book.
        car_id: String,
        /// Rental start date (YYYY-MM-DD).
        #[arg(long)]
        from: String,
        /// Rental end date (YYYY-MM-DD).
        #[arg(long)]
        to: String,
        /// Extra to include (repeatable).
        #[arg(long = "extra")]
        extras: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match fleetbook_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            fleetbook_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.client.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Some(Commands::Status { json, plain }) => status::run_status(&config, json, plain).await,
        Some(Commands::Drain { json }) => drain::run_drain(&config, json).await,
        Some(Commands::Book {
            car_id,
            from,
            to,
            extras,
        }) => book::run_book(&config, &car_id, &from, &to, extras).await,
        None => {
            println!("fleetbook: use --help for available commands");
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("fleetbook: {err}");
        std::process::exit(1);
    }
}
