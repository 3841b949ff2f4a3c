// SPDX-FileCopyrightText: 2026 Bookmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bookmill - tracks textbooks through a simulated question-generation
//! pipeline.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod commands;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Bookmill - textbook processing tracker.
///
/// Processing is simulated: each progress check advances a book by a few
/// pages and records placeholder questions.
#[derive(Parser, Debug)]
#[command(name = "bookmill", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP API server.
    Serve,
    /// Track every PDF in the library directory that is not tracked yet.
    Scan,
    /// List tracked books, newest first.
    List,
    /// Print one book as JSON.
    Show { id: String },
    /// Start or resume processing (extracts metadata on first start).
    Start { id: String },
    /// Pause processing.
    Pause { id: String },
    /// Cancel processing.
    Cancel { id: String },
    /// Advance simulated progress by one step and print it.
    Progress { id: String },
    /// Write the book's questions to a CSV file in the export directory.
    Export { id: String },
    /// Print book and question totals.
    Stats,
    /// Print the effective configuration as TOML.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => bookmill_config::load_and_validate_path(path),
        None => bookmill_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            bookmill_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Config) => commands::print_config(&config),
        Some(command) => commands::run(config, command).await,
        None => {
            println!("bookmill: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        if e.is_retryable() {
            eprintln!("hint: the book changed while the command ran, run it again");
        }
        std::process::exit(1);
    }
}
