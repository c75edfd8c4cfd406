//! StageKV CLI
//!
//! Command-line tools for inspecting and editing a StageKV store.
//!
//! # Commands
//!
//! - `get` - Print the value of a key as JSON
//! - `set` - Commit a JSON value under a key
//! - `drop` - Delete a key
//! - `list` - List published entries
//! - `random-key` - Allocate an unused key under a prefix
//! - `staging` - List or purge leftover staging directories

mod commands;
mod error;

use clap::{Parser, Subcommand};
use error::CliError;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// StageKV command-line store tools.
#[derive(Parser)]
#[command(name = "stagekv")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the store root directory
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the value of a key as JSON
    Get {
        /// The key to read
        key: String,

        /// Pretty-print the value
        #[arg(long)]
        pretty: bool,
    },

    /// Commit a JSON value under a key
    Set {
        /// The key to write
        key: String,

        /// The value, as JSON text
        value: String,
    },

    /// Delete a key
    Drop {
        /// The key to delete
        key: String,
    },

    /// List published entries
    List {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Allocate an unused key under a prefix
    RandomKey {
        /// Prefix of the new key
        #[arg(default_value = "")]
        prefix: String,

        /// Store this JSON value under the new key
        #[arg(long)]
        value: Option<String>,
    },

    /// List leftover staging directories
    Staging {
        /// Remove them (only while nothing is committing)
        #[arg(long)]
        purge: bool,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let path = |command: &'static str| cli.path.clone().ok_or(CliError::MissingPath { command });

    match &cli.command {
        Commands::Get { key, pretty } => {
            commands::get::run(&path("get")?, key, *pretty)?;
        }
        Commands::Set { key, value } => {
            commands::set::run(&path("set")?, key, value)?;
        }
        Commands::Drop { key } => {
            commands::drop::run(&path("drop")?, key)?;
        }
        Commands::List { format } => {
            commands::list::run(&path("list")?, format)?;
        }
        Commands::RandomKey { prefix, value } => {
            commands::random_key::run(&path("random-key")?, prefix, value.as_deref())?;
        }
        Commands::Staging { purge } => {
            commands::staging::run(&path("staging")?, *purge)?;
        }
        Commands::Version => {
            println!("StageKV CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("StageKV Core v{}", stagekv_core::VERSION);
        }
    }

    Ok(())
}
