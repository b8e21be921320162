//! # brandassoc
//!
//! CLI tool for recording and browsing BrandAssoc records.
//!
//! ## Commands
//!
//! - `login`: Bind an account to this profile
//! - `logout`: Forget the bound account
//! - `add`: Encrypt and store a new record
//! - `list`: Show records, optionally filtered
//! - `stats`: Show collection statistics
//! - `check`: Probe store availability
//! - `status`: Show profile and store status
//!
//! ## Example
//!
//! ```bash
//! # Bind an account
//! brandassoc login --account 0xABC
//!
//! # Record an association
//! brandassoc add --brand Acme --platform TV --score 8 --notes "prime time"
//!
//! # Browse strong associations mentioning "acme"
//! brandassoc list --search acme --tab high
//! ```

use anyhow::{Context, Result};
use brandassoc_client::Tab;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod backend;
mod commands;
mod config;

use commands::{add, check, list, login, logout, stats, status};

/// CLI tool for recording and browsing BrandAssoc records.
#[derive(Parser, Debug)]
#[command(name = "brandassoc")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Data directory for the profile and the local store
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log protocol steps (overrides RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Bind an account to this profile
    Login {
        /// Account identifier (e.g. a wallet address)
        #[arg(long, short)]
        account: String,

        /// Store file to use instead of <data-dir>/store.json
        #[arg(long)]
        store: Option<PathBuf>,
    },

    /// Forget the bound account
    Logout,

    /// Encrypt and store a new record
    Add {
        /// Brand name
        #[arg(long, short)]
        brand: String,

        /// Platform (e.g. "Social Media", "TV", "Print", "Outdoor", "Digital")
        #[arg(long, short)]
        platform: String,

        /// Association score (1-10)
        #[arg(long, short, default_value = "5", allow_hyphen_values = true)]
        score: i32,

        /// Free-text notes, stored encrypted
        #[arg(long, short, default_value = "")]
        notes: String,
    },

    /// Show records, newest first
    List {
        /// Case-insensitive substring of brand or platform
        #[arg(long, short, default_value = "")]
        search: String,

        /// Score band: all, high, medium or low
        #[arg(long, short, default_value = "all")]
        tab: Tab,
    },

    /// Show collection statistics
    Stats,

    /// Probe store availability
    Check,

    /// Show profile and store status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Determine data directory
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };

    // Ensure data directory exists
    tokio::fs::create_dir_all(&data_dir)
        .await
        .context("Failed to create data directory")?;
    config::set_dir_permissions_0700(&data_dir).await?;

    match cli.command {
        Commands::Login { account, store } => {
            login::run(&data_dir, &account, store).await?;
        }
        Commands::Logout => {
            logout::run(&data_dir).await?;
        }
        Commands::Add {
            brand,
            platform,
            score,
            notes,
        } => {
            add::run(&data_dir, &brand, &platform, score, &notes).await?;
        }
        Commands::List { search, tab } => {
            list::run(&data_dir, &search, tab).await?;
        }
        Commands::Stats => {
            stats::run(&data_dir).await?;
        }
        Commands::Check => {
            check::run(&data_dir).await?;
        }
        Commands::Status => {
            status::run(&data_dir).await?;
        }
    }

    Ok(())
}

/// Install the log subscriber. Logs go to stderr so output stays pipeable.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Get the default data directory for brandassoc.
fn default_data_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("io", "brandassoc", "brandassoc")
        .context("Could not determine home directory")?;
    Ok(dirs.data_dir().to_path_buf())
}
