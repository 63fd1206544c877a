use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use rangepool_core::config::{Config, ConfigError};
use rangepool_core::logging::{init_logging_with_config, LogLevel};
use rangepool_core::EntryStatus;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "rangepool")]
#[command(author, version, about = "Classify IPv4 addresses against whitelist/blocklist pools", long_about = None)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, default_value = "rangepool.toml")]
    config: String,

    /// Override the configured log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable JSON formatted logging
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

/// Select entries by id or by pool
#[derive(ClapArgs, Debug)]
#[group(required = true, multiple = false)]
struct Target {
    /// Entry id
    #[arg(long)]
    id: Option<i64>,

    /// Pool name
    #[arg(long)]
    pool: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the list, backup and output directories and open the database
    Init {
        /// Delete the database file first and start from an empty schema
        #[arg(long)]
        force: bool,
    },

    /// Show the most specific entry containing an address
    Check {
        ip: Ipv4Addr,
        /// Print the entry as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a range to a pool
    Insert {
        cidr: String,
        #[arg(long)]
        pool: String,
        #[arg(long, default_value = "")]
        comment: String,
        /// whitelisted or blocked
        #[arg(long, default_value = "blocked")]
        status: EntryStatus,
    },

    /// List the entries of a pool
    List {
        pool: String,
        #[arg(long)]
        json: bool,
    },

    /// List pool names with their counts
    Pools {
        /// Print the pools as JSON
        #[arg(long)]
        json: bool,
    },

    /// Mark entries whitelisted
    Whitelist(Target),

    /// Mark entries blocked
    Block(Target),

    /// Replace the comment of an entry
    Comment { id: i64, text: String },

    /// Delete entries
    Delete(Target),

    /// Import every .conf file of a directory
    Import {
        dir: String,
        #[arg(long)]
        status: EntryStatus,
    },

    /// Write pools as list files
    Export {
        /// Only this pool
        #[arg(long)]
        pool: Option<String>,
        /// Output root, defaults to the configured output path
        #[arg(long)]
        out: Option<String>,
    },

    /// Back up the live lists and overwrite them from the store
    Publish,

    /// Back up, then rebuild the store from the live lists
    Reset,

    /// Load ip,hostname dumps into the lookup table
    LoadLuts {
        /// Folder of .txt dumps, defaults to the configured lookup path
        dir: Option<String>,
    },

    /// Show the hostnames recorded for an address
    Host { ip: Ipv4Addr },
}

/// Expand `~` and environment variables in a user supplied path
fn expand_path(raw: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(raw).with_context(|| format!("Cannot expand path '{}'", raw))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// File config when present, else defaults; environment overrides both
fn load_config(path: &Path) -> Result<(Config, bool)> {
    let (mut config, found) = match Config::from_file(path) {
        Ok(config) => (config, true),
        Err(ConfigError::NotFound(_)) => (Config::default(), false),
        Err(e) => return Err(e).with_context(|| format!("Loading {}", path.display())),
    };
    config.apply_env()?;
    config.validate()?;
    Ok((config, found))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = expand_path(&args.config)?;
    let (mut config, found) = load_config(&config_path)?;

    if let Some(level) = &args.log_level {
        let level: LogLevel = level.parse().map_err(anyhow::Error::msg)?;
        config.logging.level = level.to_string();
    }
    if args.json_logs {
        config.logging.json_format = true;
    }
    init_logging_with_config(config.logging.log_config()?)?;

    if !found {
        warn!(path = %config_path.display(), "Could not read config, running with defaults");
    }
    info!(db = %config.store.db_path.display(), "rangepool started");

    commands::run(args.command, &config).await
}
