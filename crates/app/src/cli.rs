//! Command-line arguments.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use popspot_domain::EventKind;

#[derive(Parser, Debug)]
#[command(name = "popspot")]
#[command(about = "Discover exhibitions and pop-up stores", version)]
pub struct Cli {
    /// Configuration file (TOML, JSON or YAML).
    #[arg(long, env = "POPSPOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// API root, overriding the configuration.
    #[arg(long, env = "POPSPOT_BASE_URL")]
    pub base_url: Option<String>,

    /// Session file, overriding the configuration.
    #[arg(long, env = "POPSPOT_SESSION_FILE")]
    pub session_file: Option<PathBuf>,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, env = "POPSPOT_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in with a Kakao authorization code.
    Login {
        /// Code returned by the Kakao OAuth redirect.
        #[arg(long)]
        code: String,
    },
    /// Sign out and forget the stored session.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// List exhibitions and pop-ups.
    Exhibitions(ListArgs),
    /// Show one exhibition.
    Show {
        id: i64,
    },
    /// Manage the wishlist.
    #[command(subcommand)]
    Wishlist(WishlistCommand),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// `exhibition` or `popup`.
    #[arg(long)]
    pub kind: Option<EventKind>,

    #[arg(long)]
    pub category: Option<String>,

    /// First day, `YYYY-MM-DD`.
    #[arg(long, conflicts_with = "month")]
    pub from: Option<NaiveDate>,

    /// Last day, `YYYY-MM-DD`.
    #[arg(long, conflicts_with = "month")]
    pub to: Option<NaiveDate>,

    /// Calendar month, `YYYY-MM`.
    #[arg(long, value_parser = parse_month)]
    pub month: Option<(i32, u32)>,

    /// Map viewport as `south,west,north,east`.
    #[arg(long, value_parser = parse_bounds)]
    pub bounds: Option<[f64; 4]>,

    #[arg(long)]
    pub page: Option<u32>,

    #[arg(long)]
    pub size: Option<u32>,
}

#[derive(Subcommand, Debug)]
pub enum WishlistCommand {
    /// List saved events.
    List,
    /// Save an event.
    Add { id: i64 },
    /// Remove a saved event.
    Remove { id: i64 },
}

/// Parses `YYYY-MM`.
pub fn parse_month(value: &str) -> Result<(i32, u32), String> {
    let (year, month) = value
        .split_once('-')
        .ok_or_else(|| format!("expected YYYY-MM, got '{value}'"))?;
    let year = year
        .parse::<i32>()
        .map_err(|e| format!("invalid year '{year}': {e}"))?;
    let month = month
        .parse::<u32>()
        .map_err(|e| format!("invalid month '{month}': {e}"))?;
    if !(1..=12).contains(&month) {
        return Err(format!("month must be 1-12, got {month}"));
    }
    Ok((year, month))
}

/// Parses `south,west,north,east`.
pub fn parse_bounds(value: &str) -> Result<[f64; 4], String> {
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid coordinate in '{value}': {e}"))?;
    <[f64; 4]>::try_from(parts)
        .map_err(|_| format!("expected 4 coordinates (south,west,north,east), got '{value}'"))
}
