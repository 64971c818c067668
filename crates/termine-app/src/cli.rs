//! Command-line interface.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::Parser;

/// Renders a calendar feed as a schedule table and publishes it to a wiki.
#[derive(Debug, Parser)]
#[command(name = "termine", version)]
pub struct Cli {
    /// Configuration file (defaults to `config.toml` when present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the page instead of publishing it
    #[arg(long)]
    pub dry_run: bool,

    /// Reference time in the display zone, e.g. `2026-01-14T12:00` or `2026-01-14`
    #[arg(long, value_name = "DATETIME", value_parser = parse_reference)]
    pub now: Option<NaiveDateTime>,
}

/// ## Summary
/// Parses a reference time given as date-time or date.
///
/// ## Errors
/// Returns a message if the value matches none of the accepted formats.
pub fn parse_reference(value: &str) -> Result<NaiveDateTime, String> {
    let value = value.trim();
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
        .ok_or_else(|| format!("expected YYYY-MM-DD[THH:MM[:SS]], got {value:?}"))
}
