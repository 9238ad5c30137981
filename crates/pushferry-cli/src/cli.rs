//! Command-line surface of the pushferry binary.

use chrono::{DateTime, Duration, Utc};
use clap::{Args, Parser, Subcommand};

/// How far back the default watermark reaches when no `--since` is given.
const DEFAULT_LOOKBACK_MINUTES: i64 = 30;

/// Top-level CLI struct for the binary.
#[derive(Debug, Parser)]
#[command(name = "pushferry", version, about, long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Pulls in new messages and submits any torrent references they carry.
    Pull(PullArgs),
}

#[derive(Debug, Args)]
pub(crate) struct PullArgs {
    /// Only consider messages modified at or after this RFC 3339 timestamp.
    /// Defaults to 30 minutes before now.
    #[arg(short, long, value_parser = parse_since)]
    pub since: Option<DateTime<Utc>>,
}

impl PullArgs {
    pub(crate) fn since_or_default(&self) -> DateTime<Utc> {
        self.since
            .unwrap_or_else(|| Utc::now() - Duration::minutes(DEFAULT_LOOKBACK_MINUTES))
    }
}

fn parse_since(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("invalid RFC 3339 timestamp: {e}"))
}
