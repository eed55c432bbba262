//! CLI argument parsing.

use cadence_core::Timestamp;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Preview composite trigger schedules.
#[derive(Parser)]
#[command(name = "cadence")]
#[command(version)]
#[command(about = "Preview fire times of AND/OR trigger definitions")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Command {
    /// Print the next fire times of the configured trigger.
    Preview(PreviewArgs),
    /// Print the serialized state of the configured trigger as JSON.
    State(StateArgs),
}

/// Where the trigger definition comes from.
#[derive(Args, Clone)]
pub struct ConfigArgs {
    /// Configuration file (TOML, JSON or YAML).
    ///
    /// Values from `CADENCE__*` environment variables override the file.
    #[arg(short, long, env = "CADENCE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Arguments for `preview`.
#[derive(Args, Clone)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub source: ConfigArgs,

    /// Number of fire times to print.
    #[arg(short = 'n', long, default_value_t = 10)]
    pub count: usize,

    /// Instant to start from (RFC 3339). Defaults to the current time.
    #[arg(long)]
    pub from: Option<Timestamp>,
}

/// Arguments for `state`.
#[derive(Args, Clone)]
pub struct StateArgs {
    #[command(flatten)]
    pub source: ConfigArgs,

    /// Instant interval triggers are anchored at (RFC 3339). Defaults to now.
    #[arg(long)]
    pub from: Option<Timestamp>,
}
