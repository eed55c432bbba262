//! `cadence` - preview composite trigger schedules.
//!
//! # Usage
//!
//! ```bash
//! # Next five fire times of a definition file
//! cadence preview --config schedule.toml -n 5
//!
//! # Serialized state, reproducible jitter
//! CADENCE__JITTER_SEED=7 cadence state --config schedule.toml
//! ```

use cadence_cli::cli::{Cli, Command};
use cadence_cli::commands;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut stdout = std::io::stdout().lock();
    let result = match &cli.command {
        Command::Preview(args) => commands::preview(args, &mut stdout),
        Command::State(args) => commands::state(args, &mut stdout),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "command failed");
        std::process::exit(1);
    }
}
