//! Command implementations.

use crate::cli::{ConfigArgs, PreviewArgs, StateArgs};
use crate::config::CliConfig;
use crate::error::CliError;
use cadence_core::{Result, Timestamp};
use cadence_trigger::{Trigger, TriggerError};
use chrono::Utc;
use rootcause::prelude::ResultExt;
use std::io::Write;
use tracing::{debug, info};

/// Computes up to `count` consecutive fire times starting at `from`.
///
/// Each fire time becomes both the previous fire time and the current instant
/// for the next query. Stops early once the trigger is finished.
///
/// # Errors
///
/// Propagates trigger evaluation errors.
pub fn upcoming(
    trigger: &Trigger,
    from: Timestamp,
    count: usize,
) -> Result<Vec<Timestamp>, TriggerError> {
    let mut fire_times = Vec::new();
    let mut previous = None;
    let mut now = from;
    while fire_times.len() < count {
        let Some(next) = trigger.next_fire_time(previous, now)? else {
            debug!(fired = fire_times.len(), "trigger finished");
            break;
        };
        fire_times.push(next);
        previous = Some(next);
        now = next;
    }
    Ok(fire_times)
}

fn load_trigger(source: &ConfigArgs, from: Timestamp) -> Result<Trigger, CliError> {
    let config = CliConfig::load(source.config.as_deref()).map_err(|e| CliError::Config {
        details: e.to_string(),
    })?;
    info!(kind = %config.trigger.kind(), "loaded trigger definition");
    config
        .trigger
        .build(from, &config.jitter_source())
        .context(CliError::InvalidTrigger)
}

/// Prints the trigger and its next fire times.
///
/// # Errors
///
/// Returns an error if configuration, evaluation or output fails.
pub fn preview(args: &PreviewArgs, out: &mut impl Write) -> Result<(), CliError> {
    let from = args.from.unwrap_or_else(Utc::now);
    let trigger = load_trigger(&args.source, from)?;
    let fire_times = upcoming(&trigger, from, args.count).context(CliError::Evaluation)?;

    let write = |out: &mut dyn Write| -> std::io::Result<()> {
        writeln!(out, "{trigger}")?;
        if fire_times.is_empty() {
            writeln!(out, "  (no further fire times)")?;
        }
        for fire_time in &fire_times {
            writeln!(out, "  {}", fire_time.to_rfc3339())?;
        }
        Ok(())
    };
    write(out).map_err(|e| CliError::Output {
        details: e.to_string(),
    })?;
    Ok(())
}

/// Prints the trigger's serialized state as pretty JSON.
///
/// # Errors
///
/// Returns an error if configuration, serialization or output fails.
pub fn state(args: &StateArgs, out: &mut impl Write) -> Result<(), CliError> {
    let from = args.from.unwrap_or_else(Utc::now);
    let trigger = load_trigger(&args.source, from)?;
    let state = trigger.to_state().context(CliError::InvalidTrigger)?;
    let document = serde_json::json!({
        "type_reference": trigger.type_reference(),
        "state": state,
    });
    let rendered = serde_json::to_string_pretty(&document).map_err(|e| CliError::Output {
        details: e.to_string(),
    })?;
    writeln!(out, "{rendered}").map_err(|e| CliError::Output {
        details: e.to_string(),
    })?;
    Ok(())
}
