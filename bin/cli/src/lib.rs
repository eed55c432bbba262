//! Command-line previewer for cadence trigger definitions.
//!
//! Loads a [`TriggerConfig`](cadence_trigger::TriggerConfig) from a config
//! file and prints its upcoming fire times or its serialized state.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use error::CliError;
