//! Error types for the CLI.

use std::fmt;

/// Errors surfaced by CLI commands.
///
/// Lower-level trigger errors are attached as the cause of these variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    /// Configuration could not be loaded.
    Config { details: String },
    /// The configured trigger definition is invalid.
    InvalidTrigger,
    /// Computing fire times failed.
    Evaluation,
    /// Writing output failed.
    Output { details: String },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { details } => write!(f, "failed to load configuration: {details}"),
            Self::InvalidTrigger => write!(f, "invalid trigger definition"),
            Self::Evaluation => write!(f, "failed to compute fire times"),
            Self::Output { details } => write!(f, "failed to write output: {details}"),
        }
    }
}

impl std::error::Error for CliError {}
