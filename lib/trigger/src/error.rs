//! Error types for the trigger crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `TriggerError`: evaluation, construction and (de)serialization failures
//!   of a single trigger, including combinators.
//!
//! Callers add their own context (job, schedule name) when wrapping.

use crate::Timestamp;
use std::fmt;

/// Errors from trigger operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerError {
    /// State was written by a newer serialization format.
    UnsupportedVersion { found: u32, supported: u32 },
    /// A stored type reference is unknown to the registry.
    TypeResolution { reference: String },
    /// A stored inner state could not be decoded.
    InvalidState { reason: String },
    /// Invalid trigger configuration.
    InvalidConfig { reason: String },
    /// Invalid cron expression.
    InvalidCronExpression { expression: String, reason: String },
    /// The AND rendezvous search gave up without all members agreeing.
    RendezvousNotFound { iterations: usize, candidate: Timestamp },
    /// A fire time could not be computed.
    EvaluationFailed { reason: String },
}

impl fmt::Display for TriggerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVersion { found, supported } => write!(
                f,
                "got serialized data for version {found}, but only versions up to {supported} can be handled"
            ),
            Self::TypeResolution { reference } => {
                write!(f, "cannot resolve trigger type reference '{reference}'")
            }
            Self::InvalidState { reason } => write!(f, "invalid trigger state: {reason}"),
            Self::InvalidConfig { reason } => write!(f, "invalid trigger config: {reason}"),
            Self::InvalidCronExpression { expression, reason } => {
                write!(f, "invalid cron expression '{expression}': {reason}")
            }
            Self::RendezvousNotFound {
                iterations,
                candidate,
            } => write!(
                f,
                "triggers did not agree on a fire time after {iterations} iterations (last candidate {candidate})"
            ),
            Self::EvaluationFailed { reason } => {
                write!(f, "trigger evaluation failed: {reason}")
            }
        }
    }
}

impl std::error::Error for TriggerError {}
