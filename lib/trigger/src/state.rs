//! Serialized trigger state.
//!
//! Combinators persist as a versioned [`CombiningState`]; every other kind
//! persists as its own serde representation. Inner states stay opaque
//! `serde_json::Value`s so a combinator never needs to know the shape of its
//! members.

use crate::error::TriggerError;
use rootcause::prelude::Report;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Highest state version this build can read.
pub const STATE_VERSION: u32 = 1;

/// Serialized form of an AND/OR combinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombiningState {
    /// Format version the state was written with.
    #[serde(default = "default_version")]
    pub version: u32,
    /// `(type_reference, inner_state)` for each member, in order.
    pub triggers: Vec<(String, serde_json::Value)>,
    /// Jitter bound in seconds.
    #[serde(default)]
    pub jitter: Option<u32>,
}

fn default_version() -> u32 {
    STATE_VERSION
}

impl CombiningState {
    /// Fails if the state was written by a newer format.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedVersion` when `version` exceeds [`STATE_VERSION`].
    pub fn check_version(&self) -> Result<(), Report<TriggerError>> {
        if self.version > STATE_VERSION {
            return Err(TriggerError::UnsupportedVersion {
                found: self.version,
                supported: STATE_VERSION,
            }
            .into());
        }
        Ok(())
    }
}

pub(crate) fn decode_state<T: DeserializeOwned>(
    state: serde_json::Value,
) -> Result<T, Report<TriggerError>> {
    Ok(
        serde_json::from_value(state).map_err(|e| TriggerError::InvalidState {
            reason: e.to_string(),
        })?,
    )
}

pub(crate) fn encode_state<T: Serialize>(value: &T) -> Result<serde_json::Value, Report<TriggerError>> {
    Ok(
        serde_json::to_value(value).map_err(|e| TriggerError::InvalidState {
            reason: e.to_string(),
        })?,
    )
}
