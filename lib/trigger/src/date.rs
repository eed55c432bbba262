//! One-shot schedules.

use crate::error::TriggerError;
use crate::state::decode_state;
use crate::Timestamp;
use rootcause::prelude::Report;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fires exactly once, at `run_date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateTrigger {
    /// The single fire time.
    pub run_date: Timestamp,
}

impl DateTrigger {
    /// Type reference stored in serialized combinator state.
    pub const TYPE_REFERENCE: &'static str = "cadence_trigger.date:DateTrigger";

    /// Creates a trigger firing at `run_date`.
    #[must_use]
    pub fn new(run_date: Timestamp) -> Self {
        Self { run_date }
    }

    /// Restores a trigger from its serialized inner state.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if the value does not decode.
    pub fn from_state(state: serde_json::Value) -> Result<Self, Report<TriggerError>> {
        decode_state(state)
    }

    /// Returns `run_date` until the trigger has fired once.
    ///
    /// `now` is not consulted: a run date in the past is still reported so the
    /// caller can apply its own misfire policy.
    #[must_use]
    pub fn next_fire_time(
        &self,
        previous_fire_time: Option<Timestamp>,
        _now: Timestamp,
    ) -> Option<Timestamp> {
        match previous_fire_time {
            None => Some(self.run_date),
            Some(_) => None,
        }
    }
}

impl fmt::Display for DateTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "date[{}]", self.run_date)
    }
}
