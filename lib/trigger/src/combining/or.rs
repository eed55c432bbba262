use super::CombiningTrigger;
use crate::error::TriggerError;
use crate::jitter::JitterSource;
use crate::registry::TriggerRegistry;
use crate::state::CombiningState;
use crate::{Timestamp, Trigger};
use rootcause::prelude::Report;
use std::fmt;
use std::sync::Arc;

/// Fires at the earliest instant proposed by any member.
///
/// The combination is finished only once every member is finished.
///
/// Members that depend on the previous fire time, such as interval triggers,
/// are handed the OR's own previous fire time, which may have come from a
/// different member. Their schedule can then look irregular on its own.
///
/// Configuration alias: `or`.
#[derive(Clone)]
pub struct OrTrigger {
    base: CombiningTrigger,
}

impl OrTrigger {
    /// Type reference stored in serialized combinator state.
    pub const TYPE_REFERENCE: &'static str = "cadence_trigger.combining:OrTrigger";

    /// Combines `triggers`, jittering the chosen fire time by up to `jitter` seconds.
    #[must_use]
    pub fn new(triggers: Vec<Trigger>, jitter: Option<u32>) -> Self {
        Self {
            base: CombiningTrigger::new(triggers, jitter),
        }
    }

    /// Replaces the source jitter offsets are drawn from.
    #[must_use]
    pub fn with_jitter_source(mut self, source: Arc<dyn JitterSource>) -> Self {
        self.base = self.base.with_jitter_source(source);
        self
    }

    /// Members, in the order they were given.
    #[must_use]
    pub fn triggers(&self) -> &[Trigger] {
        self.base.triggers()
    }

    /// Jitter bound in seconds.
    #[must_use]
    pub fn jitter(&self) -> Option<u32> {
        self.base.jitter()
    }

    /// Produces the versioned serialized form.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if a member cannot be encoded.
    pub fn to_state(&self) -> Result<CombiningState, Report<TriggerError>> {
        self.base.to_state()
    }

    /// Rebuilds the combinator from serialized state.
    ///
    /// # Errors
    ///
    /// See [`CombiningTrigger::from_state`].
    pub fn from_state(
        state: CombiningState,
        registry: &TriggerRegistry,
    ) -> Result<Self, Report<TriggerError>> {
        Ok(Self {
            base: CombiningTrigger::from_state(state, registry)?,
        })
    }

    /// Replaces members and jitter in place; unchanged on error.
    ///
    /// # Errors
    ///
    /// See [`CombiningTrigger::from_state`].
    pub fn restore_state(
        &mut self,
        state: CombiningState,
        registry: &TriggerRegistry,
    ) -> Result<(), Report<TriggerError>> {
        self.base.restore_state(state, registry)
    }

    /// Returns the earliest next fire time among all members.
    ///
    /// # Errors
    ///
    /// Member errors propagate unchanged.
    pub fn next_fire_time(
        &self,
        previous_fire_time: Option<Timestamp>,
        now: Timestamp,
    ) -> Result<Option<Timestamp>, Report<TriggerError>> {
        let consumed = self.base.consumed_through(previous_fire_time);
        let mut earliest: Option<Timestamp> = None;
        for trigger in self.base.triggers() {
            if let Some(fire_time) = trigger.next_fire_time(consumed, now)? {
                earliest = Some(earliest.map_or(fire_time, |e| e.min(fire_time)));
            }
        }
        Ok(earliest.map(|fire_time| self.base.jittered(fire_time, now)))
    }
}

impl fmt::Display for OrTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.base.fmt_compact("or", f)
    }
}

impl fmt::Debug for OrTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.base.fmt_repr("OrTrigger", f)
    }
}
