//! Logical combinators over triggers.
//!
//! - [`AndTrigger`]: fires at the earliest instant every member agrees on.
//! - [`OrTrigger`]: fires at the earliest instant any member proposes.
//!
//! Both share [`CombiningTrigger`], which owns the member list, the jitter
//! bound and the versioned serialized form.

mod and;
mod or;

pub use and::{AndTrigger, MAX_RENDEZVOUS_ITERATIONS};
pub use or::OrTrigger;

use crate::error::TriggerError;
use crate::jitter::{JitterSource, RandomJitter, apply_jitter};
use crate::registry::TriggerRegistry;
use crate::state::{CombiningState, STATE_VERSION};
use crate::{Timestamp, Trigger};
use chrono::Duration;
use rootcause::prelude::Report;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Members and jitter shared by the AND and OR combinators.
#[derive(Clone)]
pub struct CombiningTrigger {
    triggers: Vec<Trigger>,
    jitter: Option<u32>,
    jitter_source: Arc<dyn JitterSource>,
}

impl CombiningTrigger {
    /// Creates a combinator base over `triggers`, jittered by up to `jitter` seconds.
    #[must_use]
    pub fn new(triggers: Vec<Trigger>, jitter: Option<u32>) -> Self {
        Self {
            triggers,
            jitter,
            jitter_source: Arc::new(RandomJitter::new()),
        }
    }

    /// Replaces the source jitter offsets are drawn from.
    #[must_use]
    pub fn with_jitter_source(mut self, source: Arc<dyn JitterSource>) -> Self {
        self.jitter_source = source;
        self
    }

    /// Members, in the order they were given.
    #[must_use]
    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    /// Jitter bound in seconds.
    #[must_use]
    pub fn jitter(&self) -> Option<u32> {
        self.jitter
    }

    fn jitter_bound(&self) -> Option<Duration> {
        self.jitter.map(|secs| Duration::seconds(i64::from(secs)))
    }

    /// Applies this combinator's jitter to a merged fire time.
    pub(crate) fn jittered(&self, time: Timestamp, now: Timestamp) -> Timestamp {
        apply_jitter(time, self.jitter_bound(), now, self.jitter_source.as_ref())
    }

    /// Previous fire time as seen by the members.
    ///
    /// A fire time handed out by this combinator lies at most one jitter bound
    /// before the member occurrence it came from, so members treat everything
    /// up to `previous + bound` as already fired.
    pub(crate) fn consumed_through(&self, previous: Option<Timestamp>) -> Option<Timestamp> {
        previous.map(|previous| {
            self.jitter_bound()
                .and_then(|bound| previous.checked_add_signed(bound))
                .unwrap_or(previous)
        })
    }

    /// Produces the versioned serialized form.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if a member cannot be encoded.
    pub fn to_state(&self) -> Result<CombiningState, Report<TriggerError>> {
        let mut triggers = Vec::with_capacity(self.triggers.len());
        for trigger in &self.triggers {
            triggers.push((trigger.type_reference().to_string(), trigger.to_state()?));
        }
        Ok(CombiningState {
            version: STATE_VERSION,
            triggers,
            jitter: self.jitter,
        })
    }

    /// Rebuilds a combinator base from serialized state.
    ///
    /// Members are resolved through `registry`, and restored combinators draw
    /// jitter from the registry's source.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedVersion` for state from a newer format,
    /// `TypeResolution` for an unknown member reference and `InvalidState`
    /// for a member state that does not decode.
    pub fn from_state(
        state: CombiningState,
        registry: &TriggerRegistry,
    ) -> Result<Self, Report<TriggerError>> {
        state.check_version()?;
        let triggers = state
            .triggers
            .into_iter()
            .map(|(reference, inner)| registry.restore(&reference, inner))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(members = triggers.len(), jitter = ?state.jitter, "restored combinator state");
        Ok(Self::new(triggers, state.jitter).with_jitter_source(registry.jitter_source()))
    }

    /// Replaces members and jitter with those in `state`.
    ///
    /// The jitter source is kept. On error `self` is left unchanged.
    ///
    /// # Errors
    ///
    /// Same as [`CombiningTrigger::from_state`].
    pub fn restore_state(
        &mut self,
        state: CombiningState,
        registry: &TriggerRegistry,
    ) -> Result<(), Report<TriggerError>> {
        let restored = Self::from_state(state, registry)?;
        self.triggers = restored.triggers;
        self.jitter = restored.jitter;
        Ok(())
    }

    /// Writes `name[t1, t2, ...]`.
    fn fmt_compact(&self, name: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{name}[")?;
        for (i, trigger) in self.triggers.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{trigger}")?;
        }
        f.write_str("]")
    }

    /// Writes `<TypeName([t1, t2][, jitter=N])>`, leaving out a zero jitter.
    fn fmt_repr(&self, type_name: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{type_name}({:?}", self.triggers)?;
        if let Some(jitter) = self.jitter.filter(|j| *j > 0) {
            write!(f, ", jitter={jitter}")?;
        }
        f.write_str(")>")
    }
}

impl fmt::Debug for CombiningTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_repr("CombiningTrigger", f)
    }
}
