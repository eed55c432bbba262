//! Name-keyed resolution of trigger kinds.
//!
//! Serialized state and configuration name trigger kinds by string. The
//! registry is the only place those strings are interpreted; everything past
//! it works with the closed [`Trigger`] enum.

use crate::error::TriggerError;
use crate::jitter::{JitterSource, RandomJitter};
use crate::state::{CombiningState, decode_state};
use crate::{
    AndTrigger, CronTrigger, DateTrigger, IntervalTrigger, OrTrigger, Trigger, TriggerKind,
};
use rootcause::prelude::Report;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Maps type references and configuration aliases to trigger kinds.
#[derive(Debug, Clone)]
pub struct TriggerRegistry {
    kinds: HashMap<String, TriggerKind>,
    jitter_source: Arc<dyn JitterSource>,
}

impl TriggerRegistry {
    /// Creates a registry knowing every built-in kind by reference and alias.
    #[must_use]
    pub fn new() -> Self {
        let mut kinds = HashMap::new();
        for kind in TriggerKind::ALL {
            kinds.insert(kind.type_reference().to_string(), kind);
            kinds.insert(kind.alias().to_string(), kind);
        }
        Self {
            kinds,
            jitter_source: Arc::new(RandomJitter::new()),
        }
    }

    /// Sets the jitter source handed to restored combinators.
    #[must_use]
    pub fn with_jitter_source(mut self, source: Arc<dyn JitterSource>) -> Self {
        self.jitter_source = source;
        self
    }

    /// The jitter source handed to restored combinators.
    #[must_use]
    pub fn jitter_source(&self) -> Arc<dyn JitterSource> {
        Arc::clone(&self.jitter_source)
    }

    /// Resolves a type reference or alias.
    ///
    /// # Errors
    ///
    /// Returns `TypeResolution` for unknown names.
    pub fn resolve(&self, reference: &str) -> Result<TriggerKind, Report<TriggerError>> {
        Ok(*self
            .kinds
            .get(reference)
            .ok_or_else(|| TriggerError::TypeResolution {
                reference: reference.to_string(),
            })?)
    }

    /// The reference stored in serialized state for `kind`.
    #[must_use]
    pub fn reference_of(kind: TriggerKind) -> &'static str {
        kind.type_reference()
    }

    /// Reconstructs a trigger from a stored reference and inner state.
    ///
    /// # Errors
    ///
    /// Returns `TypeResolution` for unknown references and whatever the
    /// resolved kind reports for a bad inner state.
    pub fn restore(
        &self,
        reference: &str,
        state: serde_json::Value,
    ) -> Result<Trigger, Report<TriggerError>> {
        let kind = self.resolve(reference)?;
        debug!(reference, %kind, "restoring trigger");
        Ok(match kind {
            TriggerKind::Interval => IntervalTrigger::from_state(state)?.into(),
            TriggerKind::Cron => CronTrigger::from_state(state)?.into(),
            TriggerKind::Date => DateTrigger::from_state(state)?.into(),
            TriggerKind::And => {
                let state: CombiningState = decode_state(state)?;
                AndTrigger::from_state(state, self)?.into()
            }
            TriggerKind::Or => {
                let state: CombiningState = decode_state(state)?;
                OrTrigger::from_state(state, self)?.into()
            }
        })
    }
}

impl Default for TriggerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
