//! The trigger capability.
//!
//! Every schedule, concrete or combined, is a [`Trigger`]. Combinators hold
//! plain `Trigger` values, so AND/OR nest to any depth without special cases.

use crate::combining::{AndTrigger, OrTrigger};
use crate::cron::CronTrigger;
use crate::date::DateTrigger;
use crate::error::TriggerError;
use crate::interval::IntervalTrigger;
use crate::state::encode_state;
use crate::Timestamp;
use rootcause::prelude::Report;
use std::fmt;

/// A firing-schedule policy.
#[derive(Debug, Clone)]
pub enum Trigger {
    /// Fixed-interval schedule.
    Interval(IntervalTrigger),
    /// Cron expression schedule.
    Cron(CronTrigger),
    /// One-shot schedule.
    Date(DateTrigger),
    /// Fires only when every member agrees.
    And(AndTrigger),
    /// Fires whenever any member fires.
    Or(OrTrigger),
}

/// The closed set of trigger kinds, used at the (de)serialization boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    Interval,
    Cron,
    Date,
    And,
    Or,
}

impl TriggerKind {
    /// Every kind, in registration order.
    pub const ALL: [Self; 5] = [Self::Interval, Self::Cron, Self::Date, Self::And, Self::Or];

    /// Qualified type reference written into serialized state.
    #[must_use]
    pub const fn type_reference(self) -> &'static str {
        match self {
            Self::Interval => IntervalTrigger::TYPE_REFERENCE,
            Self::Cron => CronTrigger::TYPE_REFERENCE,
            Self::Date => DateTrigger::TYPE_REFERENCE,
            Self::And => AndTrigger::TYPE_REFERENCE,
            Self::Or => OrTrigger::TYPE_REFERENCE,
        }
    }

    /// Short name used in configuration.
    #[must_use]
    pub const fn alias(self) -> &'static str {
        match self {
            Self::Interval => "interval",
            Self::Cron => "cron",
            Self::Date => "date",
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.alias())
    }
}

impl Trigger {
    /// Computes the next fire time.
    ///
    /// Returns `Ok(None)` once the schedule has permanently finished.
    ///
    /// # Errors
    ///
    /// Propagates evaluation failures from this trigger or any nested member.
    pub fn next_fire_time(
        &self,
        previous_fire_time: Option<Timestamp>,
        now: Timestamp,
    ) -> Result<Option<Timestamp>, Report<TriggerError>> {
        match self {
            Self::Interval(t) => t.next_fire_time(previous_fire_time, now),
            Self::Cron(t) => t.next_fire_time(previous_fire_time, now),
            Self::Date(t) => Ok(t.next_fire_time(previous_fire_time, now)),
            Self::And(t) => t.next_fire_time(previous_fire_time, now),
            Self::Or(t) => t.next_fire_time(previous_fire_time, now),
        }
    }

    /// The kind of this trigger.
    #[must_use]
    pub fn kind(&self) -> TriggerKind {
        match self {
            Self::Interval(_) => TriggerKind::Interval,
            Self::Cron(_) => TriggerKind::Cron,
            Self::Date(_) => TriggerKind::Date,
            Self::And(_) => TriggerKind::And,
            Self::Or(_) => TriggerKind::Or,
        }
    }

    /// Qualified type reference written into serialized state.
    #[must_use]
    pub fn type_reference(&self) -> &'static str {
        self.kind().type_reference()
    }

    /// Lower bound on fire times, for display.
    #[must_use]
    pub fn start_date(&self) -> Option<Timestamp> {
        match self {
            Self::Interval(t) => Some(t.start_date),
            Self::Cron(t) => t.start_date(),
            Self::Date(_) | Self::And(_) | Self::Or(_) => None,
        }
    }

    /// Upper bound on fire times, for display.
    #[must_use]
    pub fn end_date(&self) -> Option<Timestamp> {
        match self {
            Self::Interval(t) => t.end_date,
            Self::Cron(t) => t.end_date(),
            Self::Date(_) | Self::And(_) | Self::Or(_) => None,
        }
    }

    /// Serializes this trigger's inner state.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if a member cannot be encoded.
    pub fn to_state(&self) -> Result<serde_json::Value, Report<TriggerError>> {
        match self {
            Self::Interval(t) => encode_state(t),
            Self::Cron(t) => encode_state(t),
            Self::Date(t) => encode_state(t),
            Self::And(t) => encode_state(&t.to_state()?),
            Self::Or(t) => encode_state(&t.to_state()?),
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interval(t) => write!(f, "{t}"),
            Self::Cron(t) => write!(f, "{t}"),
            Self::Date(t) => write!(f, "{t}"),
            Self::And(t) => write!(f, "{t}"),
            Self::Or(t) => write!(f, "{t}"),
        }
    }
}

impl From<IntervalTrigger> for Trigger {
    fn from(trigger: IntervalTrigger) -> Self {
        Self::Interval(trigger)
    }
}

impl From<CronTrigger> for Trigger {
    fn from(trigger: CronTrigger) -> Self {
        Self::Cron(trigger)
    }
}

impl From<DateTrigger> for Trigger {
    fn from(trigger: DateTrigger) -> Self {
        Self::Date(trigger)
    }
}

impl From<AndTrigger> for Trigger {
    fn from(trigger: AndTrigger) -> Self {
        Self::And(trigger)
    }
}

impl From<OrTrigger> for Trigger {
    fn from(trigger: OrTrigger) -> Self {
        Self::Or(trigger)
    }
}
