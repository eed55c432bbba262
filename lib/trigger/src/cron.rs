//! Calendar schedules driven by cron expressions.

use crate::error::TriggerError;
use crate::state::decode_state;
use crate::Timestamp;
use chrono::Duration;
use rootcause::prelude::Report;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fires at every instant matched by a cron expression.
///
/// Expressions use the six or seven field form with seconds first, e.g.
/// `"0 */5 * * * *"` for every five minutes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "CronState", into = "CronState")]
pub struct CronTrigger {
    expression: String,
    schedule: cron::Schedule,
    start_date: Option<Timestamp>,
    end_date: Option<Timestamp>,
}

#[derive(Serialize, Deserialize)]
struct CronState {
    expression: String,
    #[serde(default)]
    start_date: Option<Timestamp>,
    #[serde(default)]
    end_date: Option<Timestamp>,
}

impl CronTrigger {
    /// Type reference stored in serialized combinator state.
    pub const TYPE_REFERENCE: &'static str = "cadence_trigger.cron:CronTrigger";

    /// Parses a cron expression.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCronExpression` if the expression does not parse.
    pub fn new(expression: impl Into<String>) -> Result<Self, Report<TriggerError>> {
        let expression = expression.into().trim().to_string();
        let schedule = cron::Schedule::from_str(&expression).map_err(|e| {
            TriggerError::InvalidCronExpression {
                expression: expression.clone(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self {
            expression,
            schedule,
            start_date: None,
            end_date: None,
        })
    }

    /// Ignores matches before `start_date`.
    #[must_use]
    pub fn with_start_date(mut self, start_date: Timestamp) -> Self {
        self.start_date = Some(start_date);
        self
    }

    /// Stops the schedule after `end_date`.
    #[must_use]
    pub fn with_end_date(mut self, end_date: Timestamp) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// Restores a trigger from its serialized inner state.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if the value does not decode or holds an
    /// unparsable expression.
    pub fn from_state(state: serde_json::Value) -> Result<Self, Report<TriggerError>> {
        decode_state(state)
    }

    /// The expression as written.
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Earliest matched instant, if bounded below.
    #[must_use]
    pub fn start_date(&self) -> Option<Timestamp> {
        self.start_date
    }

    /// Latest matched instant, if bounded above.
    #[must_use]
    pub fn end_date(&self) -> Option<Timestamp> {
        self.end_date
    }

    /// Returns the first match at or after `now` (and `start_date`) that is
    /// strictly after `previous_fire_time`, or `None` once past `end_date`.
    ///
    /// # Errors
    ///
    /// Returns `EvaluationFailed` if the search window is not representable.
    pub fn next_fire_time(
        &self,
        previous_fire_time: Option<Timestamp>,
        now: Timestamp,
    ) -> Result<Option<Timestamp>, Report<TriggerError>> {
        let floor = self.start_date.map_or(now, |start| start.max(now));
        // Matches fall on whole seconds, so probing one second early keeps a
        // match exactly at `floor` in range.
        let mut probe = floor
            .checked_sub_signed(Duration::seconds(1))
            .ok_or_else(|| TriggerError::EvaluationFailed {
                reason: format!("cannot search before {floor}"),
            })?;
        if let Some(previous) = previous_fire_time {
            probe = probe.max(previous);
        }

        Ok(self
            .schedule
            .after(&probe)
            .take_while(|t| self.end_date.is_none_or(|end| *t <= end))
            .find(|t| *t >= floor))
    }
}

impl TryFrom<CronState> for CronTrigger {
    type Error = TriggerError;

    fn try_from(state: CronState) -> Result<Self, Self::Error> {
        let schedule = cron::Schedule::from_str(&state.expression).map_err(|e| {
            TriggerError::InvalidCronExpression {
                expression: state.expression.clone(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self {
            expression: state.expression,
            schedule,
            start_date: state.start_date,
            end_date: state.end_date,
        })
    }
}

impl From<CronTrigger> for CronState {
    fn from(trigger: CronTrigger) -> Self {
        Self {
            expression: trigger.expression,
            start_date: trigger.start_date,
            end_date: trigger.end_date,
        }
    }
}

impl fmt::Display for CronTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cron[{}]", self.expression)
    }
}
