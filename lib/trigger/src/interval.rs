//! Fixed-interval schedules.

use crate::error::TriggerError;
use crate::state::decode_state;
use crate::Timestamp;
use cadence_core::time::{checked_add, seconds};
use chrono::Duration;
use rootcause::prelude::Report;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fires every `interval_seconds`, on the grid anchored at `start_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalTrigger {
    /// Length of one period in seconds. Never zero.
    pub interval_seconds: u64,
    /// First fire time; every later fire time is a whole number of periods after it.
    pub start_date: Timestamp,
    /// Last instant a fire time may fall on.
    #[serde(default)]
    pub end_date: Option<Timestamp>,
}

impl IntervalTrigger {
    /// Type reference stored in serialized combinator state.
    pub const TYPE_REFERENCE: &'static str = "cadence_trigger.interval:IntervalTrigger";

    /// Creates a trigger whose first fire time is one interval after `reference`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the interval is zero or out of range.
    pub fn new(interval_seconds: u64, reference: Timestamp) -> Result<Self, Report<TriggerError>> {
        let interval = interval_duration(interval_seconds)?;
        let start_date =
            checked_add(reference, interval).ok_or_else(|| TriggerError::InvalidConfig {
                reason: format!("start date overflows: {reference} + {interval_seconds}s"),
            })?;
        Ok(Self {
            interval_seconds,
            start_date,
            end_date: None,
        })
    }

    /// Anchors the grid at an explicit first fire time.
    #[must_use]
    pub fn with_start_date(mut self, start_date: Timestamp) -> Self {
        self.start_date = start_date;
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
    /// Returns `InvalidState` if the value does not decode and `InvalidConfig`
    /// if it decodes to a zero interval.
    pub fn from_state(state: serde_json::Value) -> Result<Self, Report<TriggerError>> {
        let trigger: Self = decode_state(state)?;
        interval_duration(trigger.interval_seconds)?;
        Ok(trigger)
    }

    /// Returns the first grid point at or after `now` and strictly after
    /// `previous_fire_time`, or `None` once past `end_date`.
    ///
    /// # Errors
    ///
    /// Returns `EvaluationFailed` if the fire time is not representable.
    pub fn next_fire_time(
        &self,
        previous_fire_time: Option<Timestamp>,
        now: Timestamp,
    ) -> Result<Option<Timestamp>, Report<TriggerError>> {
        let interval = interval_duration(self.interval_seconds)?;
        let period_us = interval
            .num_microseconds()
            .ok_or_else(|| overflow("interval in microseconds"))?;

        let mut index = self.first_index_at_or_after(now, period_us)?;
        if let Some(previous) = previous_fire_time {
            index = index.max(self.first_index_after(previous, period_us)?);
        }

        let offset = index
            .checked_mul(period_us)
            .map(Duration::microseconds)
            .ok_or_else(|| overflow("grid offset"))?;
        let next = checked_add(self.start_date, offset).ok_or_else(|| overflow("fire time"))?;

        match self.end_date {
            Some(end) if next > end => Ok(None),
            _ => Ok(Some(next)),
        }
    }

    fn elapsed_us(&self, instant: Timestamp) -> Result<i64, Report<TriggerError>> {
        Ok((instant - self.start_date)
            .num_microseconds()
            .ok_or_else(|| overflow("elapsed time"))?)
    }

    fn first_index_at_or_after(
        &self,
        instant: Timestamp,
        period_us: i64,
    ) -> Result<i64, Report<TriggerError>> {
        if instant <= self.start_date {
            return Ok(0);
        }
        let elapsed = self.elapsed_us(instant)?;
        Ok(elapsed / period_us + i64::from(elapsed % period_us != 0))
    }

    fn first_index_after(
        &self,
        instant: Timestamp,
        period_us: i64,
    ) -> Result<i64, Report<TriggerError>> {
        if instant < self.start_date {
            return Ok(0);
        }
        Ok(self.elapsed_us(instant)? / period_us + 1)
    }
}

fn interval_duration(interval_seconds: u64) -> Result<Duration, Report<TriggerError>> {
    if interval_seconds == 0 {
        return Err(TriggerError::InvalidConfig {
            reason: "interval must be at least one second".to_string(),
        }
        .into());
    }
    Ok(seconds(interval_seconds).ok_or_else(|| TriggerError::InvalidConfig {
        reason: format!("interval of {interval_seconds}s is out of range"),
    })?)
}

fn overflow(what: &str) -> TriggerError {
    TriggerError::EvaluationFailed {
        reason: format!("{what} overflows"),
    }
}

impl fmt::Display for IntervalTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let days = self.interval_seconds / 86_400;
        let rest = self.interval_seconds % 86_400;
        let (hours, minutes, secs) = (rest / 3600, rest % 3600 / 60, rest % 60);
        match days {
            0 => write!(f, "interval[{hours}:{minutes:02}:{secs:02}]"),
            1 => write!(f, "interval[1 day, {hours}:{minutes:02}:{secs:02}]"),
            _ => write!(f, "interval[{days} days, {hours}:{minutes:02}:{secs:02}]"),
        }
    }
}
