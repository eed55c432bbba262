//! Trigger definitions as they appear in configuration files.
//!
//! Each definition names its kind through the `type` field using the
//! configuration aliases (`interval`, `cron`, `date`, `and`, `or`):
//!
//! ```toml
//! type = "and"
//! jitter = 30
//!
//! [[triggers]]
//! type = "interval"
//! minutes = 15
//!
//! [[triggers]]
//! type = "cron"
//! expression = "0 0 9-17 * * Mon-Fri"
//! ```

use crate::error::TriggerError;
use crate::jitter::JitterSource;
use crate::{
    AndTrigger, CronTrigger, DateTrigger, IntervalTrigger, OrTrigger, Timestamp, Trigger,
    TriggerKind,
};
use rootcause::prelude::Report;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Configuration for a trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriggerConfig {
    /// Fixed-interval schedule. The period is the sum of the given units.
    Interval {
        #[serde(default)]
        weeks: u64,
        #[serde(default)]
        days: u64,
        #[serde(default)]
        hours: u64,
        #[serde(default)]
        minutes: u64,
        #[serde(default)]
        seconds: u64,
        /// First fire time. Defaults to one period after the build instant.
        #[serde(default)]
        start_date: Option<Timestamp>,
        #[serde(default)]
        end_date: Option<Timestamp>,
    },
    /// Cron expression schedule (seconds first).
    Cron {
        expression: String,
        #[serde(default)]
        start_date: Option<Timestamp>,
        #[serde(default)]
        end_date: Option<Timestamp>,
    },
    /// One-shot schedule.
    Date { run_date: Timestamp },
    /// All members must agree.
    And {
        triggers: Vec<TriggerConfig>,
        /// Jitter bound in seconds.
        #[serde(default)]
        jitter: Option<u32>,
    },
    /// Any member may fire.
    Or {
        triggers: Vec<TriggerConfig>,
        /// Jitter bound in seconds.
        #[serde(default)]
        jitter: Option<u32>,
    },
}

impl TriggerConfig {
    /// The kind this definition builds.
    #[must_use]
    pub fn kind(&self) -> TriggerKind {
        match self {
            Self::Interval { .. } => TriggerKind::Interval,
            Self::Cron { .. } => TriggerKind::Cron,
            Self::Date { .. } => TriggerKind::Date,
            Self::And { .. } => TriggerKind::And,
            Self::Or { .. } => TriggerKind::Or,
        }
    }

    /// Builds the trigger.
    ///
    /// `now` anchors interval schedules without an explicit start date.
    /// Combinators at every depth draw jitter from `jitter_source`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` or `InvalidCronExpression` for invalid
    /// definitions.
    pub fn build(
        &self,
        now: Timestamp,
        jitter_source: &Arc<dyn JitterSource>,
    ) -> Result<Trigger, Report<TriggerError>> {
        Ok(match self {
            Self::Interval {
                weeks,
                days,
                hours,
                minutes,
                seconds,
                start_date,
                end_date,
            } => {
                let interval_seconds = [
                    (*weeks, 604_800),
                    (*days, 86_400),
                    (*hours, 3_600),
                    (*minutes, 60),
                    (*seconds, 1),
                ]
                .into_iter()
                .try_fold(0u64, |total, (count, unit)| {
                    count.checked_mul(unit)?.checked_add(total)
                })
                .ok_or_else(|| TriggerError::InvalidConfig {
                    reason: "interval is too long".to_string(),
                })?;
                let mut trigger = IntervalTrigger::new(interval_seconds, now)?;
                if let Some(start) = start_date {
                    trigger = trigger.with_start_date(*start);
                }
                if let Some(end) = end_date {
                    trigger = trigger.with_end_date(*end);
                }
                trigger.into()
            }
            Self::Cron {
                expression,
                start_date,
                end_date,
            } => {
                let mut trigger = CronTrigger::new(expression.as_str())?;
                if let Some(start) = start_date {
                    trigger = trigger.with_start_date(*start);
                }
                if let Some(end) = end_date {
                    trigger = trigger.with_end_date(*end);
                }
                trigger.into()
            }
            Self::Date { run_date } => DateTrigger::new(*run_date).into(),
            Self::And { triggers, jitter } => {
                AndTrigger::new(build_all(triggers, now, jitter_source)?, *jitter)
                    .with_jitter_source(Arc::clone(jitter_source))
                    .into()
            }
            Self::Or { triggers, jitter } => {
                OrTrigger::new(build_all(triggers, now, jitter_source)?, *jitter)
                    .with_jitter_source(Arc::clone(jitter_source))
                    .into()
            }
        })
    }
}

fn build_all(
    configs: &[TriggerConfig],
    now: Timestamp,
    jitter_source: &Arc<dyn JitterSource>,
) -> Result<Vec<Trigger>, Report<TriggerError>> {
    configs
        .iter()
        .map(|config| config.build(now, jitter_source))
        .collect()
}
