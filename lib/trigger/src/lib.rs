//! Trigger combinators for job scheduling.
//!
//! This crate provides:
//!
//! - **Triggers**: interval, cron and one-shot date schedules behind the
//!   closed [`Trigger`] enum
//! - **Combinators**: [`AndTrigger`] (rendezvous of all members) and
//!   [`OrTrigger`] (earliest of any member), nestable to any depth
//! - **Jitter**: injected random offsets applied once per combinator
//! - **State**: versioned serialized form and the [`TriggerRegistry`] that
//!   turns stored type references back into triggers
//! - **Config**: [`TriggerConfig`] definitions addressed by alias

pub mod combining;
pub mod config;
pub mod cron;
pub mod date;
pub mod error;
pub mod interval;
pub mod jitter;
pub mod registry;
pub mod state;
pub mod trigger;

pub use cadence_core::Timestamp;
pub use combining::{AndTrigger, CombiningTrigger, MAX_RENDEZVOUS_ITERATIONS, OrTrigger};
pub use config::TriggerConfig;
pub use self::cron::CronTrigger;
pub use date::DateTrigger;
pub use error::TriggerError;
pub use interval::IntervalTrigger;
pub use jitter::{JitterSource, RandomJitter, apply_jitter};
pub use registry::TriggerRegistry;
pub use state::{CombiningState, STATE_VERSION};
pub use trigger::{Trigger, TriggerKind};
