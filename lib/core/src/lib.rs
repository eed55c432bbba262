//! Core primitives for the cadence trigger library.
//!
//! This crate provides the shared error alias and the time types used
//! throughout the trigger and CLI crates.

pub mod error;
pub mod time;

pub use error::Result;
pub use time::Timestamp;
