//! Random perturbation of computed fire times.
//!
//! Combinators spread load by moving their final fire time up to `bound`
//! earlier or later. The randomness comes from an injected [`JitterSource`]
//! so that tests can run with a fixed seed.

use crate::Timestamp;
use chrono::Duration;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Source of jitter offsets.
///
/// Implementations must be safe to call from several threads at once.
pub trait JitterSource: Send + Sync + fmt::Debug {
    /// Draws an offset uniformly distributed in `[-bound, +bound]`.
    fn offset(&self, bound: Duration) -> Duration;
}

/// Uniform jitter backed by a seedable PRNG.
#[derive(Debug)]
pub struct RandomJitter {
    rng: Mutex<StdRng>,
}

impl RandomJitter {
    /// Creates a source seeded from the operating system.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Creates a reproducible source from a fixed seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomJitter {
    fn default() -> Self {
        Self::new()
    }
}

impl JitterSource for RandomJitter {
    fn offset(&self, bound: Duration) -> Duration {
        let micros = bound
            .num_microseconds()
            .unwrap_or(i64::MAX)
            .saturating_abs();
        if micros == 0 {
            return Duration::zero();
        }
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        Duration::microseconds(rng.random_range(-micros..=micros))
    }
}

/// Applies jitter to `time`.
///
/// Without a bound, or with a zero bound, the time is returned unchanged. With a bound the result is
/// `time` moved by a random offset in `[-bound, +bound]`, never earlier than
/// `now`.
#[must_use]
pub fn apply_jitter(
    time: Timestamp,
    bound: Option<Duration>,
    now: Timestamp,
    source: &dyn JitterSource,
) -> Timestamp {
    let Some(bound) = bound.filter(|bound| !bound.is_zero()) else {
        return time;
    };
    let offset = source.offset(bound);
    let jittered = time.checked_add_signed(offset).unwrap_or(time);
    jittered.max(now)
}
