use super::CombiningTrigger;
use crate::error::TriggerError;
use crate::jitter::JitterSource;
use crate::registry::TriggerRegistry;
use crate::state::CombiningState;
use crate::{Timestamp, Trigger};
use rootcause::prelude::Report;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Upper bound on rendezvous steps before the search gives up.
pub const MAX_RENDEZVOUS_ITERATIONS: usize = 1000;

/// Fires at the earliest instant that every member accepts.
///
/// The combination is finished as soon as any member is finished.
///
/// Configuration alias: `and`.
#[derive(Clone)]
pub struct AndTrigger {
    base: CombiningTrigger,
}

impl AndTrigger {
    /// Type reference stored in serialized combinator state.
    pub const TYPE_REFERENCE: &'static str = "cadence_trigger.combining:AndTrigger";

    /// Combines `triggers`, jittering the agreed fire time by up to `jitter` seconds.
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

    /// Searches for the earliest instant at or after `now` that every member
    /// reports as its own next fire time.
    ///
    /// Each step queries all members at the current candidate and moves the
    /// candidate to the latest answer, until all answers coincide. Members see
    /// `previous_fire_time` widened by the jitter bound, so a meeting point
    /// that was handed out early is not found again.
    ///
    /// # Errors
    ///
    /// Returns `RendezvousNotFound` when the members stop making progress or
    /// do not agree within [`MAX_RENDEZVOUS_ITERATIONS`] steps. Member errors
    /// propagate unchanged.
    pub fn next_fire_time(
        &self,
        previous_fire_time: Option<Timestamp>,
        now: Timestamp,
    ) -> Result<Option<Timestamp>, Report<TriggerError>> {
        let triggers = self.base.triggers();
        match triggers {
            [] => return Ok(None),
            [only] => return only.next_fire_time(previous_fire_time, now),
            _ => {}
        }

        let consumed = self.base.consumed_through(previous_fire_time);
        let mut candidate = now;
        let mut iterations = 0;
        while iterations < MAX_RENDEZVOUS_ITERATIONS {
            iterations += 1;
            let mut earliest = Timestamp::MAX_UTC;
            let mut latest = Timestamp::MIN_UTC;
            for trigger in triggers {
                match trigger.next_fire_time(consumed, candidate)? {
                    Some(fire_time) => {
                        earliest = earliest.min(fire_time);
                        latest = latest.max(fire_time);
                    }
                    None => {
                        debug!(%trigger, iterations, "member finished, and-trigger finished");
                        return Ok(None);
                    }
                }
            }

            if earliest == latest {
                debug!(iterations, fire_time = %latest, "members agreed on fire time");
                return Ok(Some(self.base.jittered(latest, now)));
            }
            if latest == candidate {
                // Members are pure, so asking again yields the same answers.
                break;
            }
            trace!(iterations, from = %candidate, to = %latest, "advancing rendezvous candidate");
            candidate = latest;
        }

        warn!(
            iterations,
            %candidate,
            trigger = %self,
            "and-trigger members never agreed on a fire time"
        );
        Err(TriggerError::RendezvousNotFound {
            iterations,
            candidate,
        }
        .into())
    }
}

impl fmt::Display for AndTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.base.fmt_compact("and", f)
    }
}

impl fmt::Debug for AndTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.base.fmt_repr("AndTrigger", f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jitter::RandomJitter;
    use crate::{CronTrigger, DateTrigger, IntervalTrigger, OrTrigger};
    use chrono::{Duration, TimeZone, Utc};

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn secs(n: i64) -> Duration {
        Duration::seconds(n)
    }

    fn every(period: u64) -> Trigger {
        IntervalTrigger::new(period, t0()).expect("valid").into()
    }

    #[test]
    fn empty_never_fires() {
        let trigger = AndTrigger::new(Vec::new(), None);
        assert_eq!(trigger.next_fire_time(None, t0()).unwrap(), None);
    }

    #[test]
    fn single_member_is_delegated() {
        let member = every(5);
        let trigger = AndTrigger::new(vec![member.clone()], Some(30));
        for (previous, now) in [
            (None, t0()),
            (None, t0() + secs(7)),
            (Some(t0() + secs(10)), t0() + secs(10)),
            (Some(t0() + secs(10)), t0() + secs(3)),
        ] {
            assert_eq!(
                trigger.next_fire_time(previous, now).unwrap(),
                member.next_fire_time(previous, now).unwrap()
            );
        }
    }

    #[test]
    fn intervals_meet_at_least_common_multiple() {
        let trigger = AndTrigger::new(vec![every(2), every(3)], None);
        assert_eq!(trigger.next_fire_time(None, t0()).unwrap(), Some(t0() + secs(6)));
    }

    #[test]
    fn next_meeting_follows_previous_fire_time() {
        let trigger = AndTrigger::new(vec![every(2), every(3)], None);
        let previous = t0() + secs(6);
        assert_eq!(
            trigger.next_fire_time(Some(previous), previous).unwrap(),
            Some(t0() + secs(12))
        );
    }

    #[test]
    fn member_finishing_mid_search_finishes_the_and() {
        let short = IntervalTrigger::new(3, t0())
            .expect("valid")
            .with_end_date(t0() + secs(5));
        let trigger = AndTrigger::new(vec![every(2), short.into()], None);
        assert_eq!(trigger.next_fire_time(None, t0()).unwrap(), None);
    }

    #[test]
    fn member_finished_on_first_query_finishes_the_and() {
        let done = DateTrigger::new(t0() + secs(4));
        let trigger = AndTrigger::new(vec![every(2), done.into()], None);
        assert_eq!(
            trigger.next_fire_time(Some(t0() + secs(4)), t0()).unwrap(),
            None
        );
    }

    #[test]
    fn one_shot_on_the_grid_is_found() {
        let once = DateTrigger::new(t0() + secs(8));
        let trigger = AndTrigger::new(vec![every(2), once.into()], None);
        assert_eq!(trigger.next_fire_time(None, t0()).unwrap(), Some(t0() + secs(8)));
    }

    #[test]
    fn stalled_search_is_reported() {
        let off_grid = DateTrigger::new(t0() + secs(5));
        let trigger = AndTrigger::new(vec![every(2), off_grid.into()], None);
        let err = trigger.next_fire_time(None, t0()).unwrap_err();
        assert_eq!(
            err.current_context(),
            &TriggerError::RendezvousNotFound {
                iterations: 3,
                candidate: t0() + secs(6),
            }
        );
    }

    #[test]
    fn disjoint_grids_exhaust_the_iteration_bound() {
        let odd = IntervalTrigger::new(2, t0() - secs(1)).expect("valid");
        let trigger = AndTrigger::new(vec![odd.into(), every(2)], None);
        let err = trigger.next_fire_time(None, t0()).unwrap_err();
        assert!(matches!(
            err.current_context(),
            TriggerError::RendezvousNotFound {
                iterations: MAX_RENDEZVOUS_ITERATIONS,
                ..
            }
        ));
    }

    #[test]
    fn jitter_is_applied_once_to_the_meeting_point() {
        let trigger = AndTrigger::new(vec![every(2), every(3)], Some(1))
            .with_jitter_source(Arc::new(RandomJitter::seeded(11)));
        for _ in 0..50 {
            let fire_time = trigger
                .next_fire_time(None, t0())
                .unwrap()
                .expect("fires");
            assert!(fire_time >= t0() + secs(5) && fire_time <= t0() + secs(7));
        }
    }

    #[test]
    fn jittered_meeting_points_fire_once_each() {
        let trigger = AndTrigger::new(vec![every(2), every(3)], Some(1))
            .with_jitter_source(Arc::new(RandomJitter::seeded(3)));
        let mut previous = None;
        let mut now = t0();
        for k in 1..=30 {
            let fire_time = trigger
                .next_fire_time(previous, now)
                .unwrap()
                .expect("fires");
            let meeting = t0() + secs(6 * k);
            assert!(
                fire_time >= meeting - secs(1) && fire_time <= meeting + secs(1),
                "fire {k} at {fire_time} is not near {meeting}"
            );
            previous = Some(fire_time);
            now = fire_time;
        }
    }

    #[test]
    fn nested_combinators_recurse() {
        let either = OrTrigger::new(vec![every(4), every(6)], None);
        let trigger = AndTrigger::new(vec![either.into(), every(5)], None);
        // or fires at 4, 6, 8, 12, ...; the first of those on the 5s grid is 20.
        assert_eq!(
            trigger.next_fire_time(None, t0()).unwrap(),
            Some(t0() + secs(20))
        );
    }

    #[test]
    fn member_errors_propagate() {
        let odd = IntervalTrigger::new(2, t0() - secs(1)).expect("valid");
        let failing = AndTrigger::new(vec![odd.into(), every(2)], None);
        let trigger = AndTrigger::new(vec![failing.into(), every(3)], None);
        let err = trigger.next_fire_time(None, t0()).unwrap_err();
        assert!(matches!(
            err.current_context(),
            TriggerError::RendezvousNotFound { .. }
        ));
    }

    #[test]
    fn cron_and_interval_agree() {
        let minutely = CronTrigger::new("0 * * * * *").expect("valid");
        let trigger = AndTrigger::new(vec![minutely.into(), every(45)], None);
        // 45s grid: 45, 90, 135, 180 -> first whole minute is 180s.
        assert_eq!(
            trigger.next_fire_time(None, t0()).unwrap(),
            Some(t0() + secs(180))
        );
    }

    #[test]
    fn renders_compact_and_debug_forms() {
        let trigger = AndTrigger::new(vec![every(2), every(3)], Some(5));
        assert_eq!(trigger.to_string(), "and[interval[0:00:02], interval[0:00:03]]");
        let repr = format!("{trigger:?}");
        assert!(repr.starts_with("<AndTrigger(["));
        assert!(repr.ends_with(", jitter=5)>"));
    }

    #[test]
    fn debug_form_omits_zero_jitter() {
        let trigger = AndTrigger::new(vec![every(2), every(3)], Some(0));
        let repr = format!("{trigger:?}");
        assert!(repr.ends_with("])>"), "{repr}");
        assert!(!repr.contains("jitter"));
    }
}
