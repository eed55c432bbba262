//! End-to-end behavior of the combinators through the public API.

use cadence_trigger::{
    AndTrigger, CombiningState, CronTrigger, DateTrigger, IntervalTrigger, OrTrigger,
    RandomJitter, Timestamp, Trigger, TriggerConfig, TriggerError, TriggerRegistry,
};
use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;

fn t0() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 7, 1, 6, 0, 0).unwrap()
}

fn secs(n: i64) -> Duration {
    Duration::seconds(n)
}

fn probes() -> Vec<(Option<Timestamp>, Timestamp)> {
    let mut probes = Vec::new();
    for now in [0, 1, 7, 59, 60, 3_601] {
        probes.push((None, t0() + secs(now)));
        probes.push((Some(t0() + secs(now)), t0() + secs(now)));
    }
    probes
}

fn sample_tree() -> Trigger {
    let every_two = IntervalTrigger::new(2, t0()).expect("valid");
    let every_three = IntervalTrigger::new(3, t0()).expect("valid");
    let minutely = CronTrigger::new("0 * * * * *").expect("valid");
    let once = DateTrigger::new(t0() + secs(90));
    let both = AndTrigger::new(vec![every_two.into(), every_three.into()], None);
    OrTrigger::new(vec![both.into(), minutely.into(), once.into()], None).into()
}

#[test]
fn or_returns_minimum_of_unfinished_members() {
    let offsets = [[5, 2, 9], [40, 41, 3], [7, 7, 7], [0, 100, 50]];
    for set in offsets {
        let members: Vec<Trigger> = set
            .iter()
            .map(|&o| DateTrigger::new(t0() + secs(o)).into())
            .collect();
        let trigger = OrTrigger::new(members, None);
        let expected = set.iter().min().map(|&o| t0() + secs(o));
        assert_eq!(trigger.next_fire_time(None, t0()).unwrap(), expected);
        // Every one-shot member has fired.
        assert_eq!(trigger.next_fire_time(Some(t0()), t0()).unwrap(), None);
    }
}

#[test]
fn or_scenario_picks_earlier_member() {
    let a = DateTrigger::new(t0() + secs(5));
    let b = DateTrigger::new(t0() + secs(2));
    let trigger = OrTrigger::new(vec![a.into(), b.into()], None);
    assert_eq!(trigger.next_fire_time(None, t0()).unwrap(), Some(t0() + secs(2)));
}

#[test]
fn empty_combinators_never_fire() {
    assert_eq!(
        AndTrigger::new(Vec::new(), Some(10))
            .next_fire_time(None, t0())
            .unwrap(),
        None
    );
    assert_eq!(
        OrTrigger::new(Vec::new(), Some(10))
            .next_fire_time(None, t0())
            .unwrap(),
        None
    );
}

#[test]
fn and_with_one_member_matches_that_member() {
    let member = sample_tree();
    let trigger = AndTrigger::new(vec![member.clone()], None);
    for (previous, now) in probes() {
        assert_eq!(
            trigger.next_fire_time(previous, now).unwrap(),
            member.next_fire_time(previous, now).unwrap()
        );
    }
}

#[test]
fn and_of_two_and_three_second_intervals_meets_at_six() {
    let trigger = AndTrigger::new(
        vec![
            IntervalTrigger::new(2, t0()).expect("valid").into(),
            IntervalTrigger::new(3, t0()).expect("valid").into(),
        ],
        None,
    );
    assert_eq!(trigger.next_fire_time(None, t0()).unwrap(), Some(t0() + secs(6)));
}

#[test]
fn and_follows_a_schedule_over_several_fires() {
    let trigger = AndTrigger::new(
        vec![
            IntervalTrigger::new(4, t0()).expect("valid").into(),
            IntervalTrigger::new(6, t0()).expect("valid").into(),
        ],
        None,
    );
    let mut previous = None;
    let mut now = t0();
    let mut fired = Vec::new();
    for _ in 0..4 {
        let next = trigger
            .next_fire_time(previous, now)
            .unwrap()
            .expect("fires");
        fired.push((next - t0()).num_seconds());
        previous = Some(next);
        now = next;
    }
    assert_eq!(fired, [12, 24, 36, 48]);
}

#[test]
fn and_finishes_when_any_member_finishes() {
    let ended = IntervalTrigger::new(5, t0())
        .expect("valid")
        .with_end_date(t0() + secs(20));
    let trigger = AndTrigger::new(
        vec![
            IntervalTrigger::new(7, t0()).expect("valid").into(),
            ended.into(),
        ],
        None,
    );
    assert_eq!(trigger.next_fire_time(None, t0()).unwrap(), None);
}

#[test]
fn jitter_never_precedes_now() {
    for seed in 0..100 {
        let trigger = OrTrigger::new(vec![DateTrigger::new(t0()).into()], Some(30))
            .with_jitter_source(Arc::new(RandomJitter::seeded(seed)));
        let fire_time = trigger
            .next_fire_time(None, t0())
            .unwrap()
            .expect("fires");
        assert!(fire_time >= t0());
        assert!(fire_time <= t0() + secs(30));
    }
}

#[test]
fn state_roundtrip_preserves_schedule() {
    let registry = TriggerRegistry::new();
    let original = sample_tree();
    let state = original.to_state().expect("state");
    let restored = registry
        .restore(original.type_reference(), state)
        .expect("restore");

    assert_eq!(restored.to_string(), original.to_string());
    for (previous, now) in probes() {
        assert_eq!(
            restored.next_fire_time(previous, now).unwrap(),
            original.next_fire_time(previous, now).unwrap(),
            "diverged at previous={previous:?} now={now}"
        );
    }
}

#[test]
fn jittered_or_fires_each_occurrence_once() {
    let every_ten = CronTrigger::new("*/10 * * * * *").expect("valid");
    let every_fifteen = IntervalTrigger::new(15, t0()).expect("valid");
    let trigger = OrTrigger::new(vec![every_ten.into(), every_fifteen.into()], Some(2))
        .with_jitter_source(Arc::new(RandomJitter::seeded(3)));

    let mut previous = None;
    let mut now = t0();
    for expected in [0, 10, 15, 20, 30, 40, 45, 50, 60] {
        let fire_time = trigger
            .next_fire_time(previous, now)
            .unwrap()
            .expect("fires");
        let drift = fire_time - (t0() + secs(expected));
        assert!(drift.abs() <= secs(2), "{fire_time} is not near +{expected}s");
        previous = Some(fire_time);
        now = fire_time;
    }
}

#[test]
fn jittered_roundtrip_is_reproducible_with_equal_seeds() {
    let original = AndTrigger::new(
        vec![
            IntervalTrigger::new(2, t0()).expect("valid").into(),
            IntervalTrigger::new(3, t0()).expect("valid").into(),
        ],
        Some(2),
    )
    .with_jitter_source(Arc::new(RandomJitter::seeded(5)));
    let registry = TriggerRegistry::new().with_jitter_source(Arc::new(RandomJitter::seeded(5)));
    let restored = AndTrigger::from_state(original.to_state().expect("state"), &registry)
        .expect("restore");

    assert_eq!(restored.jitter(), Some(2));
    for (previous, now) in probes() {
        assert_eq!(
            restored.next_fire_time(previous, now).unwrap(),
            original.next_fire_time(previous, now).unwrap()
        );
    }
}

#[test]
fn newer_state_version_fails_without_mutation() {
    let registry = TriggerRegistry::new();
    let mut target = OrTrigger::new(
        vec![DateTrigger::new(t0() + secs(5)).into()],
        Some(1),
    );
    let before = target.to_string();
    let state: CombiningState = serde_json::from_value(serde_json::json!({
        "version": 2,
        "triggers": [],
        "jitter": null,
    }))
    .expect("decode");

    let err = target.restore_state(state, &registry).unwrap_err();
    assert_eq!(
        err.current_context(),
        &TriggerError::UnsupportedVersion {
            found: 2,
            supported: 1
        }
    );
    assert_eq!(target.to_string(), before);
    assert_eq!(target.jitter(), Some(1));
}

#[test]
fn configured_tree_serializes_with_qualified_references() {
    let config: TriggerConfig = serde_json::from_value(serde_json::json!({
        "type": "or",
        "triggers": [
            { "type": "date", "run_date": "2024-07-01T06:00:05Z" },
            { "type": "and", "jitter": 3, "triggers": [
                { "type": "interval", "seconds": 2 },
                { "type": "cron", "expression": "*/3 * * * * *" },
            ]},
        ],
    }))
    .expect("decode");
    let trigger = config
        .build(t0(), &TriggerRegistry::new().jitter_source())
        .expect("build");

    let state = trigger.to_state().expect("state");
    assert_eq!(state["version"], 1);
    assert_eq!(state["jitter"], serde_json::Value::Null);
    assert_eq!(state["triggers"][0][0], "cadence_trigger.date:DateTrigger");
    assert_eq!(
        state["triggers"][1][0],
        "cadence_trigger.combining:AndTrigger"
    );
    assert_eq!(state["triggers"][1][1]["jitter"], 3);
    assert_eq!(
        state["triggers"][1][1]["triggers"][1][0],
        "cadence_trigger.cron:CronTrigger"
    );
}
