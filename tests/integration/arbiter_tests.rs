//! Integration tests for the AppService → Arbiter → actuator pipeline.
//!
//! Each test drives whole control cycles with explicit timestamps and
//! asserts on the recorded actuator history.

use crate::mock_hw::{ActuatorCall, LogSink, MockHardware};

use servo_arbiter::app::commands::CommandToken;
use servo_arbiter::app::events::{ActuationCause, AppEvent};
use servo_arbiter::app::ports::ActuatorState;
use servo_arbiter::app::service::AppService;
use servo_arbiter::config::ArbiterConfig;

const T0: u64 = 10_000;
const GRACE: u64 = 15_000;

fn make_app() -> (AppService, MockHardware, LogSink) {
    let mut app = AppService::new(ArbiterConfig::default());
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();
    app.start(&mut hw, &mut sink);
    hw.clear();
    sink.events.clear();
    (app, hw, sink)
}

fn idle(app: &mut AppService, now: u64, hw: &mut MockHardware, sink: &mut LogSink) {
    app.run_cycle(None, false, now, hw, sink);
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn start_parks_actuator_at_neutral() {
    let mut app = AppService::new(ArbiterConfig::default());
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();
    app.start(&mut hw, &mut sink);

    assert_eq!(hw.calls, vec![ActuatorCall::Neutral]);
    assert_eq!(
        sink.causes(),
        vec![(ActuatorState::Neutral, ActuationCause::Startup)]
    );
    assert!(matches!(sink.events.last(), Some(AppEvent::Started)));
}

// ── Idempotence of REVERSE / STOP ─────────────────────────────

#[test]
fn repeated_reverse_ends_in_reverse() {
    let (mut app, mut hw, mut sink) = make_app();
    for i in 0..5 {
        app.run_cycle(Some(CommandToken::Reverse), false, T0 + i, &mut hw, &mut sink);
    }
    assert_eq!(hw.last_call(), Some(ActuatorCall::Reverse));
    assert!(hw.calls.iter().all(|c| *c == ActuatorCall::Reverse));
    assert_eq!(app.arbiter().pending_len(), 0);
}

#[test]
fn repeated_stop_ends_in_neutral() {
    let (mut app, mut hw, mut sink) = make_app();
    for i in 0..5 {
        app.run_cycle(Some(CommandToken::Stop), false, T0 + i, &mut hw, &mut sink);
    }
    assert_eq!(hw.last_call(), Some(ActuatorCall::Neutral));
    assert_eq!(hw.calls.len(), 5);
}

// ── Interlock consumption ─────────────────────────────────────

#[test]
fn interlock_skips_exactly_one_sensor_evaluation() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.pressure = 10;

    app.run_cycle(Some(CommandToken::Reverse), false, T0, &mut hw, &mut sink);
    assert_eq!(hw.calls, vec![ActuatorCall::Reverse]);
    assert_eq!(hw.reads, 0, "sensor must not be read under interlock");
    assert!(!app.arbiter().interlock_set());

    idle(&mut app, T0 + 1, &mut hw, &mut sink);
    assert_eq!(hw.calls, vec![ActuatorCall::Reverse, ActuatorCall::Forward]);
    assert_eq!(hw.reads, 1);
}

#[test]
fn stop_also_sets_the_interlock() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.pressure = 4_000;

    app.run_cycle(Some(CommandToken::Stop), false, T0, &mut hw, &mut sink);
    assert_eq!(hw.calls, vec![ActuatorCall::Neutral]);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::SensorSuppressed { .. })),
        1
    );
}

#[test]
fn pressure_at_threshold_does_not_drive_forward() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.pressure = 5;
    idle(&mut app, T0, &mut hw, &mut sink);
    assert!(hw.calls.is_empty());

    hw.pressure = 6;
    idle(&mut app, T0 + 1, &mut hw, &mut sink);
    assert_eq!(hw.calls, vec![ActuatorCall::Forward]);
    assert_eq!(app.arbiter().last_pressure(), 6);
}

// ── Confirmation vs. grace period ─────────────────────────────

#[test]
fn confirmation_short_circuits_the_grace_period() {
    let (mut app, mut hw, mut sink) = make_app();

    app.run_cycle(Some(CommandToken::Go), false, T0, &mut hw, &mut sink);
    assert!(hw.calls.is_empty(), "GO alone never moves the actuator");
    assert!(app.arbiter().wait_active());

    app.run_cycle(None, true, T0 + 5_000, &mut hw, &mut sink);
    assert_eq!(hw.calls, vec![ActuatorCall::Forward]);
    assert!(!app.arbiter().wait_active());
    assert!(!app.arbiter().confirmation_latched());

    idle(&mut app, T0 + GRACE, &mut hw, &mut sink);
    assert_eq!(hw.forward_count(), 1);
    assert_eq!(
        sink.causes(),
        vec![(ActuatorState::Forward, ActuationCause::Confirmed)]
    );
}

#[test]
fn grace_period_falls_back_to_forward_once() {
    let (mut app, mut hw, mut sink) = make_app();

    app.run_cycle(Some(CommandToken::Go), false, T0, &mut hw, &mut sink);
    idle(&mut app, T0 + GRACE - 1, &mut hw, &mut sink);
    assert!(hw.calls.is_empty());

    idle(&mut app, T0 + GRACE, &mut hw, &mut sink);
    assert_eq!(hw.calls, vec![ActuatorCall::Forward]);
    assert!(!app.arbiter().wait_active());

    idle(&mut app, T0 + 2 * GRACE, &mut hw, &mut sink);
    assert_eq!(hw.forward_count(), 1);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::GraceExpired { waited_ms } if *waited_ms == GRACE)),
        1
    );
}

#[test]
fn confirmation_without_wait_stays_latched_for_the_next_go() {
    let (mut app, mut hw, mut sink) = make_app();

    app.run_cycle(None, true, T0, &mut hw, &mut sink);
    assert!(hw.calls.is_empty());
    assert!(app.arbiter().confirmation_latched());

    app.run_cycle(Some(CommandToken::Go), false, T0 + 1, &mut hw, &mut sink);
    assert_eq!(hw.calls, vec![ActuatorCall::Forward]);
    assert!(!app.arbiter().wait_active());
    assert!(!app.arbiter().confirmation_latched());
}

// ── Cancellation ──────────────────────────────────────────────

#[test]
fn reverse_cancels_a_pending_go() {
    let (mut app, mut hw, mut sink) = make_app();

    app.run_cycle(Some(CommandToken::Go), false, T0, &mut hw, &mut sink);
    app.run_cycle(Some(CommandToken::Reverse), false, T0 + 3_000, &mut hw, &mut sink);

    assert_eq!(app.arbiter().pending_len(), 0);
    assert!(!app.arbiter().wait_active());
    assert_eq!(hw.last_call(), Some(ActuatorCall::Reverse));

    idle(&mut app, T0 + GRACE, &mut hw, &mut sink);
    assert_eq!(hw.forward_count(), 0);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::GoCancelled { remaining: 0 })),
        1
    );
}

#[test]
fn reverse_removes_only_one_of_several_gos() {
    let (mut app, mut hw, mut sink) = make_app();

    app.run_cycle(Some(CommandToken::Go), false, T0, &mut hw, &mut sink);
    app.run_cycle(Some(CommandToken::Go), false, T0 + 1_000, &mut hw, &mut sink);
    assert_eq!(app.arbiter().pending_len(), 2);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::WaitArmed { .. })),
        1,
        "second GO must not restart the timer"
    );

    app.run_cycle(Some(CommandToken::Reverse), false, T0 + 2_000, &mut hw, &mut sink);
    assert_eq!(app.arbiter().pending_len(), 1);
    assert!(app.arbiter().wait_active());
    assert_eq!(app.arbiter().wait_elapsed(T0 + 2_000), Some(2_000));

    // Deadline still counts from the first GO.
    idle(&mut app, T0 + GRACE - 1, &mut hw, &mut sink);
    assert_eq!(hw.forward_count(), 0);
    idle(&mut app, T0 + GRACE, &mut hw, &mut sink);
    assert_eq!(hw.forward_count(), 1);
}

#[test]
fn forty_gos_need_forty_reverses() {
    let (mut app, mut hw, mut sink) = make_app();

    for t in 0..40 {
        app.run_cycle(Some(CommandToken::Go), false, t, &mut hw, &mut sink);
    }
    for t in 40..72 {
        app.run_cycle(Some(CommandToken::Reverse), false, t, &mut hw, &mut sink);
    }
    assert_eq!(app.arbiter().pending_len(), 8);
    assert!(app.arbiter().wait_active());

    idle(&mut app, GRACE, &mut hw, &mut sink);
    assert_eq!(hw.last_call(), Some(ActuatorCall::Forward));
    assert_eq!(hw.forward_count(), 1);
}

#[test]
fn stop_leaves_the_wait_running() {
    let (mut app, mut hw, mut sink) = make_app();

    app.run_cycle(Some(CommandToken::Go), false, T0, &mut hw, &mut sink);
    app.run_cycle(Some(CommandToken::Stop), false, T0 + 1, &mut hw, &mut sink);
    assert_eq!(app.arbiter().pending_len(), 1);
    assert!(app.arbiter().wait_active());

    idle(&mut app, T0 + GRACE, &mut hw, &mut sink);
    assert_eq!(hw.last_call(), Some(ActuatorCall::Forward));
}

// ── Telemetry ─────────────────────────────────────────────────

#[test]
fn telemetry_snapshot_serialises() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.pressure = 3;
    app.run_cycle(Some(CommandToken::Go), false, T0, &mut hw, &mut sink);

    let t = app.build_telemetry(T0 + 250);
    assert_eq!(t.cycles, 1);
    assert_eq!(t.pending_go, 1);
    assert_eq!(t.wait_elapsed_ms, Some(250));
    assert_eq!(t.last_pressure, 3);

    let json = serde_json::to_string(&t).unwrap();
    assert!(json.contains("\"pending_go\":1"), "{json}");
    assert!(json.contains("\"wait_active\":true"), "{json}");
}
