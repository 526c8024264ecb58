//! Mock hardware adapter for integration tests.
//!
//! Records every actuator call so tests can assert on the full command
//! history without touching real LEDC/ADC registers.

use std::cell::Cell;

use servo_arbiter::app::events::{ActuationCause, AppEvent};
use servo_arbiter::app::ports::{ActuatorPort, ActuatorState, ClockPort, EventSink, SensorPort};

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCall {
    Forward,
    Reverse,
    Neutral,
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub calls: Vec<ActuatorCall>,
    pub pressure: u16,
    pub reads: u32,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            pressure: 0,
            reads: 0,
        }
    }

    pub fn last_call(&self) -> Option<ActuatorCall> {
        self.calls.last().copied()
    }

    pub fn forward_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| **c == ActuatorCall::Forward)
            .count()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl ActuatorPort for MockHardware {
    fn drive_forward(&mut self) {
        self.calls.push(ActuatorCall::Forward);
    }

    fn drive_reverse(&mut self) {
        self.calls.push(ActuatorCall::Reverse);
    }

    fn hold_neutral(&mut self) {
        self.calls.push(ActuatorCall::Neutral);
    }
}

// ── SensorPort for MockHardware ──────────────────────────────

impl SensorPort for MockHardware {
    fn read_pressure(&mut self) -> u16 {
        self.reads += 1;
        self.pressure
    }
}

// ── ManualClock ───────────────────────────────────────────────

pub struct ManualClock {
    now: Cell<u64>,
}

#[allow(dead_code)]
impl ManualClock {
    pub fn at(ms: u64) -> Self {
        Self { now: Cell::new(ms) }
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl ClockPort for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

// ── LogSink ───────────────────────────────────────────────────

pub struct LogSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl LogSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Causes of every `Actuated` event, in order.
    pub fn causes(&self) -> Vec<(ActuatorState, ActuationCause)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::Actuated { state, cause } => Some((*state, *cause)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
