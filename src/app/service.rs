//! Application service, the hexagonal core.
//!
//! [`AppService`] owns the [`Arbiter`] and the live configuration, and runs
//! one control cycle at a time. All I/O flows through port traits injected
//! at call sites, so the whole service runs against mock adapters on the
//! host.
//!
//! ```text
//!  CommandSlot ─────┐
//!  ConfirmationFlag ┼▶ ┌──────────────────┐ ──▶ EventSink
//!  ClockPort ───────┘  │    AppService    │
//!  SensorPort ───────▶ │     Arbiter      │ ──▶ ActuatorPort
//!                      └──────────────────┘
//! ```

use log::info;

use crate::arbiter::Arbiter;
use crate::config::ArbiterConfig;
use crate::handoff::{CommandSlot, ConfirmationFlag};

use super::commands::CommandToken;
use super::events::{ActuationCause, AppEvent, TelemetryData};
use super::ports::{ActuatorPort, ActuatorState, ClockPort, EventSink, SensorPort};

/// The application service orchestrates the arbitration core.
pub struct AppService {
    arbiter: Arbiter,
    config: ArbiterConfig,
    cycles: u64,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** touch the actuator; call [`start`](Self::start) next.
    pub fn new(config: ArbiterConfig) -> Self {
        Self {
            arbiter: Arbiter::new(&config),
            config,
            cycles: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Park the actuator at neutral. Call once after the servo is attached.
    pub fn start(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        hw.hold_neutral();
        sink.emit(&AppEvent::Actuated {
            state: ActuatorState::Neutral,
            cause: ActuationCause::Startup,
        });
        sink.emit(&AppEvent::Started);
        info!(
            "AppService started (grace={} ms, threshold={})",
            self.config.grace_period_ms, self.config.pressure_threshold
        );
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one control cycle: serial command → confirmation → timeout → gate.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`ActuatorPort`], which avoids a double mutable borrow while
    /// keeping the port boundary explicit.
    pub fn run_cycle(
        &mut self,
        command: Option<CommandToken>,
        confirmation: bool,
        now_ms: u64,
        hw: &mut (impl SensorPort + ActuatorPort),
        sink: &mut impl EventSink,
    ) {
        self.cycles += 1;

        if let Some(token) = command {
            self.arbiter.process_serial_command(token, now_ms, hw, sink);
        }
        self.arbiter.process_wireless_confirmation(confirmation);
        self.arbiter.tick(now_ms, hw, sink);
    }

    /// Drain the handoff cells and run one cycle at the clock's current time.
    pub fn poll_cycle(
        &mut self,
        commands: &CommandSlot,
        confirmations: &ConfirmationFlag,
        clock: &impl ClockPort,
        hw: &mut (impl SensorPort + ActuatorPort),
        sink: &mut impl EventSink,
    ) {
        let command = commands.take();
        let confirmation = confirmations.take();
        self.run_cycle(command, confirmation, clock.now_ms(), hw, sink);
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a telemetry snapshot from the arbiter state.
    pub fn build_telemetry(&self, now_ms: u64) -> TelemetryData {
        TelemetryData {
            cycles: self.cycles,
            pending_go: self.arbiter.pending_len(),
            wait_active: self.arbiter.wait_active(),
            wait_elapsed_ms: self.arbiter.wait_elapsed(now_ms),
            interlock: self.arbiter.interlock_set(),
            confirmation_latched: self.arbiter.confirmation_latched(),
            last_pressure: self.arbiter.last_pressure(),
        }
    }

    pub fn arbiter(&self) -> &Arbiter {
        &self.arbiter
    }

    /// Control cycles executed since startup.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }
}
