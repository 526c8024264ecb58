//! Command arbiter. Resolves serial commands, BLE confirmations and the
//! pressure gate into one actuator position per control cycle.
//!
//! ## Cycle order
//!
//! ```text
//! process_serial_command ─▶ process_wireless_confirmation ─▶ tick
//!                                                            ├─ timeout evaluation
//!                                                            └─ pressure gate
//! ```
//!
//! ## Rules
//!
//! - **GO** is pushed onto the pending stack. The first GO that finds no
//!   active wait arms the confirmation timer; later GOs never restart it.
//! - **REVERSE** drives reverse, sets the interlock and cancels the earliest
//!   pending GO. The wait is cleared only once the stack is empty.
//! - **STOP** holds neutral and sets the interlock. Stack and wait untouched.
//! - While a wait is active, a latched confirmation drives forward at once;
//!   otherwise, forward is driven when the grace period runs out. Either way
//!   the wait ends.
//! - The pressure gate fires forward when the reading exceeds the threshold,
//!   except on the cycle right after a REVERSE/STOP, where the interlock
//!   swallows the evaluation and is consumed.
//!
//! The arbiter never reads the actuator back. Every step is non-blocking.

pub mod gate;
pub mod pending;
pub mod timer;

use log::{debug, info, warn};

use crate::app::commands::CommandToken;
use crate::app::events::{ActuationCause, AppEvent};
use crate::app::ports::{ActuatorPort, ActuatorState, EventSink, SensorPort};
use crate::config::ArbiterConfig;

use pending::PendingStack;
use timer::ConfirmationTimer;

pub struct Arbiter {
    pending: PendingStack,
    wait: ConfirmationTimer,
    /// Set by REVERSE/STOP, consumed by the next pressure evaluation.
    interlock: bool,
    /// Latched BLE confirmation, consumed by an active wait.
    confirmation: bool,
    grace_ms: u64,
    threshold: u16,
    last_pressure: u16,
}

impl Arbiter {
    pub fn new(config: &ArbiterConfig) -> Self {
        Self {
            pending: PendingStack::new(),
            wait: ConfirmationTimer::new(),
            interlock: false,
            confirmation: false,
            grace_ms: u64::from(config.grace_period_ms),
            threshold: config.pressure_threshold,
            last_pressure: 0,
        }
    }

    // ── Inputs ────────────────────────────────────────────────

    /// Apply one decoded serial command.
    pub fn process_serial_command(
        &mut self,
        token: CommandToken,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        sink.emit(&AppEvent::CommandAccepted(token));

        match token {
            CommandToken::Go => {
                info!("Arbiter: GO queued for confirmation");
                self.pending.push(CommandToken::Go);
                if !self.wait.is_active() {
                    self.wait.arm(now_ms);
                    sink.emit(&AppEvent::WaitArmed {
                        pending: self.pending.len(),
                    });
                    if self.confirmation {
                        warn!("Arbiter: confirmation arrived before this GO, skipping grace wait");
                        sink.emit(&AppEvent::EarlyConfirmation);
                    }
                }
            }
            CommandToken::Reverse => {
                self.actuate(hw, sink, ActuatorState::Reverse, ActuationCause::ReverseCommand);

                if self.pending.remove_first(CommandToken::Go) {
                    info!("Arbiter: released one pending GO");
                    sink.emit(&AppEvent::GoCancelled {
                        remaining: self.pending.len(),
                    });
                }
                if self.pending.is_empty() {
                    self.wait.disarm();
                }
            }
            CommandToken::Stop => {
                self.actuate(hw, sink, ActuatorState::Neutral, ActuationCause::StopCommand);
            }
        }

        if token.sets_interlock() {
            self.interlock = true;
        }
    }

    /// Record a BLE confirmation, if one arrived. Consumed by [`tick`](Self::tick).
    pub fn process_wireless_confirmation(&mut self, received: bool) {
        if received {
            debug!("Arbiter: confirmation latched");
            self.confirmation = true;
        }
    }

    /// Run timeout evaluation, then the pressure gate.
    pub fn tick(
        &mut self,
        now_ms: u64,
        hw: &mut (impl SensorPort + ActuatorPort),
        sink: &mut impl EventSink,
    ) {
        self.evaluate_wait(now_ms, hw, sink);
        self.evaluate_pressure(hw, sink);
    }

    // ── Queries ───────────────────────────────────────────────

    /// Number of GOs still awaiting cancellation.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn wait_active(&self) -> bool {
        self.wait.is_active()
    }

    pub fn wait_elapsed(&self, now_ms: u64) -> Option<u64> {
        self.wait.elapsed(now_ms)
    }

    pub fn interlock_set(&self) -> bool {
        self.interlock
    }

    pub fn confirmation_latched(&self) -> bool {
        self.confirmation
    }

    /// Most recent pressure sample (0 until the gate first runs).
    pub fn last_pressure(&self) -> u16 {
        self.last_pressure
    }

    pub fn grace_ms(&self) -> u64 {
        self.grace_ms
    }

    // ── Internal ──────────────────────────────────────────────

    fn evaluate_wait(&mut self, now_ms: u64, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        let Some(waited_ms) = self.wait.elapsed(now_ms) else {
            return;
        };

        if self.confirmation {
            self.actuate(hw, sink, ActuatorState::Forward, ActuationCause::Confirmed);
            self.wait.disarm();
            self.confirmation = false;
        } else if self.wait.expired(now_ms, self.grace_ms) {
            info!("Arbiter: {} ms passed without confirmation", waited_ms);
            sink.emit(&AppEvent::GraceExpired { waited_ms });
            self.actuate(hw, sink, ActuatorState::Forward, ActuationCause::GraceExpired);
            self.wait.disarm();
        }
    }

    fn evaluate_pressure(
        &mut self,
        hw: &mut (impl SensorPort + ActuatorPort),
        sink: &mut impl EventSink,
    ) {
        if self.interlock {
            self.interlock = false;
            debug!("Arbiter: command interlock, skipping pressure check");
            sink.emit(&AppEvent::SensorSuppressed {
                reading: self.last_pressure,
            });
            return;
        }

        let reading = gate::read(hw);
        self.last_pressure = reading;
        if gate::propose_forward(reading, self.threshold) {
            self.actuate(hw, sink, ActuatorState::Forward, ActuationCause::Pressure);
        }
    }

    fn actuate(
        &self,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
        state: ActuatorState,
        cause: ActuationCause,
    ) {
        debug!("Arbiter: {:?} ({:?})", state, cause);
        hw.apply(state);
        sink.emit(&AppEvent::Actuated { state, cause });
    }
}
