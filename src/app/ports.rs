//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Arbiter / AppService (domain)
//! ```
//!
//! Driven adapters (servo, FSR, clock, event sinks) implement these traits.
//! The [`AppService`](super::service::AppService) and the
//! [`Arbiter`](crate::arbiter::Arbiter) consume them via generics, so the
//! domain core never touches hardware directly.

use super::events::AppEvent;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this once per cycle.
pub trait SensorPort {
    /// One pressure sample (raw ADC count).
    fn read_pressure(&mut self) -> u16;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// The three calibrated positions of the single actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorState {
    Forward,
    Neutral,
    Reverse,
}

/// Write-side port. Every call is unconditional and immediate; later calls
/// overwrite earlier ones. Implementations must tolerate redundant calls.
pub trait ActuatorPort {
    fn drive_forward(&mut self);

    fn drive_reverse(&mut self);

    fn hold_neutral(&mut self);

    /// Dispatch on a position value.
    fn apply(&mut self, state: ActuatorState) {
        match state {
            ActuatorState::Forward => self.drive_forward(),
            ActuatorState::Neutral => self.hold_neutral(),
            ActuatorState::Reverse => self.drive_reverse(),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic time source. Never goes backwards; never wraps in practice.
pub trait ClockPort {
    /// Milliseconds since boot.
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port.
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Serial port (driving adapter: voice module → link)
// ───────────────────────────────────────────────────────────────

/// Non-blocking byte source.
pub trait SerialPort {
    /// Take at most one buffered byte. `None` when nothing is pending.
    fn read_byte(&mut self) -> Option<u8>;
}

// ───────────────────────────────────────────────────────────────
// Link callbacks (serial + BLE transports)
// ───────────────────────────────────────────────────────────────

/// Capability set a transport exposes to its driver context.
///
/// Implementations only write into handoff fields
/// ([`CommandSlot`](crate::handoff::CommandSlot),
/// [`ConfirmationFlag`](crate::handoff::ConfirmationFlag)); they never
/// reach into arbiter state. Every method defaults to a no-op so a
/// transport implements only what it can observe.
pub trait LinkHandler {
    /// A peer connected.
    fn on_connect(&mut self) {}

    /// The peer went away.
    fn on_disconnect(&mut self) {}

    /// Raw bytes arrived on the link.
    fn on_command_received(&mut self, _payload: &[u8]) {}

    /// A confirmation was recognised on the link.
    fn on_confirmation_received(&mut self) {}
}
