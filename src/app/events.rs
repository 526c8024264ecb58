//! Outbound application events.
//!
//! The arbiter and [`AppService`](super::service::AppService) emit these
//! through the [`EventSink`](super::ports::EventSink) port. Adapters on the
//! other side decide what to do with them (serial log, BLE notify, ...).

use serde::Serialize;

use super::commands::CommandToken;
use super::ports::ActuatorState;

/// Why the arbiter moved the actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActuationCause {
    /// Serial REVERSE.
    ReverseCommand,
    /// Serial STOP.
    StopCommand,
    /// BLE confirmation of a pending GO.
    Confirmed,
    /// Grace period ran out without a confirmation.
    GraceExpired,
    /// Pressure sensor above threshold.
    Pressure,
    /// Boot-time neutral.
    Startup,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The service has started and parked the actuator.
    Started,

    /// A serial command was accepted by the arbiter.
    CommandAccepted(CommandToken),

    /// A GO armed the confirmation wait.
    WaitArmed { pending: usize },

    /// A REVERSE cancelled one pending GO.
    GoCancelled { remaining: usize },

    /// A GO armed the wait while a confirmation was already latched, so it
    /// proceeds without a grace wait.
    EarlyConfirmation,

    /// The actuator was commanded.
    Actuated {
        state: ActuatorState,
        cause: ActuationCause,
    },

    /// The grace period lapsed with no confirmation. Informational only:
    /// the arbiter proceeds to FORWARD.
    GraceExpired { waited_ms: u64 },

    /// The interlock swallowed this cycle's pressure evaluation.
    SensorSuppressed { reading: u16 },

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone, Serialize)]
pub struct TelemetryData {
    pub cycles: u64,
    pub pending_go: usize,
    pub wait_active: bool,
    pub wait_elapsed_ms: Option<u64>,
    pub interlock: bool,
    pub confirmation_latched: bool,
    pub last_pressure: u16,
}
