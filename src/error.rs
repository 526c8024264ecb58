//! Unified error types for the servo arbiter firmware.
//!
//! The arbitration core itself is infallible: malformed input is ignored by
//! policy. These types cover the adapter layer (peripheral bring-up, PWM
//! writes, link start-up) so `main` can report failures uniformly.
//! All variants are `Copy`.

use core::fmt;

use crate::config::ConfigError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible adapter operation funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An actuator command failed.
    Actuator(ActuatorError),
    /// A communication link failed.
    Comms(CommsError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl core::error::Error for Error {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// PWM duty-cycle write failed.
    PwmWriteFailed,
    /// Requested angle is outside 0-180 degrees.
    AngleOutOfRange(u8),
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PwmWriteFailed => write!(f, "PWM write failed"),
            Self::AngleOutOfRange(deg) => write!(f, "angle {deg} out of range"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    /// UART driver install or configuration failed (ESP-IDF return code).
    UartInitFailed(i32),
    /// A step of the Bluedroid bring-up failed.
    BleInitFailed(&'static str),
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UartInitFailed(rc) => write!(f, "UART init failed (rc={rc})"),
            Self::BleInitFailed(step) => write!(f, "BLE init failed at {step}"),
        }
    }
}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_subsystem() {
        let e: Error = ActuatorError::PwmWriteFailed.into();
        assert_eq!(e.to_string(), "actuator: PWM write failed");

        let e: Error = CommsError::BleInitFailed("bluedroid_enable").into();
        assert_eq!(e.to_string(), "comms: BLE init failed at bluedroid_enable");
    }

    #[test]
    fn config_error_converts() {
        let e: Error = ConfigError::ValidationFailed("grace_period_ms must be > 0").into();
        assert!(matches!(e, Error::Config(_)));
    }
}
