//! Hardware adapter. Bridges real peripherals to domain port traits.
//!
//! Owns the FSR driver and the servo, exposing them through [`SensorPort`]
//! and [`ActuatorPort`]. This is the only module in the system that touches
//! actual hardware. On non-espidf targets, the underlying drivers use
//! cfg-gated simulation stubs.

use embedded_hal::pwm::SetDutyCycle;

use crate::app::ports::{ActuatorPort, ActuatorState, SensorPort};
use crate::drivers::hw_init::LedcChannel;
use crate::drivers::servo::ServoDriver;
use crate::sensors::pressure::PressureSensor;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<P = LedcChannel> {
    pressure: PressureSensor,
    servo: ServoDriver<P>,
}

impl<P: SetDutyCycle> HardwareAdapter<P> {
    pub fn new(pressure: PressureSensor, servo: ServoDriver<P>) -> Self {
        Self { pressure, servo }
    }

    /// Last position written to the servo.
    pub fn commanded(&self) -> Option<ActuatorState> {
        self.servo.commanded()
    }

    pub fn servo(&self) -> &ServoDriver<P> {
        &self.servo
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<P: SetDutyCycle> SensorPort for HardwareAdapter<P> {
    fn read_pressure(&mut self) -> u16 {
        self.pressure.read()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<P: SetDutyCycle> ActuatorPort for HardwareAdapter<P> {
    fn drive_forward(&mut self) {
        self.servo.command(ActuatorState::Forward);
    }

    fn drive_reverse(&mut self) {
        self.servo.command(ActuatorState::Reverse);
    }

    fn hold_neutral(&mut self) {
        self.servo.command(ActuatorState::Neutral);
    }
}
