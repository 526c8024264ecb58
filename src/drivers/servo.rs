//! Hobby-servo driver.
//!
//! Maps the three actuator positions onto calibrated angles and the angles
//! onto a 50 Hz pulse width. Generic over any
//! `embedded_hal::pwm::SetDutyCycle`, so the same driver runs on the LEDC
//! channel on device and on a recording mock in tests.
//!
//! ## Safety contract
//!
//! The driver is a dumb actuator: every call writes the pulse, redundant or
//! not. There is no position feedback.

use embedded_hal::pwm::SetDutyCycle;
use log::{info, warn};

use crate::app::ports::ActuatorState;
use crate::config::ArbiterConfig;
use crate::error::ActuatorError;
use crate::pins;

/// Length of one PWM frame in microseconds.
const FRAME_US: u32 = 1_000_000 / pins::SERVO_PWM_FREQ_HZ;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServoCalibration {
    pub forward_deg: u8,
    pub neutral_deg: u8,
    pub reverse_deg: u8,
    pub min_pulse_us: u16,
    pub max_pulse_us: u16,
}

impl ServoCalibration {
    pub fn from_config(config: &ArbiterConfig) -> Self {
        Self {
            forward_deg: config.forward_angle_deg,
            neutral_deg: config.neutral_angle_deg,
            reverse_deg: config.reverse_angle_deg,
            min_pulse_us: config.servo_min_pulse_us,
            max_pulse_us: config.servo_max_pulse_us,
        }
    }

    pub fn angle_for(&self, state: ActuatorState) -> u8 {
        match state {
            ActuatorState::Forward => self.forward_deg,
            ActuatorState::Neutral => self.neutral_deg,
            ActuatorState::Reverse => self.reverse_deg,
        }
    }

    /// Pulse width for `deg`, linear between the calibrated end points.
    pub fn pulse_us(&self, deg: u8) -> u32 {
        let span = u32::from(self.max_pulse_us - self.min_pulse_us);
        u32::from(self.min_pulse_us) + span * u32::from(deg) / 180
    }
}

impl Default for ServoCalibration {
    fn default() -> Self {
        Self::from_config(&ArbiterConfig::default())
    }
}

pub struct ServoDriver<P> {
    pwm: P,
    cal: ServoCalibration,
    /// Last commanded position; `None` until the first write.
    commanded: Option<ActuatorState>,
}

impl<P: SetDutyCycle> ServoDriver<P> {
    pub fn new(pwm: P, cal: ServoCalibration) -> Self {
        Self {
            pwm,
            cal,
            commanded: None,
        }
    }

    /// Command one of the calibrated positions.
    pub fn set_position(&mut self, state: ActuatorState) -> Result<(), ActuatorError> {
        let deg = self.cal.angle_for(state);
        self.write_angle(deg)?;
        if self.commanded != Some(state) {
            info!("Servo: {:?} ({} deg)", state, deg);
        }
        self.commanded = Some(state);
        Ok(())
    }

    /// Same as [`set_position`](Self::set_position) but logs instead of
    /// returning the error. The arbiter has no acknowledgment path.
    pub fn command(&mut self, state: ActuatorState) {
        if let Err(e) = self.set_position(state) {
            warn!("Servo: {:?} not applied: {}", state, e);
        }
    }

    pub fn write_angle(&mut self, deg: u8) -> Result<(), ActuatorError> {
        if deg > 180 {
            return Err(ActuatorError::AngleOutOfRange(deg));
        }
        let duty = self.duty_for(deg);
        self.pwm
            .set_duty_cycle(duty)
            .map_err(|_| ActuatorError::PwmWriteFailed)
    }

    fn duty_for(&self, deg: u8) -> u16 {
        let full = u32::from(self.pwm.max_duty_cycle()) + 1;
        let duty = self.cal.pulse_us(deg) * full / FRAME_US;
        duty.min(u32::from(self.pwm.max_duty_cycle())) as u16
    }

    pub fn commanded(&self) -> Option<ActuatorState> {
        self.commanded
    }

    pub fn pwm(&self) -> &P {
        &self.pwm
    }
}
