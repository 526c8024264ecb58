//! System configuration parameters
//!
//! All tunable parameters for the servo arbiter. Values are compiled-in
//! defaults; nothing is persisted, so every boot starts from `Default`.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbiterConfig {
    // --- Confirmation ---
    /// How long a GO waits for a BLE confirmation before driving forward anyway (ms)
    pub grace_period_ms: u32,

    // --- Pressure gate ---
    /// Raw ADC count above which the FSR proposes forward
    pub pressure_threshold: u16,

    // --- Servo ---
    /// Calibrated angle for FORWARD (degrees)
    pub forward_angle_deg: u8,
    /// Calibrated angle for NEUTRAL (degrees)
    pub neutral_angle_deg: u8,
    /// Calibrated angle for REVERSE (degrees)
    pub reverse_angle_deg: u8,
    /// Pulse width at 0 degrees (microseconds)
    pub servo_min_pulse_us: u16,
    /// Pulse width at 180 degrees (microseconds)
    pub servo_max_pulse_us: u16,

    // --- Links ---
    /// BLE advertised device name
    pub ble_device_name: heapless::String<24>,
    /// UART baud rate for the voice module
    pub uart_baud: u32,

    // --- Timing ---
    /// Cooperative yield between control-loop iterations (milliseconds)
    pub loop_yield_ms: u32,
    /// Telemetry report interval (seconds)
    pub telemetry_interval_secs: u32,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        let mut ble_device_name = heapless::String::new();
        let _ = ble_device_name.push_str("ESP32_Motor_Control");

        Self {
            // Confirmation
            grace_period_ms: 15_000,

            // Pressure gate
            pressure_threshold: 5,

            // Servo
            forward_angle_deg: 60,
            neutral_angle_deg: 90,
            reverse_angle_deg: 120,
            servo_min_pulse_us: 544,
            servo_max_pulse_us: 2400,

            // Links
            ble_device_name,
            uart_baud: 115_200,

            // Timing
            loop_yield_ms: 1,
            telemetry_interval_secs: 60,
        }
    }
}

impl ArbiterConfig {
    /// Range-check every field. Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grace_period_ms == 0 {
            return Err(ConfigError::ValidationFailed("grace_period_ms must be > 0"));
        }
        let angles = [
            self.forward_angle_deg,
            self.neutral_angle_deg,
            self.reverse_angle_deg,
        ];
        if angles.iter().any(|&a| a > 180) {
            return Err(ConfigError::ValidationFailed("servo angles must be 0-180"));
        }
        if self.forward_angle_deg == self.neutral_angle_deg
            || self.reverse_angle_deg == self.neutral_angle_deg
            || self.forward_angle_deg == self.reverse_angle_deg
        {
            return Err(ConfigError::ValidationFailed("servo positions must be distinct"));
        }
        if self.servo_min_pulse_us >= self.servo_max_pulse_us {
            return Err(ConfigError::ValidationFailed("servo pulse range inverted"));
        }
        // One 50 Hz period is 20 000 us.
        if self.servo_max_pulse_us > 20_000 {
            return Err(ConfigError::ValidationFailed("servo pulse exceeds PWM period"));
        }
        if self.ble_device_name.is_empty() {
            return Err(ConfigError::ValidationFailed("ble_device_name empty"));
        }
        if self.uart_baud == 0 {
            return Err(ConfigError::ValidationFailed("uart_baud must be > 0"));
        }
        Ok(())
    }
}

/// Errors from configuration validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}
