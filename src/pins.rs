//! GPIO / peripheral pin assignments for the ESP32 actuator board.
//!
//! Single source of truth. Every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Servo (LEDC PWM)
// ---------------------------------------------------------------------------

/// Servo signal line.
pub const SERVO_PWM_GPIO: i32 = 5;
/// Hobby-servo frame rate.
pub const SERVO_PWM_FREQ_HZ: u32 = 50;
/// LEDC timer resolution (bits). 14 bits gives ~1.2 us per step at 50 Hz.
pub const SERVO_PWM_RESOLUTION_BITS: u32 = 14;

// ---------------------------------------------------------------------------
// Force-sensitive resistor (ADC1)
// ---------------------------------------------------------------------------

/// FSR voltage divider output. ADC1 channel 4 on GPIO 32.
pub const FSR_ADC_GPIO: i32 = 32;
/// ADC1 channel number for [`FSR_ADC_GPIO`].
pub const FSR_ADC_CHANNEL: u32 = 4;

// ---------------------------------------------------------------------------
// UART (voice module)
// ---------------------------------------------------------------------------

/// UART port shared with the console; the voice module writes single bytes.
pub const VOICE_UART_PORT: i32 = 0;
pub const UART_TX_GPIO: i32 = 1;
pub const UART_RX_GPIO: i32 = 3;
/// Driver RX ring buffer size (bytes).
pub const UART_RX_BUF_BYTES: i32 = 256;
