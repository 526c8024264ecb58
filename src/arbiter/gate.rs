//! Pressure sensor gate. Stateless: one read, one comparison.

use crate::app::ports::SensorPort;

/// Sample the sensor once.
pub fn read(sensor: &mut impl SensorPort) -> u16 {
    sensor.read_pressure()
}

/// Strictly greater than: a reading equal to the threshold does not fire.
pub const fn propose_forward(value: u16, threshold: u16) -> bool {
    value > threshold
}
