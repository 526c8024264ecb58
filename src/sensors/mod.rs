//! Sensor drivers. Only the FSR feeds the arbiter.

pub mod pressure;
