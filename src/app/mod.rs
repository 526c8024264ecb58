//! Application core: pure domain logic, zero I/O.
//!
//! Command vocabulary, outbound events, the port traits, and the
//! [`AppService`](service::AppService) that sequences one control cycle.
//! All interaction with hardware happens through the traits in [`ports`],
//! keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
