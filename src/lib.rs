//! Servo arbiter firmware library.
//!
//! Arbitrates a single servo between serial voice commands, BLE
//! confirmations, and a force-sensitive resistor. Exposes the pure-logic
//! modules for integration testing. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod arbiter;
pub mod config;
pub mod error;
pub mod handoff;
pub mod pins;

pub mod adapters;
pub mod drivers;
pub mod sensors;
