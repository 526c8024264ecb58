//! Force-sensitive resistor (FSR) driver.
//!
//! Reads the FSR voltage divider through an ADC1 channel and reports the raw
//! 12-bit count. The gate threshold is expressed in the same raw units, so no
//! calibration curve is applied.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1 via the oneshot API (initialised by hw_init).
//! On host/test: reads from a static `AtomicU16` for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, Ordering};

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

#[cfg(not(target_os = "espidf"))]
static SIM_FSR_ADC: AtomicU16 = AtomicU16::new(0);

/// Inject the next raw reading on host builds.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_fsr_adc(raw: u16) {
    SIM_FSR_ADC.store(raw, Ordering::Relaxed);
}

/// Full-scale value of the 12-bit converter.
pub const ADC_MAX: u16 = 4095;

pub struct PressureSensor {
    adc_channel: u32,
    last_raw: u16,
    total_reads: u32,
}

impl PressureSensor {
    pub fn new(adc_channel: u32) -> Self {
        Self {
            adc_channel,
            last_raw: 0,
            total_reads: 0,
        }
    }

    pub fn read(&mut self) -> u16 {
        self.total_reads = self.total_reads.saturating_add(1);
        let raw = self.read_adc().min(ADC_MAX);
        self.last_raw = raw;
        raw
    }

    pub fn last_raw(&self) -> u16 {
        self.last_raw
    }

    pub fn total_reads(&self) -> u32 {
        self.total_reads
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> u16 {
        hw_init::adc1_read(self.adc_channel)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> u16 {
        let _ = self.adc_channel;
        SIM_FSR_ADC.load(Ordering::Relaxed)
    }
}
