//! Servo Arbiter Firmware: Main Entry Point
//!
//! Hexagonal architecture with a single cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  SerialLink        BleLink          HardwareAdapter            │
//! │  (UART0 → slot)    (GATT → flag)    (FSR + servo)              │
//! │  LogEventSink      Esp32TimeAdapter                            │
//! │                                                                │
//! │  ───────── CommandSlot · ConfirmationFlag (handoff) ─────────  │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Arbiter · PendingStack · ConfirmationTimer · Gate     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use log::{error, info, warn};

use servo_arbiter::adapters::ble::BleLink;
use servo_arbiter::adapters::hardware::HardwareAdapter;
use servo_arbiter::adapters::log_sink::LogEventSink;
use servo_arbiter::adapters::serial::{SerialLink, UartPort};
use servo_arbiter::adapters::time::Esp32TimeAdapter;
use servo_arbiter::app::events::AppEvent;
use servo_arbiter::app::ports::{ClockPort, EventSink, LinkHandler};
use servo_arbiter::app::service::AppService;
use servo_arbiter::config::ArbiterConfig;
use servo_arbiter::drivers::hw_init::{self, LedcChannel};
use servo_arbiter::drivers::servo::{ServoCalibration, ServoDriver};
use servo_arbiter::error::Error;
use servo_arbiter::handoff::{CommandSlot, ConfirmationFlag};
use servo_arbiter::pins;
use servo_arbiter::sensors::pressure::PressureSensor;

// ── Handoff cells ─────────────────────────────────────────────
//
// Written by the link adapters, drained once per cycle by AppService.

static COMMANDS: CommandSlot = CommandSlot::new();
static CONFIRMATIONS: ConfirmationFlag = ConfirmationFlag::new();

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Servo Arbiter v{}                ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = ArbiterConfig::default();
    config.validate().map_err(Error::from)?;

    // ── 3. Initialise hardware peripherals ────────────────────
    if let Err(e) = hw_init::init_peripherals(config.uart_baud) {
        error!("HAL init failed: {}, halting", e);
        return Err(Error::from(e).into());
    }

    let mut hw = HardwareAdapter::new(
        PressureSensor::new(pins::FSR_ADC_CHANNEL),
        ServoDriver::new(LedcChannel::servo(), ServoCalibration::from_config(&config)),
    );
    let clock = Esp32TimeAdapter::new();
    let mut log_sink = LogEventSink::new();

    // ── 4. Links ──────────────────────────────────────────────
    let mut uart = UartPort;
    let mut serial = SerialLink::new(&COMMANDS);
    serial.on_connect();

    let mut ble = BleLink::new(config.ble_device_name.clone(), &CONFIRMATIONS);
    if let Err(e) = ble.start() {
        // Serial commands still work; GO falls back to the grace period.
        warn!("BLE unavailable ({}), confirmations disabled", e);
    }

    // ── 5. Application service ────────────────────────────────
    let telemetry_every_ms = u64::from(config.telemetry_interval_secs) * 1_000;
    let yield_ms = config.loop_yield_ms;
    let mut app = AppService::new(config);
    app.start(&mut hw, &mut log_sink);

    info!("System ready. Entering control loop.");

    // ── 6. Control loop ───────────────────────────────────────
    let mut last_telemetry_ms = clock.now_ms();
    loop {
        serial.poll(&mut uart);
        ble.poll();

        app.poll_cycle(&COMMANDS, &CONFIRMATIONS, &clock, &mut hw, &mut log_sink);

        let now_ms = clock.now_ms();
        if telemetry_every_ms > 0 && now_ms.saturating_sub(last_telemetry_ms) >= telemetry_every_ms {
            log_sink.emit(&AppEvent::Telemetry(app.build_telemetry(now_ms)));
            last_telemetry_ms = now_ms;
        }

        std::thread::sleep(std::time::Duration::from_millis(u64::from(yield_ms)));
    }
}
