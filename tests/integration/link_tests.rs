//! End-to-end tests from link adapters through the handoff cells into
//! the control loop.

use crate::mock_hw::{ActuatorCall, LogSink, ManualClock, MockHardware};

use servo_arbiter::adapters::ble::{BleLink, BleState};
use servo_arbiter::adapters::serial::{SerialLink, SimSerial};
use servo_arbiter::app::ports::LinkHandler;
use servo_arbiter::app::service::AppService;
use servo_arbiter::config::ArbiterConfig;
use servo_arbiter::handoff::{CommandSlot, ConfirmationFlag};

struct Rig {
    app: AppService,
    hw: MockHardware,
    sink: LogSink,
    clock: ManualClock,
    port: SimSerial,
}

impl Rig {
    fn new() -> Self {
        let mut rig = Self {
            app: AppService::new(ArbiterConfig::default()),
            hw: MockHardware::new(),
            sink: LogSink::new(),
            clock: ManualClock::at(1_000),
            port: SimSerial::new(),
        };
        rig.app.start(&mut rig.hw, &mut rig.sink);
        rig.hw.clear();
        rig
    }

    /// One main-loop iteration.
    fn step(&mut self, serial: &mut SerialLink<'_>, slot: &CommandSlot, flag: &ConfirmationFlag) {
        serial.poll(&mut self.port);
        self.app
            .poll_cycle(slot, flag, &self.clock, &mut self.hw, &mut self.sink);
        self.clock.advance(1);
    }
}

fn device_name() -> heapless::String<24> {
    heapless::String::try_from("ESP32_Motor_Control").unwrap()
}

#[test]
fn unknown_serial_bytes_change_nothing() {
    let slot = CommandSlot::new();
    let flag = ConfirmationFlag::new();
    let mut serial = SerialLink::new(&slot);
    let mut rig = Rig::new();

    rig.port.inject(b"xg\n?");
    for _ in 0..4 {
        rig.step(&mut serial, &slot, &flag);
    }

    assert!(rig.hw.calls.is_empty());
    assert_eq!(rig.app.arbiter().pending_len(), 0);
    assert!(!rig.app.arbiter().wait_active());
    assert!(!rig.app.arbiter().interlock_set());
    assert_eq!(serial.ignored(), 4);
}

#[test]
fn buffered_bytes_are_decoded_one_per_iteration() {
    let slot = CommandSlot::new();
    let flag = ConfirmationFlag::new();
    let mut serial = SerialLink::new(&slot);
    let mut rig = Rig::new();

    rig.port.inject(b"GGR");
    rig.step(&mut serial, &slot, &flag);
    assert_eq!(rig.app.arbiter().pending_len(), 1);
    rig.step(&mut serial, &slot, &flag);
    assert_eq!(rig.app.arbiter().pending_len(), 2);
    rig.step(&mut serial, &slot, &flag);
    assert_eq!(rig.app.arbiter().pending_len(), 1);
    assert_eq!(rig.hw.calls, vec![ActuatorCall::Reverse]);
}

#[test]
fn ble_write_confirms_a_serial_go() {
    let slot = CommandSlot::new();
    let flag = ConfirmationFlag::new();
    let mut serial = SerialLink::new(&slot);
    let mut ble = BleLink::new(device_name(), &flag);
    let mut rig = Rig::new();

    ble.start().unwrap();
    ble.on_connect();
    assert_eq!(ble.state(), BleState::Connected);

    rig.port.inject(b"G");
    rig.step(&mut serial, &slot, &flag);
    assert!(rig.app.arbiter().wait_active());

    rig.clock.advance(4_000);
    ble.on_command_received(b"g");
    rig.step(&mut serial, &slot, &flag);

    assert_eq!(rig.hw.calls, vec![ActuatorCall::Forward]);
    assert!(!rig.app.arbiter().wait_active());
    assert!(!flag.is_raised(), "flag is drained by the cycle");
}

#[test]
fn ble_disconnect_falls_back_to_grace_period() {
    let slot = CommandSlot::new();
    let flag = ConfirmationFlag::new();
    let mut serial = SerialLink::new(&slot);
    let mut ble = BleLink::new(device_name(), &flag);
    let mut rig = Rig::new();

    ble.start().unwrap();
    ble.on_connect();
    rig.port.inject(b"G");
    rig.step(&mut serial, &slot, &flag);

    ble.on_disconnect();
    assert_eq!(ble.state(), BleState::Advertising);

    rig.clock.advance(15_000);
    rig.step(&mut serial, &slot, &flag);
    assert_eq!(rig.hw.calls, vec![ActuatorCall::Forward]);
}
