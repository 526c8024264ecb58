//! Serial command link.
//!
//! The voice-recognition module writes single ASCII bytes (`G`, `R`, `S`)
//! to UART0. [`SerialLink::poll`] pulls at most one byte per main-loop
//! iteration, decodes it, and publishes the token into the shared
//! [`CommandSlot`]. Bytes outside the command alphabet are dropped.
//!
//! The byte source is abstracted by [`SerialPort`]: [`UartPort`] on the
//! device, [`SimSerial`] (an in-memory queue) on host builds.

use heapless::Deque;
use log::{debug, info, warn};

use crate::app::commands::CommandToken;
use crate::app::ports::{LinkHandler, SerialPort};
use crate::handoff::CommandSlot;

/// Capacity of the host-side byte queue.
pub const SIM_RX_CAPACITY: usize = 64;

/// Decodes serial bytes and hands tokens to the control loop.
pub struct SerialLink<'a> {
    slot: &'a CommandSlot,
    accepted: u32,
    ignored: u32,
}

impl<'a> SerialLink<'a> {
    pub fn new(slot: &'a CommandSlot) -> Self {
        Self {
            slot,
            accepted: 0,
            ignored: 0,
        }
    }

    /// Read at most one byte from `port` and dispatch it.
    ///
    /// Returns the token published this call, if any.
    pub fn poll(&mut self, port: &mut impl SerialPort) -> Option<CommandToken> {
        let byte = port.read_byte()?;
        let before = self.accepted;
        self.on_command_received(&[byte]);
        if self.accepted != before {
            CommandToken::from_serial_byte(byte)
        } else {
            None
        }
    }

    pub fn accepted(&self) -> u32 {
        self.accepted
    }

    pub fn ignored(&self) -> u32 {
        self.ignored
    }
}

impl LinkHandler for SerialLink<'_> {
    fn on_connect(&mut self) {
        info!("serial: voice link up");
    }

    fn on_command_received(&mut self, payload: &[u8]) {
        let Some(&byte) = payload.first() else {
            return;
        };
        match CommandToken::from_serial_byte(byte) {
            Some(token) => {
                if let Some(lost) = self.slot.publish(token) {
                    warn!("serial: {:?} overwritten by {:?} before dispatch", lost, token);
                }
                self.accepted = self.accepted.wrapping_add(1);
            }
            None => {
                debug!("serial: ignoring byte 0x{:02x}", byte);
                self.ignored = self.ignored.wrapping_add(1);
            }
        }
    }
}

// ── Byte sources ──────────────────────────────────────────────

/// UART0 receiver installed by `hw_init::init_peripherals`.
#[cfg(target_os = "espidf")]
pub struct UartPort;

#[cfg(target_os = "espidf")]
impl SerialPort for UartPort {
    fn read_byte(&mut self) -> Option<u8> {
        crate::drivers::hw_init::uart_read_byte()
    }
}

/// In-memory byte queue standing in for the UART on host builds.
#[derive(Default)]
pub struct SimSerial {
    rx: Deque<u8, SIM_RX_CAPACITY>,
}

impl SimSerial {
    pub fn new() -> Self {
        Self { rx: Deque::new() }
    }

    /// Queue bytes as if they had arrived on the wire. Bytes beyond the
    /// queue capacity are dropped, like an overrun RX FIFO.
    pub fn inject(&mut self, bytes: &[u8]) -> usize {
        let mut queued = 0;
        for &b in bytes {
            if self.rx.push_back(b).is_err() {
                warn!("serial(sim): RX overrun, {} byte(s) dropped", bytes.len() - queued);
                break;
            }
            queued += 1;
        }
        queued
    }

    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

impl SerialPort for SimSerial {
    fn read_byte(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }
}
