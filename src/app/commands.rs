//! Inbound commands to the arbitration core.
//!
//! The voice module sends single ASCII characters over UART; the BLE
//! client confirms a pending GO by writing a payload containing `'g'`.
//! Anything else is ignored by policy, never reported as an error.

/// Serial byte that decodes to [`CommandToken::Go`].
pub const SERIAL_GO: u8 = b'G';
/// Serial byte that decodes to [`CommandToken::Reverse`].
pub const SERIAL_REVERSE: u8 = b'R';
/// Serial byte that decodes to [`CommandToken::Stop`].
pub const SERIAL_STOP: u8 = b'S';
/// BLE payload byte that confirms a pending GO.
pub const CONFIRMATION_BYTE: u8 = b'g';

/// A decoded serial command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CommandToken {
    /// Drive forward once confirmed (or once the grace period lapses).
    Go = SERIAL_GO,
    /// Drive reverse immediately and cancel one pending GO.
    Reverse = SERIAL_REVERSE,
    /// Hold neutral immediately.
    Stop = SERIAL_STOP,
}

impl CommandToken {
    /// Decode one serial byte. Unknown bytes yield `None`.
    pub const fn from_serial_byte(byte: u8) -> Option<Self> {
        match byte {
            SERIAL_GO => Some(Self::Go),
            SERIAL_REVERSE => Some(Self::Reverse),
            SERIAL_STOP => Some(Self::Stop),
            _ => None,
        }
    }

    /// The wire byte for this token.
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    /// REVERSE and STOP pre-empt the pressure gate for one cycle.
    pub const fn sets_interlock(self) -> bool {
        matches!(self, Self::Reverse | Self::Stop)
    }
}

/// Whether a BLE write payload carries a confirmation.
pub fn is_confirmation_payload(payload: &[u8]) -> bool {
    payload.contains(&CONFIRMATION_BYTE)
}
