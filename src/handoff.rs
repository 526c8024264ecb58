//! Single-token handoff cells between collaborator contexts and the
//! control loop.
//!
//! ```text
//! ┌──────────────┐  publish()  ┌─────────────┐  take()  ┌──────────────┐
//! │ UART / BLE   │────────────▶│ CommandSlot │─────────▶│ Control loop │
//! │ driver task  │  raise()    │ Confirm.Flag│          │ (Arbiter)    │
//! └──────────────┘             └─────────────┘          └──────────────┘
//! ```
//!
//! One writer, one reader, one token. Each cell is a single atomic, so a
//! read can never observe a torn value. `take` is a swap: the reader clears
//! the cell in the same instruction it reads it.

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use crate::app::commands::CommandToken;

/// Empty marker for [`CommandSlot`]. Never a valid command byte.
const SLOT_EMPTY: u8 = 0;

/// Holds at most one decoded serial command.
pub struct CommandSlot {
    raw: AtomicU8,
}

impl CommandSlot {
    pub const fn new() -> Self {
        Self {
            raw: AtomicU8::new(SLOT_EMPTY),
        }
    }

    /// Store `token`. Returns the token it displaced, if the reader had not
    /// taken the previous one yet.
    pub fn publish(&self, token: CommandToken) -> Option<CommandToken> {
        let prev = self.raw.swap(token.as_byte(), Ordering::AcqRel);
        CommandToken::from_serial_byte(prev)
    }

    /// Take and clear the pending token.
    pub fn take(&self) -> Option<CommandToken> {
        let raw = self.raw.swap(SLOT_EMPTY, Ordering::AcqRel);
        CommandToken::from_serial_byte(raw)
    }

    pub fn is_empty(&self) -> bool {
        self.raw.load(Ordering::Acquire) == SLOT_EMPTY
    }
}

impl Default for CommandSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// Set by the wireless link when a confirmation byte arrives.
pub struct ConfirmationFlag {
    raised: AtomicBool,
}

impl ConfirmationFlag {
    pub const fn new() -> Self {
        Self {
            raised: AtomicBool::new(false),
        }
    }

    pub fn raise(&self) {
        self.raised.store(true, Ordering::Release);
    }

    /// Read and clear in one step.
    pub fn take(&self) -> bool {
        self.raised.swap(false, Ordering::AcqRel)
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }
}

impl Default for ConfirmationFlag {
    fn default() -> Self {
        Self::new()
    }
}
