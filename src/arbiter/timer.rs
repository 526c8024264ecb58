//! Confirmation timer: a single optional deadline.
//!
//! Timestamps are milliseconds from a monotonic [`ClockPort`]
//! (`crate::app::ports::ClockPort`). `elapsed` saturates, so a clock that
//! somehow steps backwards reads as "no time passed" rather than wrapping.

#[derive(Debug, Clone, Copy, Default)]
pub struct ConfirmationTimer {
    active: bool,
    /// Meaningless while `active` is false.
    started_ms: u64,
}

impl ConfirmationTimer {
    pub const fn new() -> Self {
        Self {
            active: false,
            started_ms: 0,
        }
    }

    pub fn arm(&mut self, now_ms: u64) {
        self.active = true;
        self.started_ms = now_ms;
    }

    pub fn disarm(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Time since [`arm`](Self::arm), or `None` when no wait is outstanding.
    pub fn elapsed(&self, now_ms: u64) -> Option<u64> {
        self.active.then(|| now_ms.saturating_sub(self.started_ms))
    }

    /// True once an active wait has run for at least `grace_ms`.
    pub fn expired(&self, now_ms: u64, grace_ms: u64) -> bool {
        self.elapsed(now_ms).is_some_and(|e| e >= grace_ms)
    }
}
