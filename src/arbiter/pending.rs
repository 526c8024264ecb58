//! Pending-confirmation stack.
//!
//! Append at the tail, remove by value from anywhere. Despite the name it is
//! not LIFO: a REVERSE cancels the *earliest* matching GO, which may not be
//! on top.
//!
//! Equal tokens are indistinguishable, so removing the first match of a
//! value is the same as decrementing that value's count. The stack is
//! stored as one counter per token kind and has no capacity limit; counts
//! saturate at `u32::MAX`.

use crate::app::commands::CommandToken;

const fn slot(token: CommandToken) -> usize {
    match token {
        CommandToken::Go => 0,
        CommandToken::Reverse => 1,
        CommandToken::Stop => 2,
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PendingStack {
    counts: [u32; 3],
}

impl PendingStack {
    pub const fn new() -> Self {
        Self { counts: [0; 3] }
    }

    pub fn push(&mut self, token: CommandToken) {
        let n = &mut self.counts[slot(token)];
        *n = n.saturating_add(1);
    }

    /// Delete the first element equal to `token`. Returns whether one was found.
    pub fn remove_first(&mut self, token: CommandToken) -> bool {
        let n = &mut self.counts[slot(token)];
        if *n == 0 {
            return false;
        }
        *n -= 1;
        true
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&n| n == 0)
    }

    pub fn len(&self) -> usize {
        self.counts.iter().map(|&n| n as usize).sum()
    }

    /// Number of held tokens equal to `token`.
    pub fn count(&self, token: CommandToken) -> u32 {
        self.counts[slot(token)]
    }
}
