//! Bounded pending-command queue
//!
//! The only shared mutable state between callers and the dispatch worker.
//! When the queue is full the **oldest** entry is discarded, so a burst of
//! dial movements always leaves the most recently requested value to be
//! executed. Entries are not deduplicated by command kind; callers doing
//! high-rate submission (dial spins) are expected to rate-limit themselves.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use satcat_protocol::CatCommand;

/// Default queue capacity
pub const PENDING_CAPACITY: usize = 4;

/// Concurrency-safe FIFO with drop-oldest overflow
///
/// `push` never blocks and never fails; the worker drains with `pop`.
#[derive(Debug)]
pub struct CommandQueue {
    inner: Mutex<VecDeque<CatCommand>>,
    capacity: usize,
}

impl CommandQueue {
    /// Create a queue with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(PENDING_CAPACITY)
    }

    /// Create a queue with an explicit capacity (must be non-zero)
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity: capacity.max(1),
        }
    }

    /// Enqueue a command, discarding the oldest entry if full
    pub fn push(&self, cmd: CatCommand) {
        let mut queue = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if queue.len() == self.capacity {
            queue.pop_front();
        }
        queue.push_back(cmd);
    }

    /// Dequeue the oldest pending command
    pub fn pop(&self) -> Option<CatCommand> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }

    /// Number of pending commands
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True when nothing is pending
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_keeps_last_four_in_fifo_order() {
        let queue = CommandQueue::new();
        for hz in 1..=6u64 {
            queue.push(CatCommand::SetFrequency { hz });
        }

        assert_eq!(queue.len(), PENDING_CAPACITY);
        // The first two entries were dropped, not the last two
        for hz in 3..=6u64 {
            assert_eq!(queue.pop(), Some(CatCommand::SetFrequency { hz }));
        }
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn push_below_capacity_preserves_everything() {
        let queue = CommandQueue::new();
        queue.push(CatCommand::GetFrequency);
        queue.push(CatCommand::GetMode);

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop(), Some(CatCommand::GetFrequency));
        assert_eq!(queue.pop(), Some(CatCommand::GetMode));
        assert!(queue.is_empty());
    }

    #[test]
    fn mixed_kinds_are_not_deduplicated() {
        let queue = CommandQueue::new();
        queue.push(CatCommand::GetFrequency);
        queue.push(CatCommand::SetFrequency { hz: 7_100_000 });
        queue.push(CatCommand::GetFrequency);

        assert_eq!(queue.len(), 3);
    }
}
