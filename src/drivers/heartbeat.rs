use core::sync::atomic::{AtomicBool, Ordering};

/// Periodic "interval elapsed" flag. The hardware timer runs free; a tick
/// that lands before the previous one was taken is absorbed.
pub struct HeartbeatScheduler {
    due: AtomicBool,
}

impl HeartbeatScheduler {
    pub const fn new() -> Self {
        Self {
            due: AtomicBool::new(false),
        }
    }

    /// Timer interrupt body.
    #[inline]
    pub fn on_tick(&self) {
        self.due.store(true, Ordering::Release);
    }

    /// Dispatch loop side. Clears the flag, returns whether it was set.
    pub fn take(&self) -> bool {
        if !self.due.load(Ordering::Acquire) {
            return false;
        }
        self.due.store(false, Ordering::Release);
        true
    }
}

impl Default for HeartbeatScheduler {
    fn default() -> Self {
        Self::new()
    }
}
