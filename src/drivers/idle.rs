use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use crate::hal::IdleTimer;

/// Silence detector that closes a receive frame.
///
/// The receive handler rearms it on every byte; when the window runs out the
/// timer handler records where the frame ends, raises the flag and disarms
/// until the next byte. Arm and fire both run inside a critical section so a
/// rearm can never be lost between the two interrupt sources.
pub struct IdleTimeoutDetector {
    armed: AtomicBool,
    expired: AtomicBool,
    frame_end: AtomicU8,
}

impl IdleTimeoutDetector {
    pub const fn new() -> Self {
        Self {
            armed: AtomicBool::new(false),
            expired: AtomicBool::new(false),
            frame_end: AtomicU8::new(0),
        }
    }

    /// Restart the window. Called for every received byte.
    pub fn rearm<T: IdleTimer>(&self, timer: &mut T) {
        critical_section::with(|_| {
            timer.rearm();
            self.armed.store(true, Ordering::Release);
        });
    }

    /// Timer interrupt body. `frame_end` is the receive ring's head at this
    /// instant. A fire that arrives while disarmed is ignored.
    pub fn on_timeout<T: IdleTimer>(&self, timer: &mut T, frame_end: u8) {
        critical_section::with(|_| {
            timer.disarm();
            if !self.armed.load(Ordering::Acquire) {
                return;
            }
            self.armed.store(false, Ordering::Release);
            self.frame_end.store(frame_end, Ordering::Relaxed);
            self.expired.store(true, Ordering::Release);
        });
    }

    /// Dispatch loop side. Clears the flag and hands back the frame end, if
    /// the window has expired since the last call.
    pub fn take(&self) -> Option<u8> {
        critical_section::with(|_| {
            if !self.expired.load(Ordering::Acquire) {
                return None;
            }
            self.expired.store(false, Ordering::Release);
            Some(self.frame_end.load(Ordering::Relaxed))
        })
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    pub fn is_expired(&self) -> bool {
        self.expired.load(Ordering::Acquire)
    }
}

impl Default for IdleTimeoutDetector {
    fn default() -> Self {
        Self::new()
    }
}
