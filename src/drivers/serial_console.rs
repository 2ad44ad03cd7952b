use core::convert::Infallible;
use ufmt::uWrite;

use crate::diagnostics::{Diagnostics, Fault};
use crate::drivers::TransmitPump;
use crate::hal::TxReadyInterrupt;

fn spin() {
    core::hint::spin_loop();
}

/// Bounded busy-wait: try up to `attempts` times, never more.
///
/// `pause` runs between two attempts (not after the last one). The ceiling
/// alone bounds the attempt count; the pause decides how much wall time
/// those attempts cover. On the device it is sized so the whole budget
/// outlasts one character time on the line.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub attempts: u16,
    pub pause: fn(),
}

impl RetryPolicy {
    pub const fn new(attempts: u16) -> Self {
        Self { attempts, pause: spin }
    }

    pub const fn with_pause(attempts: u16, pause: fn()) -> Self {
        Self { attempts, pause }
    }

    /// Runs `attempt` until it succeeds or the ceiling is hit. Returns the
    /// number of the successful attempt (1-based).
    pub fn run(&self, mut attempt: impl FnMut() -> bool) -> Option<u16> {
        for n in 1..=self.attempts {
            if attempt() {
                return Some(n);
            }
            if n < self.attempts {
                (self.pause)();
            }
        }
        None
    }
}

/// Main-loop writer onto the transmit ring.
///
/// Each push runs in its own critical section because the receive
/// interrupt also pushes echo bytes into the same ring. Interrupts are open
/// between attempts so the transmit interrupt can make room.
pub struct SerialConsole<'a, I: TxReadyInterrupt> {
    pump: &'a TransmitPump,
    irq: &'a mut I,
    policy: RetryPolicy,
    diag: &'a Diagnostics,
}

impl<'a, I: TxReadyInterrupt> SerialConsole<'a, I> {
    pub fn new(
        pump: &'a TransmitPump,
        irq: &'a mut I,
        policy: RetryPolicy,
        diag: &'a Diagnostics,
    ) -> Self {
        Self { pump, irq, policy, diag }
    }

    /// Returns `false` if the byte was abandoned.
    pub fn write_byte(&mut self, byte: u8) -> bool {
        let pump = self.pump;
        let irq = &mut *self.irq;
        let queued = self
            .policy
            .run(|| critical_section::with(|_| pump.enqueue(byte, &mut *irq)))
            .is_some();
        if !queued {
            self.diag.record(Fault::TxAbandoned);
        }
        queued
    }

    pub fn write_str(&mut self, s: &str) {
        for byte in s.bytes() {
            self.write_byte(byte);
        }
        // Even if every byte was abandoned the pump must be running so the
        // ring eventually drains.
        self.pump.kick(&mut *self.irq);
    }
}

impl<I: TxReadyInterrupt> uWrite for SerialConsole<'_, I> {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Infallible> {
        SerialConsole::write_str(self, s);
        Ok(())
    }
}
