use crate::config::RX_BUFFER_SIZE;
use crate::diagnostics::{Diagnostics, Fault};
use crate::drivers::{IdleTimeoutDetector, TransmitPump};
use crate::hal::{IdleTimer, SerialRead, TxReadyInterrupt};
use crate::ring::ByteRing;

/// Interrupt-driven fill of the receive ring.
///
/// The receive handler is the only producer; the dispatch loop is the only
/// consumer and only ever discards whole frames.
pub struct ReceiveCollector {
    ring: ByteRing<RX_BUFFER_SIZE>,
}

impl ReceiveCollector {
    pub const fn new() -> Self {
        Self {
            ring: ByteRing::new(),
        }
    }

    /// "Byte received" interrupt body: store, echo, restart the idle window.
    ///
    /// A full receive ring drops the byte; a full transmit ring drops the
    /// echo. Neither stops the other, and the window restarts regardless.
    pub fn on_byte_received<L, I, T>(
        &self,
        line: &mut L,
        echo: &TransmitPump,
        irq: &mut I,
        idle: &IdleTimeoutDetector,
        timer: &mut T,
        diag: &Diagnostics,
    ) -> Option<u8>
    where
        L: SerialRead<u8>,
        I: TxReadyInterrupt,
        T: IdleTimer,
    {
        let byte = match line.read() {
            Ok(byte) => byte,
            Err(nb::Error::WouldBlock) => return None,
            Err(nb::Error::Other(_)) => {
                diag.record(Fault::LineFault);
                return None;
            }
        };

        if !self.ring.try_push(byte) {
            diag.record(Fault::RxOverflow);
        }
        if !echo.enqueue(byte, irq) {
            diag.record(Fault::EchoOverflow);
        }
        idle.rearm(timer);
        Some(byte)
    }

    /// Write index, recorded by the idle detector as the frame end.
    pub fn frame_end(&self) -> u8 {
        self.ring.head()
    }

    /// Consume the frame that ends at `end`, returning its length.
    pub fn take_frame(&self, end: u8) -> usize {
        self.ring.release_to(end)
    }

    pub fn pending(&self) -> usize {
        self.ring.occupied()
    }
}

impl Default for ReceiveCollector {
    fn default() -> Self {
        Self::new()
    }
}
