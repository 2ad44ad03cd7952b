use core::sync::atomic::{AtomicBool, Ordering};

use crate::config::TX_BUFFER_SIZE;
use crate::diagnostics::{Diagnostics, Fault};
use crate::hal::{SerialWrite, TxReadyInterrupt};
use crate::ring::ByteRing;

/// Interrupt-driven drain of the transmit ring.
///
/// Idle while the "ready to send" interrupt is masked, draining while it is
/// enabled. Any successful enqueue enables it; the handler masks it again
/// once the ring is empty.
pub struct TransmitPump {
    ring: ByteRing<TX_BUFFER_SIZE>,
    draining: AtomicBool,
}

impl TransmitPump {
    pub const fn new() -> Self {
        Self {
            ring: ByteRing::new(),
            draining: AtomicBool::new(false),
        }
    }

    /// Queue one byte and start draining. Returns `false` when the ring is
    /// full; the byte is not stored.
    ///
    /// Must not race with another enqueue: call it from an interrupt handler
    /// or from inside a critical section.
    pub fn enqueue<I: TxReadyInterrupt>(&self, byte: u8, irq: &mut I) -> bool {
        if !self.ring.try_push(byte) {
            return false;
        }
        self.kick(irq);
        true
    }

    /// Ensure the drain interrupt is on.
    pub fn kick<I: TxReadyInterrupt>(&self, irq: &mut I) {
        self.draining.store(true, Ordering::Release);
        irq.enable();
    }

    /// "Ready to send" interrupt body.
    pub fn on_tx_ready<L, I>(&self, line: &mut L, irq: &mut I, diag: &Diagnostics)
    where
        L: SerialWrite<u8>,
        I: TxReadyInterrupt,
    {
        let Some(byte) = self.ring.peek() else {
            irq.disable();
            self.draining.store(false, Ordering::Release);
            return;
        };
        match line.write(byte) {
            Ok(()) => {
                self.ring.try_pop();
            }
            // Spurious wake-up, the byte goes out on the next one
            Err(nb::Error::WouldBlock) => {}
            Err(nb::Error::Other(_)) => {
                self.ring.try_pop();
                diag.record(Fault::LineFault);
            }
        }
    }

    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Acquire)
    }

    pub fn pending(&self) -> usize {
        self.ring.occupied()
    }

    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }
}

impl Default for TransmitPump {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::serial::{Mock as SerialMock, Transaction as SerialTransaction};
    use embedded_hal_mock::MockError;
    use std::io::ErrorKind;

    #[derive(Default)]
    struct Irq {
        enabled: bool,
        toggles: u32,
    }

    impl TxReadyInterrupt for Irq {
        fn enable(&mut self) {
            self.enabled = true;
            self.toggles += 1;
        }

        fn disable(&mut self) {
            self.enabled = false;
            self.toggles += 1;
        }
    }

    #[test]
    fn starts_idle() {
        let pump = TransmitPump::new();
        assert!(!pump.is_draining());
        assert_eq!(pump.pending(), 0);
    }

    #[test]
    fn enqueue_arms_drain_interrupt() {
        let pump = TransmitPump::new();
        let mut irq = Irq::default();
        assert!(pump.enqueue(b'x', &mut irq));
        assert!(irq.enabled);
        assert!(pump.is_draining());
        assert_eq!(pump.pending(), 1);
    }

    #[test]
    fn drains_in_order_then_disarms() {
        let pump = TransmitPump::new();
        let diag = Diagnostics::new();
        let mut irq = Irq::default();
        for b in b"hi!" {
            assert!(pump.enqueue(*b, &mut irq));
        }
        let expectations = [SerialTransaction::write_many(b"hi!")];
        let mut line = SerialMock::new(&expectations);

        for _ in 0..3 {
            pump.on_tx_ready(&mut line, &mut irq, &diag);
            assert!(irq.enabled);
        }
        pump.on_tx_ready(&mut line, &mut irq, &diag);
        assert!(!irq.enabled);
        assert!(!pump.is_draining());
        line.done();
    }

    #[test]
    fn not_ready_keeps_byte_queued() {
        let pump = TransmitPump::new();
        let diag = Diagnostics::new();
        let mut irq = Irq::default();
        pump.enqueue(b'a', &mut irq);
        let expectations = [
            SerialTransaction::write_error(b'a', nb::Error::WouldBlock),
            SerialTransaction::write(b'a'),
        ];
        let mut line = SerialMock::new(&expectations);

        pump.on_tx_ready(&mut line, &mut irq, &diag);
        assert_eq!(pump.pending(), 1);
        pump.on_tx_ready(&mut line, &mut irq, &diag);
        assert_eq!(pump.pending(), 0);
        assert_eq!(diag.count(Fault::LineFault), 0);
        line.done();
    }

    #[test]
    fn line_fault_drops_byte_and_counts() {
        let pump = TransmitPump::new();
        let diag = Diagnostics::new();
        let mut irq = Irq::default();
        pump.enqueue(b'a', &mut irq);
        pump.enqueue(b'b', &mut irq);
        let expectations = [
            SerialTransaction::write_error(b'a', nb::Error::Other(MockError::Io(ErrorKind::Other))),
            SerialTransaction::write(b'b'),
        ];
        let mut line = SerialMock::new(&expectations);

        pump.on_tx_ready(&mut line, &mut irq, &diag);
        pump.on_tx_ready(&mut line, &mut irq, &diag);
        assert_eq!(pump.pending(), 0);
        assert_eq!(diag.count(Fault::LineFault), 1);
        line.done();
    }

    #[test]
    fn full_ring_rejects_and_leaves_state() {
        let pump = TransmitPump::new();
        let mut irq = Irq::default();
        while pump.enqueue(0x55, &mut irq) {}
        let toggles = irq.toggles;
        assert!(pump.is_full());
        assert!(!pump.enqueue(0x66, &mut irq));
        assert_eq!(pump.pending(), TX_BUFFER_SIZE - 1);
        assert_eq!(irq.toggles, toggles);
    }
}
