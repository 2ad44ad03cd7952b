//! Device state shared between the interrupt handlers and the main loop

use crate::diagnostics::Diagnostics;
use crate::drivers::{HeartbeatScheduler, IdleTimeoutDetector, ReceiveCollector, TransmitPump};
use crate::hal::{IdleTimer, SerialRead, SerialWrite, TxReadyInterrupt};

/// Everything the interrupt handlers and the dispatch loop touch.
///
/// Lives in a single `static` on the device. Each ring index and flag has
/// exactly one writer per direction:
///
/// | state                | written by                              |
/// |----------------------|-----------------------------------------|
/// | tx head              | receive interrupt, dispatch loop (in CS) |
/// | tx tail              | transmit-ready interrupt                 |
/// | rx head              | receive interrupt                        |
/// | rx tail              | dispatch loop                            |
/// | heartbeat flag       | set: heartbeat timer, clear: loop        |
/// | idle flag + frame end| set: idle timer, clear: loop (in CS)     |
pub struct Device {
    pub tx: TransmitPump,
    pub rx: ReceiveCollector,
    pub heartbeat: HeartbeatScheduler,
    pub idle: IdleTimeoutDetector,
    pub diag: Diagnostics,
}

impl Device {
    pub const fn new() -> Self {
        Self {
            tx: TransmitPump::new(),
            rx: ReceiveCollector::new(),
            heartbeat: HeartbeatScheduler::new(),
            idle: IdleTimeoutDetector::new(),
            diag: Diagnostics::new(),
        }
    }

    /// Line "byte received" interrupt.
    pub fn on_byte_received<L, I, T>(&self, line: &mut L, irq: &mut I, timer: &mut T) -> Option<u8>
    where
        L: SerialRead<u8>,
        I: TxReadyInterrupt,
        T: IdleTimer,
    {
        self.rx
            .on_byte_received(line, &self.tx, irq, &self.idle, timer, &self.diag)
    }

    /// Line "ready to send" interrupt.
    pub fn on_tx_ready<L, I>(&self, line: &mut L, irq: &mut I)
    where
        L: SerialWrite<u8>,
        I: TxReadyInterrupt,
    {
        self.tx.on_tx_ready(line, irq, &self.diag);
    }

    /// Heartbeat timer compare interrupt.
    #[inline]
    pub fn on_heartbeat_tick(&self) {
        self.heartbeat.on_tick();
    }

    /// Idle timer compare interrupt.
    pub fn on_idle_timeout<T: IdleTimer>(&self, timer: &mut T) {
        self.idle.on_timeout(timer, self.rx.frame_end());
    }
}

impl Default for Device {
    fn default() -> Self {
        Self::new()
    }
}

/// Global device instance used by the interrupt vectors
pub static DEVICE: Device = Device::new();
