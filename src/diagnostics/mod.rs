//! Drop accounting and the optional diagnostics line

use core::cell::Cell;
use critical_section::Mutex;
use ufmt::{uDisplay, uWrite, uwrite, Formatter};

/// Every way a byte can be lost. None of these reach a caller; they are
/// only counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Receive ring full, incoming byte discarded
    RxOverflow = 0,
    /// Transmit ring full, echo of an incoming byte discarded
    EchoOverflow = 1,
    /// Dispatch loop ran out of push attempts for an outgoing byte
    TxAbandoned = 2,
    /// Serial line reported an error on read or write
    LineFault = 3,
}

const FAULT_KINDS: usize = 4;

pub struct Diagnostics {
    faults: [Mutex<Cell<u16>>; FAULT_KINDS],
    frames: Mutex<Cell<u16>>,
    heartbeats: Mutex<Cell<u16>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub rx_dropped: u16,
    pub echo_dropped: u16,
    pub tx_dropped: u16,
    pub line_faults: u16,
    pub frames: u16,
    pub heartbeats: u16,
}

fn bump(cell: &Mutex<Cell<u16>>) {
    critical_section::with(|cs| {
        let c = cell.borrow(cs);
        c.set(c.get().saturating_add(1));
    });
}

impl Diagnostics {
    pub const fn new() -> Self {
        Self {
            faults: [
                Mutex::new(Cell::new(0)),
                Mutex::new(Cell::new(0)),
                Mutex::new(Cell::new(0)),
                Mutex::new(Cell::new(0)),
            ],
            frames: Mutex::new(Cell::new(0)),
            heartbeats: Mutex::new(Cell::new(0)),
        }
    }

    pub fn record(&self, fault: Fault) {
        bump(&self.faults[fault as usize]);
    }

    pub fn frame_reported(&self) {
        bump(&self.frames);
    }

    pub fn heartbeat_sent(&self) {
        bump(&self.heartbeats);
    }

    pub fn count(&self, fault: Fault) -> u16 {
        critical_section::with(|cs| self.faults[fault as usize].borrow(cs).get())
    }

    pub fn snapshot(&self) -> Snapshot {
        critical_section::with(|cs| Snapshot {
            rx_dropped: self.faults[Fault::RxOverflow as usize].borrow(cs).get(),
            echo_dropped: self.faults[Fault::EchoOverflow as usize].borrow(cs).get(),
            tx_dropped: self.faults[Fault::TxAbandoned as usize].borrow(cs).get(),
            line_faults: self.faults[Fault::LineFault as usize].borrow(cs).get(),
            frames: self.frames.borrow(cs).get(),
            heartbeats: self.heartbeats.borrow(cs).get(),
        })
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl uDisplay for Snapshot {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        uwrite!(
            f,
            "[DBG] rx_drop={} echo_drop={} tx_drop={} line_fault={} frames={} beats={}\r\n",
            self.rx_dropped,
            self.echo_dropped,
            self.tx_dropped,
            self.line_faults,
            self.frames,
            self.heartbeats
        )
    }
}
