//! Hosted simulation of the board
//!
//! Replaces the serial line and both timers with deterministic models and
//! steps the whole device one millisecond at a time. Within a step the
//! order is fixed: heartbeat tick, idle timer expiry, incoming bytes, one
//! transmit-ready interrupt, one dispatch pass. Because the idle timer is
//! serviced before incoming bytes, a byte landing on the exact expiry
//! instant starts a new frame.

use std::collections::VecDeque;
use std::convert::Infallible;

use ufmt::uWrite;

use crate::application::{Activity, Application};
use crate::config::Config;
use crate::hal::{IdleTimer, TxReadyInterrupt};
use crate::os::Device;

/// Serial line at roughly 9600 baud: accepts one outgoing byte per
/// millisecond and holds at most one incoming byte.
#[derive(Default)]
pub struct SimLine {
    now: u32,
    incoming: Option<u8>,
    last_write: Option<u32>,
    wire: Vec<(u32, u8)>,
}

impl SimLine {
    pub fn wire(&self) -> &[(u32, u8)] {
        &self.wire
    }
}

impl embedded_hal::serial::Read<u8> for SimLine {
    type Error = Infallible;

    fn read(&mut self) -> nb::Result<u8, Infallible> {
        self.incoming.take().ok_or(nb::Error::WouldBlock)
    }
}

impl embedded_hal::serial::Write<u8> for SimLine {
    type Error = Infallible;

    fn write(&mut self, byte: u8) -> nb::Result<(), Infallible> {
        if self.last_write == Some(self.now) {
            return Err(nb::Error::WouldBlock);
        }
        self.last_write = Some(self.now);
        self.wire.push((self.now, byte));
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Infallible> {
        Ok(())
    }
}

#[derive(Default)]
pub struct SimTxIrq {
    enabled: bool,
}

impl SimTxIrq {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl TxReadyInterrupt for SimTxIrq {
    fn enable(&mut self) {
        self.enabled = true;
    }

    fn disable(&mut self) {
        self.enabled = false;
    }
}

/// One-shot countdown expressed as an absolute deadline.
pub struct SimIdleTimer {
    now: u32,
    window: u32,
    deadline: Option<u32>,
}

impl SimIdleTimer {
    pub fn new(window_ms: u16) -> Self {
        Self {
            now: 0,
            window: window_ms as u32,
            deadline: None,
        }
    }

    pub fn deadline(&self) -> Option<u32> {
        self.deadline
    }

    fn expired(&self) -> bool {
        matches!(self.deadline, Some(d) if d <= self.now)
    }
}

impl IdleTimer for SimIdleTimer {
    fn rearm(&mut self) {
        self.deadline = Some(self.now + self.window);
    }

    fn disarm(&mut self) {
        self.deadline = None;
    }
}

/// A ufmt sink collecting text, for printing diagnostics on the host.
#[derive(Default)]
pub struct Transcript(pub String);

impl uWrite for Transcript {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Infallible> {
        self.0.push_str(s);
        Ok(())
    }
}

pub struct Simulator {
    config: Config,
    device: Device,
    app: Application,
    line: SimLine,
    irq: SimTxIrq,
    idle_timer: SimIdleTimer,
    incoming: VecDeque<(u32, u8)>,
    now: u32,
    reports: Vec<(u32, usize)>,
    heartbeats: Vec<u32>,
}

impl Simulator {
    /// Panics if `config.heartbeat_period_ms` is zero; the hardware timer
    /// has no such setting either.
    pub fn new(config: Config) -> Self {
        assert!(config.heartbeat_period_ms > 0, "heartbeat period must be non-zero");
        Self {
            config,
            device: Device::new(),
            app: Application::new(config),
            line: SimLine::default(),
            irq: SimTxIrq::default(),
            idle_timer: SimIdleTimer::new(config.idle_window_ms),
            incoming: VecDeque::new(),
            now: 0,
            reports: Vec::new(),
            heartbeats: Vec::new(),
        }
    }

    /// Queue a byte to arrive at `at_ms`. Arrivals must be scheduled in
    /// time order.
    pub fn receive_at(&mut self, at_ms: u32, byte: u8) {
        self.incoming.push_back((at_ms, byte));
    }

    /// Queue `bytes` starting at `start_ms`, one every `spacing_ms`.
    pub fn receive_spaced(&mut self, start_ms: u32, spacing_ms: u32, bytes: &[u8]) {
        for (i, &b) in bytes.iter().enumerate() {
            self.receive_at(start_ms + i as u32 * spacing_ms, b);
        }
    }

    /// Advance one millisecond.
    pub fn step(&mut self) -> Activity {
        let now = self.now;
        self.line.now = now;
        self.idle_timer.now = now;

        if now > 0 && now % self.config.heartbeat_period_ms as u32 == 0 {
            self.device.on_heartbeat_tick();
        }
        if self.idle_timer.expired() {
            self.device.on_idle_timeout(&mut self.idle_timer);
        }
        while let Some(&(at, byte)) = self.incoming.front() {
            if at > now {
                break;
            }
            self.incoming.pop_front();
            self.line.incoming = Some(byte);
            self.device
                .on_byte_received(&mut self.line, &mut self.irq, &mut self.idle_timer);
        }
        if self.irq.is_enabled() {
            self.device.on_tx_ready(&mut self.line, &mut self.irq);
        }

        let activity = self.app.poll(&self.device, &mut self.irq);
        if let Some(n) = activity.report {
            self.reports.push((now, n));
        }
        if activity.heartbeat {
            self.heartbeats.push(now);
        }
        self.now += 1;
        activity
    }

    /// Step until the clock has covered `end_ms` inclusive.
    pub fn run_until(&mut self, end_ms: u32) {
        while self.now <= end_ms {
            self.step();
        }
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn idle_timer(&self) -> &SimIdleTimer {
        &self.idle_timer
    }

    /// Frame reports as (dispatch time, length)
    pub fn reports(&self) -> &[(u32, usize)] {
        &self.reports
    }

    /// Dispatch times of heartbeat messages
    pub fn heartbeats(&self) -> &[u32] {
        &self.heartbeats
    }

    pub fn wire_timed(&self) -> &[(u32, u8)] {
        self.line.wire()
    }

    pub fn wire(&self) -> Vec<u8> {
        self.line.wire().iter().map(|&(_, b)| b).collect()
    }
}
