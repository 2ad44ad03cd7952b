//! Main dispatch loop
//! Turns the flags raised by the interrupt handlers into outgoing text

use ufmt::uwrite;

use crate::config::{Config, HEARTBEAT_MESSAGE};
use crate::drivers::{RetryPolicy, SerialConsole};
use crate::hal::TxReadyInterrupt;
use crate::os::Device;

/// What one pass of the loop did
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Activity {
    /// Length of the frame that was reported, if any
    pub report: Option<usize>,
    pub heartbeat: bool,
}

impl Activity {
    pub fn is_idle(&self) -> bool {
        self.report.is_none() && !self.heartbeat
    }
}

pub struct Application {
    policy: RetryPolicy,
}

impl Application {
    pub fn new(config: Config) -> Self {
        Self {
            policy: RetryPolicy::new(config.enqueue_attempts),
        }
    }

    /// Replace the busy-wait between two enqueue attempts of one byte.
    pub fn with_retry_pause(mut self, pause: fn()) -> Self {
        self.policy = RetryPolicy::with_pause(self.policy.attempts, pause);
        self
    }

    /// One non-blocking pass. The only wait is the bounded retry per byte.
    pub fn poll<I: TxReadyInterrupt>(&mut self, device: &Device, irq: &mut I) -> Activity {
        let mut activity = Activity::default();
        let mut console = SerialConsole::new(&device.tx, irq, self.policy, &device.diag);

        // An expired window with nothing new in the ring is simply cleared.
        if let Some(end) = device.idle.take() {
            let received = device.rx.take_frame(end);
            if received > 0 {
                uwrite!(console, "\r\nReceived {} bytes\r\n", received).ok();
                device.diag.frame_reported();
                activity.report = Some(received);
            }
        }

        if device.heartbeat.take() {
            console.write_str(HEARTBEAT_MESSAGE);
            device.diag.heartbeat_sent();
            activity.heartbeat = true;

            #[cfg(feature = "debug")]
            uwrite!(console, "{}", device.diag.snapshot()).ok();
        }

        activity
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new(Config::DEFAULT)
    }
}
