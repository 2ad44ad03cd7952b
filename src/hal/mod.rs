//! Capabilities the portable core needs from the hardware.
//!
//! Byte transfer goes through the embedded-hal 0.2 serial traits
//! (`serial::Read<u8>` / `serial::Write<u8>`): `WouldBlock` means the line
//! is not ready. The two interrupt-level switches below have no embedded-hal
//! counterpart.

#[cfg(target_arch = "avr")]
pub mod timer;
#[cfg(target_arch = "avr")]
pub mod uart;

#[cfg(target_arch = "avr")]
pub use timer::{HeartbeatTimer, IdleTimer0};
#[cfg(target_arch = "avr")]
pub use uart::{retry_pause, Usart0, UsartTxIrq};

pub use embedded_hal::serial::{Read as SerialRead, Write as SerialWrite};

/// The line's "ready to send" interrupt.
pub trait TxReadyInterrupt {
    fn enable(&mut self);
    fn disable(&mut self);
}

/// One-shot countdown used to detect silence on the line.
pub trait IdleTimer {
    /// Restart the countdown from the full window and enable its interrupt.
    fn rearm(&mut self);
    /// Stop the countdown and mask its interrupt.
    fn disarm(&mut self);
}
