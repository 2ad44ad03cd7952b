#![allow(clippy::missing_safety_doc)]

use avr_device::atmega328p::USART0;
use core::convert::Infallible;

use super::TxReadyInterrupt;
use crate::config::UBRR;

/// USART0 data register access. Zero-sized so each interrupt handler can
/// hold its own copy; every method touches only its own status bits.
pub struct Usart0 {
    _private: (),
}

/// UDRIE0 bit of USART0, the "data register empty" interrupt.
pub struct UsartTxIrq {
    _private: (),
}

// ~100 cycles per pause: 249 pauses outlast one character time (~16.7k
// cycles at 9600 baud) so a full ring has room again before the last try.
const RETRY_PAUSE_NOPS: u8 = 24;

/// Pause between two enqueue attempts of the dispatch loop.
pub fn retry_pause() {
    for _ in 0..RETRY_PAUSE_NOPS {
        avr_device::asm::nop();
    }
}

#[inline(always)]
fn regs() -> &'static avr_device::atmega328p::usart0::RegisterBlock {
    unsafe { &*USART0::ptr() }
}

impl Usart0 {
    /// Configure 8N1 at the configured baud rate, enable TX, RX and the RX
    /// complete interrupt. The data register empty interrupt stays off until
    /// the first byte is queued.
    pub fn init() -> Self {
        let p = regs();
        unsafe {
            p.ubrr0.write(|w| w.bits(UBRR));
            // UCSZ01 | UCSZ00: 8 data bits, no parity, 1 stop bit
            p.ucsr0c.write(|w| w.bits(0x06));
            p.ucsr0b.write(|w| {
                w.rxen0().set_bit()
                 .txen0().set_bit()
                 .rxcie0().set_bit()
                 .udrie0().clear_bit()
            });
        }
        Self { _private: () }
    }

    /// Handle for use inside an interrupt handler after `init` has run.
    pub const fn steal() -> Self {
        Self { _private: () }
    }
}

impl embedded_hal::serial::Read<u8> for Usart0 {
    type Error = Infallible;

    fn read(&mut self) -> nb::Result<u8, Infallible> {
        let p = regs();
        if p.ucsr0a.read().rxc0().bit_is_clear() {
            return Err(nb::Error::WouldBlock);
        }
        Ok(p.udr0.read().bits())
    }
}

impl embedded_hal::serial::Write<u8> for Usart0 {
    type Error = Infallible;

    fn write(&mut self, byte: u8) -> nb::Result<(), Infallible> {
        let p = regs();
        if p.ucsr0a.read().udre0().bit_is_clear() {
            return Err(nb::Error::WouldBlock);
        }
        unsafe { p.udr0.write(|w| w.bits(byte)) };
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Infallible> {
        if regs().ucsr0a.read().txc0().bit_is_clear() {
            return Err(nb::Error::WouldBlock);
        }
        Ok(())
    }
}

impl UsartTxIrq {
    pub const fn steal() -> Self {
        Self { _private: () }
    }
}

impl TxReadyInterrupt for UsartTxIrq {
    fn enable(&mut self) {
        regs().ucsr0b.modify(|_, w| w.udrie0().set_bit());
    }

    fn disable(&mut self) {
        regs().ucsr0b.modify(|_, w| w.udrie0().clear_bit());
    }
}
