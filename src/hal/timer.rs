use avr_device::atmega328p::{TC0, TC1};

use super::IdleTimer;
use crate::config::{HEARTBEAT_COMPARE, IDLE_COMPARE};

// Clock select bits for clk/1024
const CS_DIV1024: u8 = 0b101;
// TCCR1B: WGM12, CTC mode with OCR1A as top
const WGM12: u8 = 1 << 3;
// TCCR0A: WGM01, CTC mode with OCR0A as top
const WGM01: u8 = 1 << 1;

/// Timer1 in CTC mode, free running at the heartbeat period.
pub struct HeartbeatTimer {
    _private: (),
}

impl HeartbeatTimer {
    pub fn init() -> Self {
        avr_device::interrupt::free(|_| unsafe {
            let p = &*TC1::ptr();
            p.tccr1a.write(|w| w.bits(0));
            p.tccr1b.write(|w| w.bits(0));
            p.tcnt1.write(|w| w.bits(0));
            p.ocr1a.write(|w| w.bits(HEARTBEAT_COMPARE));
            p.tccr1b.write(|w| w.bits(WGM12 | CS_DIV1024));
            p.timsk1.write(|w| w.ocie1a().set_bit());
        });
        Self { _private: () }
    }
}

/// Timer0 in CTC mode, used as a one-shot idle window.
pub struct IdleTimer0 {
    _private: (),
}

impl IdleTimer0 {
    /// Configure the compare value; the timer stays stopped until rearmed.
    pub fn init() -> Self {
        unsafe {
            let p = &*TC0::ptr();
            p.tccr0b.write(|w| w.bits(0));
            p.tccr0a.write(|w| w.bits(WGM01));
            p.ocr0a.write(|w| w.bits(IDLE_COMPARE));
            p.timsk0.write(|w| w.bits(0));
        }
        Self { _private: () }
    }

    pub const fn steal() -> Self {
        Self { _private: () }
    }
}

impl IdleTimer for IdleTimer0 {
    fn rearm(&mut self) {
        unsafe {
            let p = &*TC0::ptr();
            p.tccr0b.write(|w| w.bits(0));
            p.tcnt0.write(|w| w.bits(0));
            // Writing one clears a compare match left over from before
            p.tifr0.write(|w| w.ocf0a().set_bit());
            p.timsk0.modify(|_, w| w.ocie0a().set_bit());
            p.tccr0b.write(|w| w.bits(CS_DIV1024));
        }
    }

    fn disarm(&mut self) {
        unsafe {
            let p = &*TC0::ptr();
            p.tccr0b.write(|w| w.bits(0));
            p.timsk0.modify(|_, w| w.ocie0a().clear_bit());
        }
    }
}
