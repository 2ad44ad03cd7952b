//! Interrupt-driven serial firmware for the ATmega328P.
//!
//! A 1 Hz heartbeat message, byte-for-byte echo of everything received,
//! and a length report for every burst of input once the line has been
//! quiet for the idle window. The portable core (rings, state machines,
//! dispatch loop) builds for any target; register access lives in
//! [`hal`] behind `target_arch = "avr"`, and a hosted build gets the
//! [`testing`] simulator instead.

#![cfg_attr(target_arch = "avr", no_std)]

pub mod application;
pub mod config;
pub mod diagnostics;
pub mod drivers;
pub mod hal;
pub mod os;
pub mod ring;

#[cfg(not(target_arch = "avr"))]
pub mod testing;

pub use application::{Activity, Application};
pub use config::Config;
pub use os::{Device, DEVICE};
pub use ring::ByteRing;
