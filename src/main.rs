#![cfg_attr(target_arch = "avr", no_std)]
#![cfg_attr(target_arch = "avr", no_main)]
#![cfg_attr(target_arch = "avr", feature(abi_avr_interrupt))]

#[cfg(target_arch = "avr")]
use panic_halt as _;

#[cfg(target_arch = "avr")]
use atmega328p_firmware::hal::{retry_pause, HeartbeatTimer, IdleTimer0, Usart0, UsartTxIrq};
#[cfg(target_arch = "avr")]
use atmega328p_firmware::{Application, DEVICE};
use atmega328p_firmware::Config;

#[cfg(target_arch = "avr")]
#[avr_device::entry]
fn main() -> ! {
    // Register setup runs before any interrupt can fire
    avr_device::interrupt::free(|_| {
        Usart0::init();
        IdleTimer0::init();
        HeartbeatTimer::init();
    });

    let mut app = Application::new(Config::DEFAULT).with_retry_pause(retry_pause);
    let mut irq = UsartTxIrq::steal();

    // Enable interrupts globally
    unsafe { avr_device::interrupt::enable() };

    loop {
        app.poll(&DEVICE, &mut irq);
    }
}

#[cfg(target_arch = "avr")]
#[avr_device::interrupt(atmega328p)]
fn USART_RX() {
    DEVICE.on_byte_received(
        &mut Usart0::steal(),
        &mut UsartTxIrq::steal(),
        &mut IdleTimer0::steal(),
    );
}

#[cfg(target_arch = "avr")]
#[avr_device::interrupt(atmega328p)]
fn USART_UDRE() {
    DEVICE.on_tx_ready(&mut Usart0::steal(), &mut UsartTxIrq::steal());
}

#[cfg(target_arch = "avr")]
#[avr_device::interrupt(atmega328p)]
fn TIMER1_COMPA() {
    DEVICE.on_heartbeat_tick();
}

#[cfg(target_arch = "avr")]
#[avr_device::interrupt(atmega328p)]
fn TIMER0_COMPA() {
    DEVICE.on_idle_timeout(&mut IdleTimer0::steal());
}

/// Hosted build: run a short simulated session and print the wire.
#[cfg(not(target_arch = "avr"))]
fn main() {
    use atmega328p_firmware::testing::{Simulator, Transcript};
    use std::io::Write;

    let mut sim = Simulator::new(Config::DEFAULT);
    sim.receive_spaced(1500, 2, b"ping");
    sim.receive_spaced(2200, 1, b"hello world");
    sim.run_until(3100);

    let mut stdout = std::io::stdout();
    stdout.write_all(&sim.wire()).ok();
    stdout.flush().ok();

    let mut log = Transcript::default();
    ufmt::uwrite!(log, "{}", sim.device().diag.snapshot()).ok();
    eprint!("{}", log.0);
}
