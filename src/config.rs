//! Configuration constants for ATmega328P firmware

/// CPU frequency in Hz
pub const CPU_FREQ_HZ: u32 = 16_000_000;

/// UART baud rate
pub const UART_BAUD: u32 = 9600;

/// Transmit ring capacity; one slot is kept free to tell full from empty
pub const TX_BUFFER_SIZE: usize = 256;

/// Receive ring capacity
pub const RX_BUFFER_SIZE: usize = 256;

/// Heartbeat period in milliseconds
pub const HEARTBEAT_PERIOD_MS: u16 = 1000;

/// Silence on the line that closes a receive frame, in milliseconds
pub const IDLE_WINDOW_MS: u16 = 16;

/// Push attempts per byte before the dispatch loop gives up on it
pub const ENQUEUE_ATTEMPTS: u16 = 250;

/// Text sent once per heartbeat period
pub const HEARTBEAT_MESSAGE: &str = "ATmega328P: Hello World!\r\n";

/// Timer clock prescaler shared by both timers
pub const TIMER_PRESCALER: u32 = 1024;

/// UBRR divisor for normal-speed asynchronous mode
pub const fn ubrr_for(baud: u32) -> u16 {
    (CPU_FREQ_HZ / (16 * baud) - 1) as u16
}

/// Timer1 compare value for a CTC period given in milliseconds
pub const fn timer1_compare_for(period_ms: u16) -> u16 {
    let ticks = (CPU_FREQ_HZ / TIMER_PRESCALER) * period_ms as u32 / 1000;
    assert!(ticks >= 1 && ticks <= 65536, "heartbeat period does not fit Timer1");
    (ticks - 1) as u16
}

/// Timer0 compare value for a CTC period given in milliseconds
pub const fn timer0_compare_for(window_ms: u16) -> u8 {
    let ticks = (CPU_FREQ_HZ / TIMER_PRESCALER) * window_ms as u32 / 1000;
    assert!(ticks >= 1 && ticks <= 256, "idle window does not fit Timer0");
    (ticks - 1) as u8
}

pub const UBRR: u16 = ubrr_for(UART_BAUD);
pub const HEARTBEAT_COMPARE: u16 = timer1_compare_for(HEARTBEAT_PERIOD_MS);
pub const IDLE_COMPARE: u8 = timer0_compare_for(IDLE_WINDOW_MS);

/// Runtime knobs of the portable core
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    pub heartbeat_period_ms: u16,
    pub idle_window_ms: u16,
    pub enqueue_attempts: u16,
}

impl Config {
    pub const DEFAULT: Config = Config {
        heartbeat_period_ms: HEARTBEAT_PERIOD_MS,
        idle_window_ms: IDLE_WINDOW_MS,
        enqueue_attempts: ENQUEUE_ATTEMPTS,
    };
}

impl Default for Config {
    fn default() -> Self {
        Self::DEFAULT
    }
}
