pub mod heartbeat;
pub mod idle;
pub mod receive;
pub mod serial_console;
pub mod transmit;

pub use heartbeat::HeartbeatScheduler;
pub use idle::IdleTimeoutDetector;
pub use receive::ReceiveCollector;
pub use serial_console::{RetryPolicy, SerialConsole};
pub use transmit::TransmitPump;
