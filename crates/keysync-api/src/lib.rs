// keysync-api: Async Rust clients for the booking, smart-lock and SMS APIs

pub mod booking;
pub mod error;
pub mod lock;
pub mod sms;
pub mod transport;

pub use booking::BookingClient;
pub use error::Error;
pub use lock::LockClient;
pub use sms::SmsClient;
pub use transport::{TlsMode, TransportConfig};
