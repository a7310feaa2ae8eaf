// ── Domain model ──
//
// Canonical representations of bookings and access codes. Built from the
// wire types of keysync-api (see `convert`) and consumed by the engine.

pub mod access_code;
pub mod booking;
pub mod ids;

pub use access_code::{AccessCode, CodeSpec, CorrelationTag, StayTimes};
pub use booking::{Booking, BookingStatus, Stay};
pub use ids::{AccessoireId, BookingId, CodeId, LockId};
